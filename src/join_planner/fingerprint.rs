//! Deterministic identity for a set of table indices.
//!
//! Members are sorted ascending and read as the digits of a base-`table_num`
//! number:
//!
//! ```text
//! hash = Σ idx_i · table_num^i   (mod 2^63 - 1)
//! ```
//!
//! Every index is strictly below `table_num` and a sorted set of two or more
//! members always ends in a non-zero digit, so as long as no reduction wraps
//! (`table_num^width < 2^63 - 1`) two sets share a fingerprint iff they hold
//! the same indices. [`decode_members`] inverts the encoding under the same
//! condition.
//!
//! All fingerprints compared within one planning run must be derived from the
//! same `table_num`.

use std::fmt::Display;

use serde::Serialize;

use super::TableIndex;

/// `2^63 - 1`
pub const FINGERPRINT_MODULUS: u64 = (1 << 63) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Fingerprint of `members`, independent of their order.
pub fn fingerprint(members: &[TableIndex], table_num: usize) -> Fingerprint {
    let mut sorted = members.to_vec();
    sorted.sort_unstable();
    fingerprint_sorted(&sorted, table_num)
}

/// Fingerprint of members already sorted ascending.
pub fn fingerprint_sorted(sorted: &[TableIndex], table_num: usize) -> Fingerprint {
    debug_assert!(sorted.windows(2).all(|w| w[0] < w[1]));

    let modulus = FINGERPRINT_MODULUS as u128;
    let base = table_num as u128 % modulus;

    let mut hash: u128 = 0;
    let mut multiplier: u128 = 1;
    for &idx in sorted {
        hash = (hash + idx as u128 * multiplier) % modulus;
        multiplier = multiplier * base % modulus;
    }
    Fingerprint(hash as u64)
}

/// Recover the member set by repeated division by `table_num`.
///
/// Only meaningful when the encoding did not wrap.
pub fn decode_members(fingerprint: Fingerprint, table_num: usize) -> Vec<TableIndex> {
    let mut value = fingerprint.value();
    if value == 0 || table_num < 2 {
        return vec![value as TableIndex];
    }

    let base = table_num as u64;
    let mut members = Vec::new();
    while value > 0 {
        members.push((value % base) as TableIndex);
        value /= base;
    }
    members
}

/// Largest width whose fingerprints cannot wrap for `table_num` tables.
pub fn max_exact_width(table_num: usize) -> usize {
    if table_num < 2 {
        return usize::MAX;
    }
    let base = table_num as u128;
    let mut power: u128 = 1;
    let mut width = 0;
    while power * base < FINGERPRINT_MODULUS as u128 {
        power *= base;
        width += 1;
    }
    width
}
