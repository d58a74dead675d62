//! Fingerprint properties through the public API

#[cfg(test)]
mod fingerprint_tests {
    use std::collections::HashSet;

    use ormjoin::join_planner::fingerprint::{decode_members, max_exact_width};
    use ormjoin::join_planner::{fingerprint, TableIndex};

    /// Every non-empty subset of `0..n` with at most `max_width` members.
    fn subsets(n: usize, max_width: usize) -> Vec<Vec<TableIndex>> {
        (1u32..(1 << n))
            .map(|mask| (0..n).filter(|bit| mask & (1 << bit) != 0).collect::<Vec<_>>())
            .filter(|members| members.len() <= max_width)
            .collect()
    }

    #[test]
    fn test_order_independent() {
        let n = 12;
        assert_eq!(fingerprint(&[7, 2, 11, 0], n), fingerprint(&[0, 2, 7, 11], n));
        assert_eq!(fingerprint(&[3, 1], n), fingerprint(&[1, 3], n));
    }

    #[test]
    fn test_distinct_sets_distinct_fingerprints() {
        let n = 9;
        let all = subsets(n, 5);
        let unique: HashSet<_> = all.iter().map(|m| fingerprint(m, n)).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_decode_recovers_members() {
        let n = 7;
        for members in subsets(n, 4) {
            assert_eq!(decode_members(fingerprint(&members, n), n), members);
        }
    }

    #[test]
    fn test_exact_width_shrinks_with_table_count() {
        assert!(max_exact_width(10) >= 18);
        assert!(max_exact_width(1000) >= 6);
        assert!(max_exact_width(1000) < max_exact_width(10));
        assert_eq!(max_exact_width(1), usize::MAX);
    }
}
