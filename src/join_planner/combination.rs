use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt::Display;

use super::fingerprint::{fingerprint_sorted, Fingerprint};
use super::table_node::TableNode;
use super::TableIndex;

/// Position of a combination in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationId(pub(crate) usize);

impl CombinationId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for CombinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// "Joining against `partner` reaches `result`."
///
/// Outgoing from a table, `partner` is the group the table is added to.
/// Outgoing from a combination, `partner` is the disjoint group merged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinEdge {
    pub partner: CombinationId,
    pub result: CombinationId,
}

/// A connected, duplicate-free set of tables.
///
/// Membership never changes after construction; only outgoing edges are added.
#[derive(Debug, Clone)]
pub struct JoinCombination {
    members: BTreeSet<TableIndex>,
    /// Tables adjacent to some member that are not members themselves
    extensions: BTreeSet<TableIndex>,
    fingerprint: OnceCell<Fingerprint>,
    ref_joined: BTreeSet<JoinEdge>,
}

impl JoinCombination {
    pub fn singleton(node: &TableNode) -> Self {
        Self::from_parts(BTreeSet::from([node.index]), node.neighbors())
    }

    fn from_parts(members: BTreeSet<TableIndex>, mut extensions: BTreeSet<TableIndex>) -> Self {
        extensions.retain(|idx| !members.contains(idx));
        JoinCombination {
            members,
            extensions,
            fingerprint: OnceCell::new(),
            ref_joined: BTreeSet::new(),
        }
    }

    /// `self ∪ {node}`, or `None` when the table is already a member.
    pub fn grow(&self, node: &TableNode) -> Option<JoinCombination> {
        if self.contains(node.index) {
            return None;
        }
        let mut members = self.members.clone();
        members.insert(node.index);
        let extensions = self.extensions.union(&node.neighbors()).copied().collect();
        Some(Self::from_parts(members, extensions))
    }

    /// `self ∪ other`, or `None` when the two share a member.
    pub fn merge(&self, other: &JoinCombination) -> Option<JoinCombination> {
        if !self.is_disjoint(other) {
            return None;
        }
        let members = self.members.union(&other.members).copied().collect();
        let extensions = self.extensions.union(&other.extensions).copied().collect();
        Some(Self::from_parts(members, extensions))
    }

    pub fn members(&self) -> &BTreeSet<TableIndex> {
        &self.members
    }

    pub fn extensions(&self) -> &BTreeSet<TableIndex> {
        &self.extensions
    }

    pub fn width(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, table: TableIndex) -> bool {
        self.members.contains(&table)
    }

    pub fn is_disjoint(&self, other: &JoinCombination) -> bool {
        self.members.is_disjoint(&other.members)
    }

    pub fn same_members(&self, other: &JoinCombination) -> bool {
        self.members == other.members
    }

    /// Computed on first use and cached.
    pub fn fingerprint(&self, table_num: usize) -> Fingerprint {
        *self.fingerprint.get_or_init(|| {
            let sorted: Vec<TableIndex> = self.members.iter().copied().collect();
            fingerprint_sorted(&sorted, table_num)
        })
    }

    pub fn is_fingerprinted(&self) -> bool {
        self.fingerprint.get().is_some()
    }

    pub fn ref_joined(&self) -> &BTreeSet<JoinEdge> {
        &self.ref_joined
    }

    pub(crate) fn add_ref_joined(&mut self, edge: JoinEdge) -> bool {
        self.ref_joined.insert(edge)
    }
}
