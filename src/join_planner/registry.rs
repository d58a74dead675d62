//! Canonical store of every combination discovered during one planning run.
//!
//! Combinations live in a flat arena addressed by [`CombinationId`]. Two
//! indexes sit on top of it:
//!
//! - a fingerprint map, so that every derivation of the same member set
//!   resolves to one canonical instance (first write wins)
//! - per-table width caches, so that growth can start from any member of a
//!   combination
//!
//! Both indexes are updated together in [`CombinationRegistry::get_or_insert`];
//! a lookup that fails where the construction protocol guarantees a hit is
//! reported as an invariant violation.

use std::collections::{BTreeSet, HashMap};

use super::combination::{CombinationId, JoinCombination};
use super::errors::{JoinPlannerError, Phase, PlannerResult};
use super::fingerprint::Fingerprint;
use super::TableIndex;

#[derive(Debug)]
pub struct CombinationRegistry {
    table_num: usize,
    join_num: usize,
    combinations: Vec<JoinCombination>,
    by_fingerprint: HashMap<Fingerprint, CombinationId>,
    /// `width_cache[table][width - 1]`
    width_cache: Vec<Vec<BTreeSet<CombinationId>>>,
}

impl CombinationRegistry {
    pub fn new(table_num: usize, join_num: usize) -> Self {
        CombinationRegistry {
            table_num,
            join_num,
            combinations: Vec::new(),
            by_fingerprint: HashMap::new(),
            width_cache: vec![vec![BTreeSet::new(); join_num]; table_num],
        }
    }

    pub fn table_num(&self) -> usize {
        self.table_num
    }

    pub fn join_num(&self) -> usize {
        self.join_num
    }

    /// Return the canonical id for `candidate`'s member set, inserting it if new.
    ///
    /// The boolean is `true` when `candidate` became the canonical instance.
    pub fn get_or_insert(
        &mut self,
        candidate: JoinCombination,
        phase: Phase,
    ) -> PlannerResult<(CombinationId, bool)> {
        let width = candidate.width();
        if width == 0 || width > self.join_num {
            return Err(JoinPlannerError::invariant(
                phase,
                format!(
                    "combination {:?} has width {} outside 1..={}",
                    candidate.members(),
                    width,
                    self.join_num
                ),
            ));
        }

        let fingerprint = candidate.fingerprint(self.table_num);
        if let Some(&existing_id) = self.by_fingerprint.get(&fingerprint) {
            let existing = self.get(existing_id, phase)?;
            if !existing.same_members(&candidate) {
                return Err(JoinPlannerError::FingerprintCollision {
                    fingerprint,
                    existing: existing.members().iter().copied().collect(),
                    candidate: candidate.members().iter().copied().collect(),
                });
            }
            return Ok((existing_id, false));
        }

        let id = CombinationId(self.combinations.len());
        for &member in candidate.members() {
            let slots = self.width_cache.get_mut(member).ok_or_else(|| {
                JoinPlannerError::invariant(
                    phase,
                    format!("member index {} outside 0..{}", member, self.table_num),
                )
            })?;
            slots[width - 1].insert(id);
        }
        self.by_fingerprint.insert(fingerprint, id);
        self.combinations.push(candidate);

        Ok((id, true))
    }

    pub fn lookup(&self, fingerprint: Fingerprint) -> Option<CombinationId> {
        self.by_fingerprint.get(&fingerprint).copied()
    }

    pub fn get(&self, id: CombinationId, phase: Phase) -> PlannerResult<&JoinCombination> {
        self.combinations.get(id.0).ok_or_else(|| {
            JoinPlannerError::invariant(phase, format!("unknown combination {}", id))
        })
    }

    pub fn get_mut(
        &mut self,
        id: CombinationId,
        phase: Phase,
    ) -> PlannerResult<&mut JoinCombination> {
        self.combinations.get_mut(id.0).ok_or_else(|| {
            JoinPlannerError::invariant(phase, format!("unknown combination {}", id))
        })
    }

    /// Snapshot of the combinations of exactly `width` that contain `table`.
    pub fn cached(&self, table: TableIndex, width: usize) -> Vec<CombinationId> {
        if width == 0 {
            return Vec::new();
        }
        self.width_cache
            .get(table)
            .and_then(|slots| slots.get(width - 1))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the combinations of width `1..=max_width` that contain `table`.
    pub fn cached_up_to(&self, table: TableIndex, max_width: usize) -> Vec<CombinationId> {
        (1..=max_width.min(self.join_num))
            .flat_map(|width| self.cached(table, width))
            .collect()
    }

    pub fn cached_all(&self, table: TableIndex) -> Vec<CombinationId> {
        self.cached_up_to(table, self.join_num)
    }

    pub fn ids(&self) -> impl Iterator<Item = CombinationId> {
        (0..self.combinations.len()).map(CombinationId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CombinationId, &JoinCombination)> {
        self.combinations
            .iter()
            .enumerate()
            .map(|(idx, combination)| (CombinationId(idx), combination))
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// Number of combinations per width, index 0 holding width 1.
    pub fn width_histogram(&self) -> Vec<usize> {
        let mut histogram = vec![0; self.join_num];
        for combination in &self.combinations {
            histogram[combination.width() - 1] += 1;
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join_planner::table_node::TableNode;

    fn star() -> Vec<TableNode> {
        // hub(0) <- 1, 2, 3
        let mut nodes: Vec<TableNode> = (0..4).map(TableNode::new).collect();
        for spoke in 1..4 {
            nodes[spoke].refs.insert(0);
            nodes[0].back_refs.insert(spoke);
        }
        nodes
    }

    #[test]
    fn test_first_write_wins() {
        let nodes = star();
        let mut registry = CombinationRegistry::new(4, 3);

        let from_hub = JoinCombination::singleton(&nodes[0]).grow(&nodes[1]).unwrap();
        let from_spoke = JoinCombination::singleton(&nodes[1]).grow(&nodes[0]).unwrap();

        let (first, inserted) = registry.get_or_insert(from_hub, Phase::Growth).unwrap();
        assert!(inserted);
        let (second, inserted) = registry.get_or_insert(from_spoke, Phase::Growth).unwrap();
        assert!(!inserted);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registered_under_every_member() {
        let nodes = star();
        let mut registry = CombinationRegistry::new(4, 3);
        let combination = JoinCombination::singleton(&nodes[0])
            .grow(&nodes[2])
            .and_then(|c| c.grow(&nodes[3]))
            .unwrap();
        let (id, _) = registry.get_or_insert(combination, Phase::Growth).unwrap();

        for table in [0, 2, 3] {
            assert_eq!(registry.cached(table, 3), vec![id]);
        }
        assert!(registry.cached(1, 3).is_empty());
        assert!(registry.cached(0, 2).is_empty());
        assert_eq!(registry.cached_all(2), vec![id]);
    }

    #[test]
    fn test_width_bound_is_an_invariant() {
        let nodes = star();
        let mut registry = CombinationRegistry::new(4, 1);
        let pair = JoinCombination::singleton(&nodes[0]).grow(&nodes[1]).unwrap();
        let err = registry.get_or_insert(pair, Phase::Growth).unwrap_err();
        assert!(matches!(
            err,
            JoinPlannerError::InvariantViolation {
                phase: Phase::Growth,
                ..
            }
        ));
    }

    #[test]
    fn test_fingerprint_collision_is_reported() {
        // Index 2 is out of range for two tables, so {2} and {0, 1} both encode to 2
        let mut nodes: Vec<TableNode> = (0..3).map(TableNode::new).collect();
        nodes[0].refs.insert(1);
        nodes[1].back_refs.insert(0);
        let mut registry = CombinationRegistry::new(2, 3);

        let pair = JoinCombination::singleton(&nodes[0]).grow(&nodes[1]).unwrap();
        registry.get_or_insert(pair, Phase::Growth).unwrap();

        let err = registry
            .get_or_insert(JoinCombination::singleton(&nodes[2]), Phase::Seeding)
            .unwrap_err();
        match err {
            JoinPlannerError::FingerprintCollision {
                fingerprint,
                existing,
                candidate,
            } => {
                assert_eq!(fingerprint.value(), 2);
                assert_eq!(existing, vec![0, 1]);
                assert_eq!(candidate, vec![2]);
            }
            other => panic!("expected a collision, got {:?}", other),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_an_invariant() {
        let registry = CombinationRegistry::new(2, 2);
        assert!(registry
            .get(CombinationId(7), Phase::Materialization)
            .is_err());
    }

    #[test]
    fn test_lookup_by_fingerprint() {
        let nodes = star();
        let mut registry = CombinationRegistry::new(4, 2);
        let pair = JoinCombination::singleton(&nodes[3]).grow(&nodes[0]).unwrap();
        let fingerprint = pair.fingerprint(4);
        let (id, _) = registry.get_or_insert(pair, Phase::Seeding).unwrap();
        assert_eq!(registry.lookup(fingerprint), Some(id));
        assert_eq!(registry.width_histogram(), vec![0, 1]);
    }
}
