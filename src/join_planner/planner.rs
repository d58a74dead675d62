//! The four planning phases.
//!
//! ```text
//! seed               {t} for every table
//! grow               width 2..=join_num-1, one width at a time
//! link_tables        table -> (C ∪ {table}) for every combination C next to it
//! link_combinations  G -> (G ∪ H) for every disjoint neighbouring H that fits
//! ```
//!
//! Every phase reads snapshots of the width caches, so new combinations
//! registered while a phase runs never feed back into the same iteration.
//! Every derivation of a member set is interchangeable (extensions depend on
//! membership alone), which keeps the result independent of iteration order.

use std::collections::BTreeSet;

use super::combination::{CombinationId, JoinCombination, JoinEdge};
use super::errors::{JoinPlannerError, Phase, PlannerResult};
use super::registry::CombinationRegistry;
use super::table_node::TableNode;
use super::TableIndex;

pub struct Planner {
    nodes: Vec<TableNode>,
    join_num: usize,
    registry: CombinationRegistry,
    /// Outgoing "can join into" edges of each plain table
    table_edges: Vec<BTreeSet<JoinEdge>>,
}

/// Planner state after all phases, ready for materialization.
#[derive(Debug)]
pub struct PlanGraph {
    pub nodes: Vec<TableNode>,
    pub join_num: usize,
    pub registry: CombinationRegistry,
    pub table_edges: Vec<BTreeSet<JoinEdge>>,
}

impl Planner {
    pub fn new(nodes: Vec<TableNode>, join_num: usize) -> PlannerResult<Self> {
        if join_num == 0 {
            return Err(JoinPlannerError::InvalidJoinNum(join_num));
        }
        for (position, node) in nodes.iter().enumerate() {
            if node.index != position {
                return Err(JoinPlannerError::invariant(
                    Phase::Seeding,
                    format!("table node at position {} carries index {}", position, node.index),
                ));
            }
        }

        let table_num = nodes.len();
        Ok(Planner {
            registry: CombinationRegistry::new(table_num, join_num),
            table_edges: vec![BTreeSet::new(); table_num],
            nodes,
            join_num,
        })
    }

    /// Run every phase to completion.
    pub fn run(mut self) -> PlannerResult<PlanGraph> {
        self.seed()?;
        self.grow()?;
        self.link_tables()?;
        self.link_combinations()?;

        log::info!(
            "Join planning finished: {} tables, {} combinations, width histogram {:?}",
            self.nodes.len(),
            self.registry.len(),
            self.registry.width_histogram()
        );

        Ok(PlanGraph {
            nodes: self.nodes,
            join_num: self.join_num,
            registry: self.registry,
            table_edges: self.table_edges,
        })
    }

    /// One singleton combination per table.
    fn seed(&mut self) -> PlannerResult<()> {
        for node in &self.nodes {
            let (_, inserted) = self
                .registry
                .get_or_insert(JoinCombination::singleton(node), Phase::Seeding)?;
            if !inserted {
                return Err(JoinPlannerError::invariant(
                    Phase::Seeding,
                    format!("table {} seeded twice", node.index),
                ));
            }
        }
        log::debug!("Seeded {} single-table combinations", self.nodes.len());
        Ok(())
    }

    fn grow(&mut self) -> PlannerResult<()> {
        for width in 2..self.join_num {
            let before = self.registry.len();
            self.grow_width(width)?;
            log::debug!(
                "Growth to width {}: {} new combinations",
                width,
                self.registry.len() - before
            );
        }
        Ok(())
    }

    /// Build every width-`width` combination from the width-`width - 1` caches.
    ///
    /// Both directions run: adding a table to its neighbours' combinations,
    /// and extending the table's own combinations by their extension tables.
    fn grow_width(&mut self, width: usize) -> PlannerResult<()> {
        for table in 0..self.nodes.len() {
            for neighbor in self.nodes[table].neighbors() {
                for id in self.registry.cached(neighbor, width - 1) {
                    let grown = self
                        .registry
                        .get(id, Phase::Growth)?
                        .grow(&self.nodes[table]);
                    if let Some(grown) = grown {
                        self.registry.get_or_insert(grown, Phase::Growth)?;
                    }
                }
            }

            for id in self.registry.cached(table, width - 1) {
                let extensions: Vec<TableIndex> = self
                    .registry
                    .get(id, Phase::Growth)?
                    .extensions()
                    .iter()
                    .copied()
                    .collect();
                for extension in extensions {
                    let grown = self
                        .registry
                        .get(id, Phase::Growth)?
                        .grow(&self.nodes[extension]);
                    if let Some(grown) = grown {
                        self.registry.get_or_insert(grown, Phase::Growth)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Record `table -> C ∪ {table}` for every combination C cached under a
    /// neighbour, registering results the growth phase did not reach
    /// (the full `join_num` width).
    fn link_tables(&mut self) -> PlannerResult<()> {
        let mut edge_count = 0;
        for table in 0..self.nodes.len() {
            for neighbor in self.nodes[table].neighbors() {
                for partner in self.registry.cached_all(neighbor) {
                    let combination = self.registry.get(partner, Phase::TableExtension)?;
                    if combination.contains(table) || combination.width() >= self.join_num {
                        continue;
                    }
                    let Some(grown) = combination.grow(&self.nodes[table]) else {
                        continue;
                    };
                    let (result, _) = self
                        .registry
                        .get_or_insert(grown, Phase::TableExtension)?;
                    if self.table_edges[table].insert(JoinEdge { partner, result }) {
                        edge_count += 1;
                    }
                }
            }
        }
        log::debug!("Linked tables to combinations: {} edges", edge_count);
        Ok(())
    }

    /// Record `G -> G ∪ H` for every combination G of width >= 2 and every
    /// disjoint H, cached under one of G's extension tables, that still fits.
    fn link_combinations(&mut self) -> PlannerResult<()> {
        let mut edge_count = 0;
        let sources: Vec<CombinationId> = self
            .registry
            .iter()
            .filter(|(_, combination)| {
                combination.width() >= 2 && combination.width() < self.join_num
            })
            .map(|(id, _)| id)
            .collect();

        for source in sources {
            let (room, extensions) = {
                let combination = self.registry.get(source, Phase::CombinationMerge)?;
                let extensions: Vec<TableIndex> =
                    combination.extensions().iter().copied().collect();
                (self.join_num - combination.width(), extensions)
            };

            for extension in extensions {
                for partner in self.registry.cached_up_to(extension, room) {
                    let merged = {
                        let combination = self.registry.get(source, Phase::CombinationMerge)?;
                        let other = self.registry.get(partner, Phase::CombinationMerge)?;
                        combination.merge(other)
                    };
                    let Some(merged) = merged else {
                        continue;
                    };
                    let (result, _) = self
                        .registry
                        .get_or_insert(merged, Phase::CombinationMerge)?;
                    if self
                        .registry
                        .get_mut(source, Phase::CombinationMerge)?
                        .add_ref_joined(JoinEdge { partner, result })
                    {
                        edge_count += 1;
                    }
                }
            }
        }
        log::debug!("Linked combinations to combinations: {} edges", edge_count);
        Ok(())
    }
}
