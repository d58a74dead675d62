//! Join-combination planning.
//!
//! Given the tables of a [`DatabaseSchema`] and a maximum join width, the
//! planner enumerates every connected set of up to `join_num` tables in the
//! foreign-key graph, gives each one a stable fingerprint, and wires up the
//! edges a code emitter needs to generate chaining `join_*` accessors.
//!
//! Pipeline:
//!
//! 1. [`table_node::build_table_nodes`] - adjacency in both FK directions
//! 2. [`planner::Planner::run`] - seed, grow, link tables, link combinations
//! 3. [`materializer::Materializer`] - public [`Table`] / [`JoinedTable`] records

use crate::schema_catalog::DatabaseSchema;

pub mod combination;
pub mod errors;
pub mod fingerprint;
pub mod materializer;
pub mod planner;
pub mod registry;
pub mod table_node;


pub use combination::{CombinationId, JoinCombination, JoinEdge};
pub use errors::{JoinPlannerError, Phase};
pub use fingerprint::{fingerprint, Fingerprint};
pub use materializer::{
    JoinCondition, JoinedTable, Materializer, PlannedSchema, RefJoinedTable, RefTable, Table,
};
pub use planner::{PlanGraph, Planner};
pub use table_node::TableNode;

/// Position of a table in the planned schema, `0..table_num`.
pub type TableIndex = usize;

pub const DEFAULT_JOIN_NUM: usize = 5;

/// Plan every join shape of `schema` up to `join_num` tables wide.
pub fn plan_joins(
    schema: &DatabaseSchema,
    join_num: usize,
) -> Result<PlannedSchema, JoinPlannerError> {
    let graph = build_plan_graph(schema, join_num)?;
    Materializer::new(schema, &graph)?.materialize()
}

/// Run the planning phases without materializing.
pub fn build_plan_graph(
    schema: &DatabaseSchema,
    join_num: usize,
) -> Result<PlanGraph, JoinPlannerError> {
    let nodes = table_node::build_table_nodes(schema)?;

    let exact_width = fingerprint::max_exact_width(nodes.len());
    if join_num > exact_width {
        log::warn!(
            "join_num {} exceeds the collision-free fingerprint width {} for {} tables",
            join_num,
            exact_width,
            nodes.len()
        );
    }

    log::debug!(
        "Planning joins for schema `{}`: {} tables, join_num {}",
        schema.name(),
        nodes.len(),
        join_num
    );

    Planner::new(nodes, join_num)?.run()
}
