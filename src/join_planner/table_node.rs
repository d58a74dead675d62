use std::collections::BTreeSet;

use crate::schema_catalog::DatabaseSchema;

use super::errors::{JoinPlannerError, PlannerResult};
use super::TableIndex;

/// A table and its foreign-key adjacency, fixed for the whole planning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNode {
    pub index: TableIndex,
    /// Tables this table's foreign keys point at
    pub refs: BTreeSet<TableIndex>,
    /// Tables whose foreign keys point at this table
    pub back_refs: BTreeSet<TableIndex>,
}

impl TableNode {
    pub fn new(index: TableIndex) -> Self {
        Self {
            index,
            refs: BTreeSet::new(),
            back_refs: BTreeSet::new(),
        }
    }

    /// Join neighbours in both directions, ascending.
    pub fn neighbors(&self) -> BTreeSet<TableIndex> {
        self.refs.union(&self.back_refs).copied().collect()
    }

    pub fn is_isolated(&self) -> bool {
        self.refs.is_empty() && self.back_refs.is_empty()
    }
}

/// Build one node per table, in schema order.
///
/// Self references are dropped: a combination never holds a table twice.
pub fn build_table_nodes(schema: &DatabaseSchema) -> PlannerResult<Vec<TableNode>> {
    let mut nodes: Vec<TableNode> = (0..schema.len()).map(TableNode::new).collect();

    for (index, table) in schema.tables().iter().enumerate() {
        for fk in table.outgoing_foreign_keys() {
            let target =
                schema
                    .table_index(&fk.ref_table)
                    .ok_or_else(|| JoinPlannerError::UnknownTable {
                        table: table.name.clone(),
                        target: fk.ref_table.clone(),
                    })?;
            nodes[index].refs.insert(target);
            nodes[target].back_refs.insert(index);
        }
    }

    Ok(nodes)
}
