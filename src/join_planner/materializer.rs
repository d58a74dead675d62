//! Flattens the planner's arena into the records the code emitter consumes.
//!
//! Width-1 combinations are plain tables and never appear as joined tables.
//! Internal indices are resolved back to table and column names here; any
//! index that fails to resolve is a planner defect and aborts the run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::schema_catalog::{ColumnSchema, DatabaseSchema, ForeignKey};
use crate::utils::join_naming::{generate_accessor_name, generate_joined_table_name};

use super::combination::{CombinationId, JoinCombination, JoinEdge};
use super::errors::{JoinPlannerError, Phase, PlannerResult};
use super::planner::PlanGraph;
use super::TableIndex;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinCondition {
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
}

/// A table reachable through one foreign key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RefTable {
    pub table: String,
    pub on: JoinCondition,
}

/// A larger joined table reachable by joining against `tables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefJoinedTable {
    pub joined_table: String,
    /// Width of `joined_table`
    pub width: usize,
    /// Members of the group joined in, sorted by name
    pub tables: Vec<String>,
    /// Generated accessor method name
    pub accessor: String,
    /// Set when the group joined in is a single, directly referenced table
    pub via_ref_table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub ref_tables: Vec<RefTable>,
    pub ref_joined_tables: Vec<RefJoinedTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedTable {
    pub name: String,
    /// Member tables, sorted by name
    pub tables: Vec<String>,
    pub ref_tables: Vec<RefTable>,
    pub ref_joined_tables: Vec<RefJoinedTable>,
}

impl JoinedTable {
    pub fn width(&self) -> usize {
        self.tables.len()
    }
}

/// Final planner output handed to code emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSchema {
    pub name: String,
    pub join_num: usize,
    pub tables: Vec<Table>,
    pub joined_tables: Vec<JoinedTable>,
}

impl PlannedSchema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn joined_table(&self, name: &str) -> Option<&JoinedTable> {
        self.joined_tables.iter().find(|j| j.name == name)
    }

    /// Joined table with exactly these members, in any order.
    pub fn joined_table_for(&self, tables: &[&str]) -> Option<&JoinedTable> {
        let mut wanted: Vec<&str> = tables.to_vec();
        wanted.sort_unstable();
        self.joined_tables
            .iter()
            .find(|j| j.tables.iter().map(String::as_str).eq(wanted.iter().copied()))
    }
}

pub struct Materializer<'a> {
    schema: &'a DatabaseSchema,
    graph: &'a PlanGraph,
}

impl<'a> Materializer<'a> {
    pub fn new(schema: &'a DatabaseSchema, graph: &'a PlanGraph) -> PlannerResult<Self> {
        if schema.len() != graph.nodes.len() {
            return Err(JoinPlannerError::invariant(
                Phase::Materialization,
                format!(
                    "schema has {} tables but the plan has {} nodes",
                    schema.len(),
                    graph.nodes.len()
                ),
            ));
        }
        Ok(Materializer { schema, graph })
    }

    pub fn materialize(&self) -> PlannerResult<PlannedSchema> {
        let mut tables = Vec::with_capacity(self.schema.len());
        for (index, table) in self.schema.tables().iter().enumerate() {
            let mut ref_tables: Vec<RefTable> = table
                .foreign_keys
                .iter()
                .map(|fk| RefTable {
                    table: fk.ref_table.clone(),
                    on: JoinCondition {
                        left_table: table.name.clone(),
                        left_column: fk.column.clone(),
                        right_table: fk.ref_table.clone(),
                        right_column: fk.ref_column.clone(),
                    },
                })
                .collect();
            ref_tables.sort();

            let edges = self.graph.table_edges.get(index).ok_or_else(|| {
                JoinPlannerError::invariant(
                    Phase::Materialization,
                    format!("no edge list for table {}", index),
                )
            })?;

            tables.push(Table {
                name: table.name.clone(),
                columns: table.columns.clone(),
                primary_key: table.primary_key.clone(),
                foreign_keys: table.foreign_keys.clone(),
                ref_tables,
                ref_joined_tables: self.ref_joined_tables(&table.name, edges.iter())?,
            });
        }

        let mut joined_tables = Vec::new();
        for (_, combination) in self.graph.registry.iter() {
            if combination.width() < 2 {
                continue;
            }
            let members = self.member_names(combination)?;
            let name = generate_joined_table_name(&members);
            joined_tables.push(JoinedTable {
                ref_tables: self.joined_ref_tables(combination)?,
                ref_joined_tables: self.ref_joined_tables(&name, combination.ref_joined().iter())?,
                name,
                tables: members,
            });
        }
        joined_tables.sort_by(|a, b| (a.width(), &a.tables).cmp(&(b.width(), &b.tables)));

        log::debug!(
            "Materialized {} tables and {} joined tables",
            tables.len(),
            joined_tables.len()
        );

        Ok(PlannedSchema {
            name: self.schema.name().to_string(),
            join_num: self.graph.join_num,
            tables,
            joined_tables,
        })
    }

    fn table_name(&self, index: TableIndex) -> PlannerResult<&'a str> {
        self.schema
            .tables()
            .get(index)
            .map(|t| t.name.as_str())
            .ok_or_else(|| {
                JoinPlannerError::invariant(
                    Phase::Materialization,
                    format!("table index {} does not resolve", index),
                )
            })
    }

    fn member_names(&self, combination: &JoinCombination) -> PlannerResult<Vec<String>> {
        let mut names = combination
            .members()
            .iter()
            .map(|&idx| self.table_name(idx).map(str::to_string))
            .collect::<PlannerResult<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    fn combination(&self, id: CombinationId) -> PlannerResult<&'a JoinCombination> {
        self.graph.registry.get(id, Phase::Materialization)
    }

    /// Accessors become methods on `owner`, so they must be unique per owner.
    fn ref_joined_tables<'e>(
        &self,
        owner: &str,
        edges: impl Iterator<Item = &'e JoinEdge>,
    ) -> PlannerResult<Vec<RefJoinedTable>> {
        let mut refs = Vec::new();
        let mut accessors = HashSet::new();
        for edge in edges {
            let result = self.combination(edge.result)?;
            if result.width() < 2 {
                return Err(JoinPlannerError::invariant(
                    Phase::Materialization,
                    format!("edge {:?} reaches a single table", edge),
                ));
            }
            let partner = self.combination(edge.partner)?;
            let partner_names = self.member_names(partner)?;
            let accessor = generate_accessor_name(&partner_names);
            if !accessors.insert(accessor.clone()) {
                return Err(JoinPlannerError::invariant(
                    Phase::Materialization,
                    format!("`{}` gets accessor `{}` twice", owner, accessor),
                ));
            }

            refs.push(RefJoinedTable {
                joined_table: generate_joined_table_name(&self.member_names(result)?),
                width: result.width(),
                accessor,
                via_ref_table: (partner.width() == 1).then(|| partner_names[0].clone()),
                tables: partner_names,
            });
        }
        refs.sort_by(|a, b| {
            (a.width, &a.joined_table, &a.tables).cmp(&(b.width, &b.joined_table, &b.tables))
        });
        Ok(refs)
    }

    /// One entry per foreign key between a member and an extension table, in
    /// either direction.
    fn joined_ref_tables(&self, combination: &JoinCombination) -> PlannerResult<Vec<RefTable>> {
        let mut refs = Vec::new();
        for &member in combination.members() {
            let member_name = self.table_name(member)?;
            let member_table = &self.schema.tables()[member];
            for fk in member_table.outgoing_foreign_keys() {
                let target = self.schema.table_index(&fk.ref_table).ok_or_else(|| {
                    JoinPlannerError::invariant(
                        Phase::Materialization,
                        format!("foreign key target {} does not resolve", fk.ref_table),
                    )
                })?;
                if combination.extensions().contains(&target) {
                    refs.push(RefTable {
                        table: fk.ref_table.clone(),
                        on: JoinCondition {
                            left_table: member_name.to_string(),
                            left_column: fk.column.clone(),
                            right_table: fk.ref_table.clone(),
                            right_column: fk.ref_column.clone(),
                        },
                    });
                }
            }
        }

        for &extension in combination.extensions() {
            let extension_name = self.table_name(extension)?;
            let extension_table = &self.schema.tables()[extension];
            for fk in extension_table.outgoing_foreign_keys() {
                let points_at_member = self
                    .schema
                    .table_index(&fk.ref_table)
                    .is_some_and(|target| combination.contains(target));
                if points_at_member {
                    refs.push(RefTable {
                        table: extension_name.to_string(),
                        on: JoinCondition {
                            left_table: extension_name.to_string(),
                            left_column: fk.column.clone(),
                            right_table: fk.ref_table.clone(),
                            right_column: fk.ref_column.clone(),
                        },
                    });
                }
            }
        }

        refs.sort();
        Ok(refs)
    }
}
