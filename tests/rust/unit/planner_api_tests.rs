//! Planner entry points driven from in-memory schemas

#[cfg(test)]
mod planner_api_tests {
    use ormjoin::join_planner::{build_plan_graph, plan_joins, JoinPlannerError};
    use ormjoin::schema_catalog::{DatabaseSchema, ForeignKey, SchemaCatalogError, TableSchema};

    /// customers <- invoices <- invoice_lines -> items
    fn billing() -> DatabaseSchema {
        DatabaseSchema::build(
            "billing",
            vec![
                TableSchema::new("customers"),
                TableSchema::new("invoices")
                    .with_foreign_key(ForeignKey::new("customer_id", "customers", "id")),
                TableSchema::new("invoice_lines")
                    .with_foreign_key(ForeignKey::new("invoice_id", "invoices", "id"))
                    .with_foreign_key(ForeignKey::new("item_id", "items", "id")),
                TableSchema::new("items"),
            ],
        )
        .expect("valid schema")
    }

    #[test]
    fn test_plan_graph_histogram() {
        let graph = build_plan_graph(&billing(), 4).expect("plan");
        // A four-table path: 4 singles, 3 pairs, 2 triples, 1 whole
        assert_eq!(graph.registry.width_histogram(), vec![4, 3, 2, 1]);
        assert_eq!(graph.table_edges.len(), 4);
    }

    #[test]
    fn test_every_registered_combination_is_fingerprinted() {
        let graph = build_plan_graph(&billing(), 3).expect("plan");
        for (id, combination) in graph.registry.iter() {
            assert!(combination.is_fingerprinted());
            let fingerprint = combination.fingerprint(graph.registry.table_num());
            assert_eq!(graph.registry.lookup(fingerprint), Some(id));
        }
    }

    #[test]
    fn test_table_edges_point_at_wider_combinations() {
        let graph = build_plan_graph(&billing(), 3).expect("plan");
        for (table, edges) in graph.table_edges.iter().enumerate() {
            for edge in edges {
                let result = graph
                    .registry
                    .iter()
                    .find(|(id, _)| *id == edge.result)
                    .map(|(_, c)| c)
                    .expect("edge result registered");
                assert!(result.contains(table));
                assert!(result.width() >= 2 && result.width() <= 3);
            }
        }
    }

    #[test]
    fn test_plan_joins_names_and_members() {
        let planned = plan_joins(&billing(), 2).expect("plan");
        let names: Vec<&str> = planned.joined_tables.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "join_customers__invoices",
                "join_invoice_lines__invoices",
                "join_invoice_lines__items",
            ]
        );

        let items = planned.table("items").expect("items");
        assert_eq!(items.ref_joined_tables.len(), 1);
        assert_eq!(items.ref_joined_tables[0].accessor, "join_invoice_lines");
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            plan_joins(&billing(), 0),
            Err(JoinPlannerError::InvalidJoinNum(0))
        ));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let result = DatabaseSchema::build(
            "broken",
            vec![TableSchema::new("a").with_foreign_key(ForeignKey::new("b_id", "b", "id"))],
        );
        assert!(matches!(
            result,
            Err(SchemaCatalogError::UnknownForeignKeyTarget { ref target, .. }) if target == "b"
        ));
    }
}
