//! Planning scenarios described as schema YAML

#[cfg(test)]
mod scenario_tests {
    use anyhow::Result;
    use ormjoin::generation::{plan_from_yaml_str, GenerationError};
    use ormjoin::join_planner::{JoinPlannerError, PlannedSchema};
    use ormjoin::utils::join_naming::extract_tables_from_joined_name;
    use test_case::test_case;

    const SINGLE: &str = r#"
tables:
  - name: a
"#;

    const PAIR: &str = r#"
tables:
  - name: a
    foreign_keys:
      - column: b_id
        references: b
  - name: b
"#;

    const CHAIN: &str = r#"
name: chain
tables:
  - name: a
    foreign_keys:
      - column: b_id
        references: b
  - name: b
    foreign_keys:
      - column: c_id
        references: c
  - name: c
"#;

    fn joined_names(planned: &PlannedSchema) -> Vec<&str> {
        planned
            .joined_tables
            .iter()
            .map(|j| j.name.as_str())
            .collect()
    }

    #[test]
    fn test_single_table_has_no_joins() -> Result<()> {
        let planned = plan_from_yaml_str(SINGLE, 5)?;
        assert_eq!(planned.name, "default");
        assert!(planned.joined_tables.is_empty());

        let a = planned.table("a").expect("table a");
        assert!(a.ref_tables.is_empty());
        assert!(a.ref_joined_tables.is_empty());
        Ok(())
    }

    #[test]
    fn test_pair_is_joined_from_both_sides() -> Result<()> {
        let planned = plan_from_yaml_str(PAIR, 5)?;
        assert_eq!(joined_names(&planned), vec!["join_a__b"]);

        let a = planned.table("a").expect("table a");
        assert_eq!(a.ref_tables.len(), 1);
        assert_eq!(a.ref_tables[0].on.left_column, "b_id");
        assert_eq!(a.ref_tables[0].on.right_column, "id");

        for (table, partner) in [("a", "b"), ("b", "a")] {
            let refs = &planned.table(table).expect("table").ref_joined_tables;
            assert_eq!(refs.len(), 1, "{} should reach the pair once", table);
            assert_eq!(refs[0].joined_table, "join_a__b");
            assert_eq!(refs[0].via_ref_table.as_deref(), Some(partner));
        }
        Ok(())
    }

    #[test_case(5, &["join_a__b", "join_b__c", "join_a__b__c"] ; "wide enough for the whole chain")]
    #[test_case(2, &["join_a__b", "join_b__c"] ; "width bound excludes the triple")]
    #[test_case(1, &[] ; "joins disabled")]
    fn test_chain(join_num: usize, expected: &[&str]) -> Result<()> {
        let planned = plan_from_yaml_str(CHAIN, join_num)?;
        assert_eq!(planned.name, "chain");
        assert_eq!(joined_names(&planned), expected);
        assert!(planned.joined_table_for(&["a", "c"]).is_none());
        Ok(())
    }

    #[test]
    fn test_chain_pair_chains_into_triple() -> Result<()> {
        let planned = plan_from_yaml_str(CHAIN, 5)?;
        let ab = planned.joined_table_for(&["b", "a"]).expect("joined a, b");

        assert_eq!(ab.ref_tables.len(), 1);
        assert_eq!(ab.ref_tables[0].table, "c");
        assert_eq!(ab.ref_tables[0].on.left_table, "b");

        assert_eq!(ab.ref_joined_tables.len(), 1);
        let next = &ab.ref_joined_tables[0];
        assert_eq!(next.joined_table, "join_a__b__c");
        assert_eq!(next.width, 3);
        assert_eq!(next.accessor, "join_c");
        Ok(())
    }

    #[test]
    fn test_joined_names_round_trip_to_members() -> Result<()> {
        let planned = plan_from_yaml_str(CHAIN, 5)?;
        for joined in &planned.joined_tables {
            assert_eq!(
                extract_tables_from_joined_name(&joined.name).as_ref(),
                Some(&joined.tables)
            );
        }
        Ok(())
    }

    #[test]
    fn test_zero_join_num_is_rejected() {
        let err = plan_from_yaml_str(PAIR, 0).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::JoinPlanner(JoinPlannerError::InvalidJoinNum(0))
        ));
    }

    #[test]
    fn test_malformed_yaml_is_rejected() {
        assert!(matches!(
            plan_from_yaml_str("tables: [", 5),
            Err(GenerationError::SchemaCatalog(_))
        ));
    }
}
