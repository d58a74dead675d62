//! End-to-end generation runs against the shop fixture

#[cfg(test)]
mod generation_tests {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::Result;
    use ormjoin::config::GeneratorConfig;
    use ormjoin::generation::{run_with_config, GenerationError};
    use ormjoin::join_planner::PlannedSchema;
    use ormjoin::schema_catalog::SchemaCatalogError;
    use tempfile::TempDir;

    fn shop_fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop_schema.yaml")
    }

    fn config_for(dir: &TempDir, join_num: usize) -> GeneratorConfig {
        GeneratorConfig {
            source: shop_fixture(),
            destination: dir.path().join("generated"),
            package: "shop".to_string(),
            join_num,
            pretty: true,
        }
    }

    #[test]
    fn test_writes_plan_file() -> Result<()> {
        let dir = TempDir::new()?;
        let config = config_for(&dir, 5);

        let report = run_with_config(&config)?;

        assert_eq!(report.output_path, dir.path().join("generated/shop_joins.json"));
        assert_eq!(report.table_count, 5);
        // A five-cycle has five connected arcs of each width below five, plus the whole cycle
        assert_eq!(report.joined_table_count, 16);

        let planned: PlannedSchema = serde_json::from_str(&fs::read_to_string(&report.output_path)?)?;
        assert_eq!(planned.name, "shop");
        assert_eq!(planned.join_num, 5);
        assert_eq!(planned.joined_tables.len(), 16);
        Ok(())
    }

    #[test]
    fn test_join_num_bounds_the_plan() -> Result<()> {
        let dir = TempDir::new()?;

        let report = run_with_config(&config_for(&dir, 3))?;
        assert_eq!(report.joined_table_count, 10);

        let report = run_with_config(&config_for(&dir, 1))?;
        assert_eq!(report.joined_table_count, 0);
        Ok(())
    }

    #[test]
    fn test_compact_output() -> Result<()> {
        let dir = TempDir::new()?;
        let mut config = config_for(&dir, 2);
        config.pretty = false;

        let report = run_with_config(&config)?;
        let text = fs::read_to_string(&report.output_path)?;
        assert!(!text.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["joined_tables"].as_array().map(Vec::len), Some(5));
        Ok(())
    }

    #[test]
    fn test_rerun_is_byte_identical() -> Result<()> {
        let dir = TempDir::new()?;
        let config = config_for(&dir, 4);

        let first = fs::read(run_with_config(&config)?.output_path)?;
        let second = fs::read(run_with_config(&config)?.output_path)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_missing_source_is_reported() -> Result<()> {
        let dir = TempDir::new()?;
        let mut config = config_for(&dir, 5);
        config.source = dir.path().join("nowhere.yaml");

        let err = run_with_config(&config).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::SchemaCatalog(SchemaCatalogError::ConfigReadError { .. })
        ));
        assert!(!config.output_path().exists());
        Ok(())
    }

    #[test]
    fn test_unknown_reference_writes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let source = dir.path().join("broken.yaml");
        fs::write(
            &source,
            r#"
tables:
  - name: orders
    foreign_keys:
      - column: user_id
        references: users
"#,
        )?;
        let mut config = config_for(&dir, 5);
        config.source = source;

        let err = run_with_config(&config).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::SchemaCatalog(SchemaCatalogError::UnknownForeignKeyTarget { .. })
        ));
        assert!(!config.destination.exists());
        Ok(())
    }
}
