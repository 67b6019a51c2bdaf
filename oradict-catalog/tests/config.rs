use std::fs;

use oradict_catalog::{model::OracleDataSource, CatalogObject, Progress};
use oradict_config::ConfigLoader;
use pretty_assertions::assert_eq;

mod common;

fn write_config(yaml: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(common::fixture_path(), dir.path().join("dictionary.yml")).unwrap();

    let path = dir.path().join("catalog.yml");
    fs::write(&path, yaml).unwrap();

    (dir, path)
}

#[test]
fn test_data_source_from_loaded_config() {
    oradict_logging::init_for_tests();
    let (_dir, path) = write_config(
        r#"
name: hr catalog
data_source:
  name: ${env:ORADICT_TEST_UNSET_SID:ORCL}
  admin: true
  active_schema: SYS
  schema_filter:
    exclude: ["SYS%"]
logging:
  max_value_length: 16
fixture: ${dir}/dictionary.yml
"#,
    );

    let conf = ConfigLoader::new().load(&path).unwrap();
    assert_eq!(conf.data_source.name, "ORCL");
    assert_eq!(conf.logging.max_value_length, Some(16));

    let ds = OracleDataSource::from_config(&conf).unwrap();
    let progress = Progress::new();
    ds.initialize(&progress).unwrap();

    assert_eq!(ds.name(), "ORCL");
    assert!(ds.is_admin());
    assert_eq!(
        ds.get_schemas(&progress)
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>(),
        vec!["HR", "SCOTT", "SYS"]
    );
    assert_eq!(
        ds.active_schema(&progress).unwrap().unwrap().name(),
        "SYS"
    );
}

#[test]
fn test_data_source_from_config_with_missing_fixture() {
    oradict_logging::init_for_tests();
    let (_dir, path) = write_config(
        r#"
name: broken
data_source:
  name: ORCL
fixture: ${dir}/missing.yml
"#,
    );

    let conf = ConfigLoader::new().load(&path).unwrap();
    assert!(!conf.data_source.admin);
    assert!(OracleDataSource::from_config(&conf).is_err());
}
