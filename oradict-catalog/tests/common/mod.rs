#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use oradict_catalog::{
    dictionary::MemoryDictionary,
    model::{OracleDataSource, OracleSchema},
    Progress,
};
use oradict_core::config::DataSourceConfig;

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("dictionary.yml")
}

/// Loads the HR fixture into an in-memory dictionary
pub fn dictionary() -> Arc<MemoryDictionary> {
    oradict_logging::init_for_tests();

    Arc::new(MemoryDictionary::load(&fixture_path()).unwrap())
}

pub fn data_source(admin: bool) -> (Arc<MemoryDictionary>, Arc<OracleDataSource>) {
    let dict = dictionary();
    let ds = OracleDataSource::new(DataSourceConfig::new("ORCL", admin), dict.clone());

    (dict, ds)
}

pub fn schema(ds: &OracleDataSource, name: &str) -> Arc<OracleSchema> {
    ds.get_schema(&Progress::new(), name).unwrap().unwrap()
}
