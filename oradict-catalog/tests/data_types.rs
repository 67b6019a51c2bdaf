use std::sync::Arc;

use oradict_catalog::{
    model::{DataKind, OracleDataType},
    CatalogObject, LazyValue, Progress,
};
use pretty_assertions::assert_eq;

mod common;

#[test]
fn test_data_source_types_include_predefined() {
    let (_, ds) = common::data_source(true);
    let progress = Progress::new();

    ds.initialize(&progress).unwrap();

    let xml = ds.get_local_data_type("XMLTYPE").unwrap().unwrap();
    assert!(!xml.is_predefined());
    assert_eq!(xml.data_kind(), DataKind::Object);

    let number = ds.get_local_data_type("NUMBER").unwrap().unwrap();
    assert!(number.is_predefined());
    assert_eq!(number.data_kind(), DataKind::Numeric);

    let timestamp = ds
        .get_local_data_type("TIMESTAMP(6) WITH TIME ZONE")
        .unwrap()
        .unwrap();
    assert_eq!(timestamp.name(), "TIMESTAMP WITH TIME ZONE");
    assert_eq!(timestamp.data_kind(), DataKind::DateTime);

    let types = ds.get_data_types(&progress).unwrap();
    assert_eq!(types.iter().filter(|t| t.name() == "NUMBER").count(), 1);
}

#[test]
fn test_schema_types() {
    let (_, ds) = common::data_source(true);
    let progress = Progress::new();
    let hr = common::schema(&ds, "HR");

    let types = hr.get_data_types(&progress).unwrap();

    assert_eq!(
        types.iter().map(|t| t.name()).collect::<Vec<_>>(),
        vec!["ADDRESS_T", "EMPLOYEE_T", "ORPHAN_T", "PERSON_T", "PHONES_T"]
    );

    let phones = hr.get_data_type(&progress, "PHONES_T").unwrap().unwrap();
    assert_eq!(phones.data_kind(), DataKind::Array);
    assert_eq!(phones.full_name(), "HR.PHONES_T");

    let person = hr.get_data_type(&progress, "PERSON_T").unwrap().unwrap();
    assert!(person.has_attributes());
    assert!(person.has_methods());
    assert!(!person.is_final());
}

#[test]
fn test_super_type_resolves_through_schema() {
    let (_, ds) = common::data_source(true);
    let progress = Progress::new();
    let hr = common::schema(&ds, "HR");

    let employee = hr.get_data_type(&progress, "EMPLOYEE_T").unwrap().unwrap();
    let person = hr.get_data_type(&progress, "PERSON_T").unwrap().unwrap();

    assert_eq!(
        employee.super_type(None, &ds).unwrap(),
        LazyValue::Unresolved("HR.PERSON_T".into())
    );
    assert_eq!(
        employee.super_type(Some(&progress), &ds).unwrap(),
        LazyValue::Resolved(person.clone())
    );
    // once resolved the object is returned even without a progress
    assert_eq!(
        employee.super_type(None, &ds).unwrap(),
        LazyValue::Resolved(person)
    );
    assert!(employee.has_attributes());
    assert!(!employee.has_methods());

    let address = hr.get_data_type(&progress, "ADDRESS_T").unwrap().unwrap();
    assert_eq!(address.super_type(Some(&progress), &ds).unwrap(), LazyValue::Null);
}

#[test]
fn test_missing_super_type_falls_back_to_null() {
    let (dict, ds) = common::data_source(true);
    let progress = Progress::new();
    let hr = common::schema(&ds, "HR");

    let orphan = hr.get_data_type(&progress, "ORPHAN_T").unwrap().unwrap();

    assert_eq!(orphan.super_type(Some(&progress), &ds).unwrap(), LazyValue::Null);
    assert_eq!(
        orphan.super_type(None, &ds).unwrap(),
        LazyValue::Unresolved("HR.DROPPED_T".into())
    );

    // a miss is looked up again on the next call
    let queries = dict.query_count();
    dict.add_row(
        "ALL_TYPES",
        [
            ("OWNER", "HR"),
            ("TYPE_NAME", "DROPPED_T"),
            ("TYPECODE", "OBJECT"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into()))
        .collect(),
    );
    hr.refresh().unwrap();

    let resolved = orphan.super_type(Some(&progress), &ds).unwrap();
    assert_eq!(resolved.name(), Some("DROPPED_T"));
    assert!(resolved.is_resolved());
    assert!(dict.query_count() > queries);
}

#[test]
fn test_super_type_lookup_failure_propagates() {
    let (dict, ds) = common::data_source(true);
    let progress = Progress::new();
    let hr = common::schema(&ds, "HR");
    let employee = hr.get_data_type(&progress, "EMPLOYEE_T").unwrap().unwrap();

    ds.refresh().unwrap();
    dict.set_unavailable(true);

    let err = employee.super_type(Some(&progress), &ds).unwrap_err();
    assert_eq!(err.to_string(), "Dictionary is unavailable");
    assert_eq!(
        employee.super_type(None, &ds).unwrap(),
        LazyValue::Unresolved("HR.PERSON_T".into())
    );

    dict.set_unavailable(false);
    assert!(employee.super_type(Some(&progress), &ds).unwrap().is_resolved());
}

#[test]
fn test_resolve_data_type_by_full_name() {
    let (_, ds) = common::data_source(true);
    let progress = Progress::new();

    let address = ds.resolve_data_type(&progress, "HR.ADDRESS_T").unwrap().unwrap();
    assert_eq!(address.owner(), Some("HR"));

    let number = ds.resolve_data_type(&progress, "NUMBER(10,2)").unwrap().unwrap();
    assert_eq!(number.name(), "NUMBER");
    assert_eq!(number.owner(), None);

    assert!(ds.resolve_data_type(&progress, "GHOST.ADDRESS_T").unwrap().is_none());
    assert!(ds.resolve_data_type(&progress, "HR.GHOST_T").unwrap().is_none());
    assert!(ds.resolve_data_type(&progress, "GHOST_T").unwrap().is_none());
}

#[test]
fn test_resolve_declares_unknown_types() {
    let (_, ds) = common::data_source(true);
    let progress = Progress::new();
    ds.initialize(&progress).unwrap();

    let varchar = OracleDataType::resolve(&progress, &ds, None, "VARCHAR2(30)").unwrap();
    assert_eq!(varchar.name(), "VARCHAR2");
    assert_eq!(varchar.data_kind(), DataKind::String);

    let mystery = OracleDataType::resolve(&progress, &ds, None, "MYSTERY").unwrap();
    assert!(mystery.is_predefined());
    assert_eq!(mystery.data_kind(), DataKind::Unknown);
    assert!(Arc::ptr_eq(
        &mystery,
        &ds.get_local_data_type("MYSTERY").unwrap().unwrap()
    ));
    assert!(Arc::ptr_eq(
        &mystery,
        &OracleDataType::resolve(&progress, &ds, None, "MYSTERY").unwrap()
    ));

    let local = OracleDataType::resolve(&progress, &ds, Some("HR"), "LOCAL_T").unwrap();
    assert_eq!(local.full_name(), "HR.LOCAL_T");
    let hr = common::schema(&ds, "HR");
    assert!(Arc::ptr_eq(
        &local,
        &hr.get_data_type(&progress, "LOCAL_T").unwrap().unwrap()
    ));

    let ghost = OracleDataType::resolve(&progress, &ds, Some("GHOST"), "GHOST_T").unwrap();
    assert_eq!(ghost.owner(), None);
}

#[test]
fn test_declared_type_survives_cache_load() {
    let (_, ds) = common::data_source(true);
    let progress = Progress::new();

    let declared = OracleDataType::resolve(&progress, &ds, None, "PL/SQL BOOLEAN").unwrap();
    ds.initialize(&progress).unwrap();

    let found = ds
        .resolve_data_type(&progress, "PL/SQL BOOLEAN")
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&declared, &found));
    assert!(Arc::ptr_eq(
        &declared,
        &OracleDataType::resolve(&progress, &ds, None, "PL/SQL BOOLEAN").unwrap()
    ));
    assert!(ds
        .get_data_types(&progress)
        .unwrap()
        .iter()
        .any(|t| Arc::ptr_eq(t, &declared)));
}
