use std::{
    cmp::Ordering as CmpOrdering,
    collections::HashMap,
    fs,
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        RwLock,
    },
};

use itertools::Itertools;
use oradict_core::{
    config::matches_mask,
    data::DataValue,
    err::{bail, Context, Error, Result},
};
use serde_yaml::Value;

use super::{Condition, DataRow, DictionaryQuery, DictionarySource, RowExt};
use crate::progress::Progress;

/// A data dictionary held in memory.
///
/// Rows are stored per view. Querying a view which was never populated fails
/// like querying a view which does not exist. Mostly useful for tests and for
/// browsing a dictionary dump offline.
#[derive(Debug, Default)]
pub struct MemoryDictionary {
    views: RwLock<HashMap<String, Vec<DataRow>>>,
    queries: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a yaml document mapping view names to lists of rows
    ///
    /// ```yaml
    /// DBA_ROLES:
    ///   - ROLE: CONNECT
    ///     PASSWORD_REQUIRED: NO
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let parsed: HashMap<String, Vec<HashMap<String, Value>>> =
            serde_yaml::from_str(yaml).context("Failed to parse dictionary yaml")?;

        let dict = Self::new();

        for (view, rows) in parsed.into_iter() {
            let rows = rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|(col, val)| {
                            let val = to_data_value(val)
                                .with_context(|| format!("Invalid value for {}.{}", view, col))?;
                            Ok((col, val))
                        })
                        .collect::<Result<DataRow>>()
                })
                .collect::<Result<Vec<_>>>()?;

            dict.set_rows(view, rows);
        }

        Ok(dict)
    }

    /// Loads a yaml dictionary dump from the supplied path
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary file {}", path.display()))?;

        Self::from_yaml(&yaml)
    }

    /// Replaces the rows of the view
    pub fn set_rows(&self, view: impl Into<String>, rows: Vec<DataRow>) {
        let mut views = self.views.write().unwrap_or_else(|e| e.into_inner());
        views.insert(view.into(), rows);
    }

    /// Appends a row to the view, creating it if required
    pub fn add_row(&self, view: impl Into<String>, row: DataRow) {
        let mut views = self.views.write().unwrap_or_else(|e| e.into_inner());
        views.entry(view.into()).or_default().push(row);
    }

    /// The number of queries served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// While unavailable every query fails, as if the connection was lost
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl DictionarySource for MemoryDictionary {
    fn query(&self, _progress: &Progress, query: &DictionaryQuery) -> Result<Vec<DataRow>> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("Dictionary is unavailable");
        }

        self.queries.fetch_add(1, Ordering::SeqCst);

        let views = self
            .views
            .read()
            .map_err(|_| Error::msg("Failed to lock dictionary views"))?;

        let rows = match views.get(&query.view) {
            Some(rows) => rows,
            None => bail!("Table or view {} does not exist", query.view),
        };

        let rows = rows
            .iter()
            .filter(|row| query.filters.iter().all(|cond| satisfies(row, cond)))
            .sorted_by(|a, b| {
                query
                    .order_by
                    .iter()
                    .map(|col| compare(a.get_value(col), b.get_value(col)))
                    .find(|o| *o != CmpOrdering::Equal)
                    .unwrap_or(CmpOrdering::Equal)
            })
            .cloned()
            .collect();

        Ok(rows)
    }
}

fn satisfies(row: &DataRow, cond: &Condition) -> bool {
    match cond {
        Condition::Eq(col, val) => row.get_value(col) == val,
        Condition::Like {
            col,
            mask,
            ignore_case,
        } => match row.get_value(col).to_text() {
            Some(text) if *ignore_case => {
                matches_mask(&mask.to_uppercase(), &text.to_uppercase())
            }
            Some(text) => matches_mask(mask, &text),
            None => false,
        },
        Condition::In(col, vals) => vals.iter().any(|val| row.get_value(col) == val),
    }
}

/// Orders values numerically when both are numbers, otherwise by their text.
/// Nulls sort last.
fn compare(a: &DataValue, b: &DataValue) -> CmpOrdering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return CmpOrdering::Equal,
        (true, false) => return CmpOrdering::Greater,
        (false, true) => return CmpOrdering::Less,
        _ => {}
    }

    match (a.try_coerce_i64(), b.try_coerce_i64()) {
        (Ok(Some(a)), Ok(Some(b))) => a.cmp(&b),
        _ => a.to_text().cmp(&b.to_text()),
    }
}

fn to_data_value(val: Value) -> Result<DataValue> {
    Ok(match val {
        Value::Null => DataValue::Null,
        Value::Bool(b) => DataValue::Boolean(b),
        Value::String(s) => DataValue::Utf8String(s),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => DataValue::Int64(i),
            (None, Some(f)) => DataValue::Float64(f),
            _ => bail!("Unsupported number {}", n),
        },
        val => bail!("Unsupported dictionary value {:?}", val),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(cols: &[(&str, DataValue)]) -> DataRow {
        cols.iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_memory_dictionary_from_yaml() {
        let dict = MemoryDictionary::from_yaml(
            r#"
DBA_USERS:
  - USERNAME: HR
    USER_ID: 42
    LOCKED: false
    PROFILE: ~
DBA_ROLES: []
"#,
        )
        .unwrap();

        let rows = dict
            .query(&Progress::new(), &DictionaryQuery::new("DBA_USERS"))
            .unwrap();

        assert_eq!(
            rows,
            vec![row(&[
                ("USERNAME", DataValue::from("HR")),
                ("USER_ID", DataValue::Int64(42)),
                ("LOCKED", DataValue::Boolean(false)),
                ("PROFILE", DataValue::Null),
            ])]
        );

        let rows = dict
            .query(&Progress::new(), &DictionaryQuery::new("DBA_ROLES"))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_memory_dictionary_from_yaml_invalid() {
        assert!(MemoryDictionary::from_yaml("DBA_USERS: 1").is_err());
        assert!(MemoryDictionary::from_yaml("DBA_USERS:\n  - NAME: [1, 2]").is_err());
    }

    #[test]
    fn test_memory_dictionary_filter_and_order() {
        let dict = MemoryDictionary::new();
        dict.add_row(
            "ALL_TAB_PARTITIONS",
            row(&[("TABLE_NAME", "SALES".into()), ("POS", 10.into())]),
        );
        dict.add_row(
            "ALL_TAB_PARTITIONS",
            row(&[("TABLE_NAME", "OTHER".into()), ("POS", 1.into())]),
        );
        dict.add_row(
            "ALL_TAB_PARTITIONS",
            row(&[("TABLE_NAME", "SALES".into()), ("POS", 2.into())]),
        );

        let rows = dict
            .query(
                &Progress::new(),
                &DictionaryQuery::new("ALL_TAB_PARTITIONS")
                    .filter("TABLE_NAME", "SALES")
                    .order_by("POS"),
            )
            .unwrap();

        assert_eq!(
            rows.iter().map(|r| r.get_i64("POS")).collect::<Vec<_>>(),
            vec![2, 10]
        );
    }

    #[test]
    fn test_memory_dictionary_like_and_in_filters() {
        let dict = MemoryDictionary::new();
        for (owner, name, kind) in [
            ("HR", "EMPLOYEES", "TABLE"),
            ("HR", "emp_audit", "TRIGGER"),
            ("HR", "EMP_SEQ", "SEQUENCE"),
            ("SCOTT", "DEPT", "TABLE"),
        ] {
            dict.add_row(
                "ALL_OBJECTS",
                row(&[
                    ("OWNER", owner.into()),
                    ("OBJECT_NAME", name.into()),
                    ("OBJECT_TYPE", kind.into()),
                ]),
            );
        }

        let names = |query: DictionaryQuery| {
            dict.query(&Progress::new(), &query)
                .unwrap()
                .iter()
                .map(|r| r.get_string("OBJECT_NAME").unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(
            names(
                DictionaryQuery::new("ALL_OBJECTS")
                    .filter_like("OBJECT_NAME", "EMP%", true)
                    .filter_in("OBJECT_TYPE", ["TABLE", "TRIGGER"])
                    .order_by("OBJECT_NAME")
            ),
            vec!["EMPLOYEES", "emp_audit"]
        );
        assert_eq!(
            names(DictionaryQuery::new("ALL_OBJECTS").filter_like("OBJECT_NAME", "EMP%", false)),
            vec!["EMPLOYEES", "EMP_SEQ"]
        );
        assert!(names(
            DictionaryQuery::new("ALL_OBJECTS").filter_in("OBJECT_TYPE", Vec::<String>::new())
        )
        .is_empty());
    }

    #[test]
    fn test_memory_dictionary_null_filter() {
        let dict = MemoryDictionary::new();
        dict.add_row("ALL_TYPES", row(&[("TYPE_NAME", "A".into())]));
        dict.add_row(
            "ALL_TYPES",
            row(&[("TYPE_NAME", "B".into()), ("OWNER", "HR".into())]),
        );

        let rows = dict
            .query(
                &Progress::new(),
                &DictionaryQuery::new("ALL_TYPES").filter("OWNER", DataValue::Null),
            )
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_string("TYPE_NAME"), Some("A".into()));
    }

    #[test]
    fn test_memory_dictionary_unknown_view() {
        let dict = MemoryDictionary::new();

        let err = dict
            .query(&Progress::new(), &DictionaryQuery::new("DBA_NOPE"))
            .unwrap_err();

        assert_eq!(err.to_string(), "Table or view DBA_NOPE does not exist");
    }

    #[test]
    fn test_memory_dictionary_unavailable() {
        let dict = MemoryDictionary::new();
        dict.set_rows("DBA_ROLES", vec![]);

        dict.set_unavailable(true);
        assert!(dict
            .query(&Progress::new(), &DictionaryQuery::new("DBA_ROLES"))
            .is_err());
        assert_eq!(dict.query_count(), 0);

        dict.set_unavailable(false);
        assert!(dict
            .query(&Progress::new(), &DictionaryQuery::new("DBA_ROLES"))
            .is_ok());
        assert_eq!(dict.query_count(), 1);
    }
}
