use std::{cmp::Ordering, sync::Arc};

use enum_as_inner::EnumAsInner;
use once_cell::sync::OnceCell;
use oradict_core::err::{Context, Result};
use oradict_logging::debug;

use crate::{
    dictionary::{DataRow, DictionaryQuery, DictionaryScope, RowExt},
    object::CatalogObject,
    progress::Progress,
};

use super::{
    OracleDataSource, OracleDataType, OracleDbLink, OracleJavaClass, OracleSchedulerJob,
    OracleSchema, OracleSynonym, OracleTable, OracleTrigger,
};

/// The schema owning public synonyms
pub const PUBLIC_SCHEMA: &str = "PUBLIC";

/// Kinds of schema objects which can be searched for by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleObjectType {
    Table,
    Trigger,
    Synonym,
    Type,
    JavaClass,
    Job,
    DatabaseLink,
}

impl OracleObjectType {
    pub const ALL: [OracleObjectType; 7] = [
        Self::Table,
        Self::Trigger,
        Self::Synonym,
        Self::Type,
        Self::JavaClass,
        Self::Job,
        Self::DatabaseLink,
    ];

    /// The name used in the OBJECT_TYPE column of the dictionary
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Table => "TABLE",
            Self::Trigger => "TRIGGER",
            Self::Synonym => "SYNONYM",
            Self::Type => "TYPE",
            Self::JavaClass => "JAVA CLASS",
            Self::Job => "JOB",
            Self::DatabaseLink => "DATABASE LINK",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.type_name() == name)
    }

    /// Looks the object up through the schema caches
    pub fn find_object(
        &self,
        progress: &Progress,
        schema: &OracleSchema,
        name: &str,
    ) -> Result<Option<SchemaObject>> {
        Ok(match self {
            Self::Table => schema.get_table(progress, name)?.map(SchemaObject::Table),
            Self::Trigger => schema.get_trigger(progress, name)?.map(SchemaObject::Trigger),
            Self::Synonym => schema.get_synonym(progress, name)?.map(SchemaObject::Synonym),
            Self::Type => schema.get_data_type(progress, name)?.map(SchemaObject::DataType),
            Self::JavaClass => schema
                .get_java_class(progress, name)?
                .map(SchemaObject::JavaClass),
            Self::Job => schema
                .get_scheduler_job(progress, name)?
                .map(SchemaObject::Job),
            Self::DatabaseLink => schema.get_db_link(progress, name)?.map(SchemaObject::DbLink),
        })
    }
}

/// An object found in a schema
#[derive(Debug, Clone, EnumAsInner)]
pub enum SchemaObject {
    Table(Arc<OracleTable>),
    Trigger(Arc<OracleTrigger>),
    Synonym(Arc<OracleSynonym>),
    DataType(Arc<OracleDataType>),
    JavaClass(Arc<OracleJavaClass>),
    Job(Arc<OracleSchedulerJob>),
    DbLink(Arc<OracleDbLink>),
}

impl SchemaObject {
    fn object(&self) -> &dyn CatalogObject {
        match self {
            SchemaObject::Table(o) => &**o,
            SchemaObject::Trigger(o) => &**o,
            SchemaObject::Synonym(o) => &**o,
            SchemaObject::DataType(o) => &**o,
            SchemaObject::JavaClass(o) => &**o,
            SchemaObject::Job(o) => &**o,
            SchemaObject::DbLink(o) => &**o,
        }
    }
}

impl CatalogObject for SchemaObject {
    fn name(&self) -> &str {
        self.object().name()
    }

    fn kind(&self) -> &'static str {
        self.object().kind()
    }
}

/// Options of a search by name mask
#[derive(Debug, Clone)]
pub struct ObjectsSearchParams {
    /// SQL LIKE mask matched against object names
    pub mask: String,
    pub object_types: Vec<OracleObjectType>,
    pub case_sensitive: bool,
    pub max_results: usize,
    /// Restricts the search to a single schema
    pub schema: Option<Arc<OracleSchema>>,
    /// Also match table comments against the mask
    pub search_in_comments: bool,
}

impl ObjectsSearchParams {
    pub fn new(mask: impl Into<String>, object_types: Vec<OracleObjectType>) -> Self {
        Self {
            mask: mask.into(),
            object_types,
            case_sensitive: false,
            max_results: 100,
            schema: None,
            search_in_comments: false,
        }
    }
}

/// A search hit, the object itself is looked up on demand
#[derive(Debug)]
pub struct ObjectReference {
    name: String,
    schema: Arc<OracleSchema>,
    object_type: OracleObjectType,
    resolved: OnceCell<SchemaObject>,
}

impl ObjectReference {
    pub fn new(
        name: impl Into<String>,
        schema: Arc<OracleSchema>,
        object_type: OracleObjectType,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            object_type,
            resolved: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<OracleSchema> {
        &self.schema
    }

    pub fn object_type(&self) -> OracleObjectType {
        self.object_type
    }

    /// Public synonyms are referenced without their schema
    pub fn fully_qualified_name(&self) -> String {
        if self.object_type == OracleObjectType::Synonym && self.schema.name() == PUBLIC_SCHEMA {
            self.name.clone()
        } else {
            format!("{}.{}", self.schema.name(), self.name)
        }
    }

    /// Looks the object up in its schema, the result is kept once found
    pub fn resolve(&self, progress: &Progress) -> Result<SchemaObject> {
        self.resolved
            .get_or_try_init(|| {
                self.object_type
                    .find_object(progress, &self.schema, &self.name)?
                    .with_context(|| {
                        format!(
                            "{} '{}' not found in schema '{}'",
                            self.object_type.type_name(),
                            self.name,
                            self.schema.name()
                        )
                    })
            })
            .map(Clone::clone)
    }

    fn same_target(&self, other: &ObjectReference) -> bool {
        self.object_type == other.object_type
            && self.name == other.name
            && self.schema.name() == other.schema.name()
    }
}

impl OracleDataSource {
    /// Finds schema objects whose name matches the mask.
    ///
    /// Hits in schemas excluded by the schema filter are skipped. Results in
    /// the active schema come first, the rest is ordered by schema and name.
    pub fn find_objects_by_mask(
        &self,
        progress: &Progress,
        params: &ObjectsSearchParams,
    ) -> Result<Vec<ObjectReference>> {
        let mut found = vec![];

        self.search_object_names(progress, params, &mut found)?;

        if params.search_in_comments {
            self.search_table_comments(progress, params, &mut found)?;
        }

        let active = self.active_schema_name();
        found.sort_by(|a, b| compare_references(active, a, b));

        Ok(found)
    }

    fn search_object_names(
        &self,
        progress: &Progress,
        params: &ObjectsSearchParams,
        found: &mut Vec<ObjectReference>,
    ) -> Result<()> {
        if params.object_types.is_empty() {
            return Ok(());
        }

        let mut query = DictionaryQuery::new(self.dictionary().all_view("OBJECTS"))
            .filter_in(
                "OBJECT_TYPE",
                params.object_types.iter().map(|t| t.type_name()),
            )
            .filter_like("OBJECT_NAME", params.mask.as_str(), !params.case_sensitive);

        if let Some(schema) = params.schema.as_ref() {
            query = query.filter("OWNER", schema.name());
        }

        let rows = self.dictionary().query(progress, &query.order_by("OBJECT_NAME"))?;

        self.collect_references(progress, params, &rows, "OBJECT_NAME", "OBJECT_TYPE", found)
    }

    fn search_table_comments(
        &self,
        progress: &Progress,
        params: &ObjectsSearchParams,
        found: &mut Vec<ObjectReference>,
    ) -> Result<()> {
        if found.len() >= params.max_results
            || !params.object_types.contains(&OracleObjectType::Table)
        {
            return Ok(());
        }

        let mut query = DictionaryQuery::new("ALL_TAB_COMMENTS").filter_like(
            "COMMENTS",
            params.mask.as_str(),
            !params.case_sensitive,
        );

        if let Some(schema) = params.schema.as_ref() {
            query = query.filter("OWNER", schema.name());
        }

        let rows = self.dictionary().query(progress, &query.order_by("TABLE_NAME"))?;

        self.collect_references(progress, params, &rows, "TABLE_NAME", "TABLE_TYPE", found)
    }

    fn collect_references(
        &self,
        progress: &Progress,
        params: &ObjectsSearchParams,
        rows: &[DataRow],
        name_col: &str,
        type_col: &str,
        found: &mut Vec<ObjectReference>,
    ) -> Result<()> {
        for row in rows.iter() {
            if progress.is_cancelled() || found.len() >= params.max_results {
                break;
            }

            let (owner, name, object_type) = match (
                row.get_string("OWNER"),
                row.get_string(name_col),
                row.get_string(type_col)
                    .and_then(|t| OracleObjectType::from_type_name(&t)),
            ) {
                (Some(owner), Some(name), Some(object_type))
                    if params.object_types.contains(&object_type) =>
                {
                    (owner, name, object_type)
                }
                _ => continue,
            };

            let schema = match self.get_schema(progress, &owner)? {
                Some(schema) => schema,
                None => {
                    debug!("Schema '{}' not found. Probably was filtered", owner);
                    continue;
                }
            };

            let reference = ObjectReference::new(name, schema, object_type);
            if !found.iter().any(|r| r.same_target(&reference)) {
                found.push(reference);
            }
        }

        Ok(())
    }
}

fn compare_references(
    active: Option<&str>,
    a: &ObjectReference,
    b: &ObjectReference,
) -> Ordering {
    let (a_schema, b_schema) = (a.schema.name(), b.schema.name());

    if a_schema == b_schema {
        return a.name.cmp(&b.name);
    }

    match (Some(a_schema) == active, Some(b_schema) == active) {
        (true, _) => Ordering::Less,
        (_, true) => Ordering::Greater,
        _ => a_schema.cmp(b_schema),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_object_type_names() {
        for t in OracleObjectType::ALL {
            assert_eq!(OracleObjectType::from_type_name(t.type_name()), Some(t));
        }

        assert_eq!(
            OracleObjectType::from_type_name("JAVA CLASS"),
            Some(OracleObjectType::JavaClass)
        );
        assert_eq!(OracleObjectType::from_type_name("VIEW"), None);
        assert_eq!(OracleObjectType::from_type_name("table"), None);
    }

    #[test]
    fn test_search_params_defaults() {
        let params = ObjectsSearchParams::new("EMP%", vec![OracleObjectType::Table]);

        assert!(!params.case_sensitive);
        assert!(!params.search_in_comments);
        assert_eq!(params.max_results, 100);
        assert!(params.schema.is_none());
    }
}
