use std::sync::{Arc, Weak};

use lazy_static::lazy_static;
use oradict_core::err::{Context, Result};

use crate::{
    cache::ObjectCache,
    dictionary::{DataRow, Dictionary, DictionaryScope, RowExt},
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
};

use super::{
    DbLinkLoader, JavaClassLoader, OracleDataSource, OracleDataType, OracleDbLink,
    OracleJavaClass, OracleSchedulerJob, OracleSynonym, OracleTable, OracleTrigger,
    SchedulerJobLoader, SchemaDataTypeLoader, SynonymLoader, TableLoader, TriggerLoader,
};

/// Schemas owned by Oracle itself
pub const SYSTEM_SCHEMAS: &[&str] = &[
    "ANONYMOUS",
    "APEX_PUBLIC_USER",
    "APPQOSSYS",
    "AUDSYS",
    "CTXSYS",
    "DBSNMP",
    "DIP",
    "DVSYS",
    "EXFSYS",
    "FLOWS_FILES",
    "GSMADMIN_INTERNAL",
    "LBACSYS",
    "MDDATA",
    "MDSYS",
    "MGMT_VIEW",
    "OJVMSYS",
    "OLAPSYS",
    "ORACLE_OCM",
    "ORDDATA",
    "ORDPLUGINS",
    "ORDSYS",
    "OUTLN",
    "SI_INFORMTN_SCHEMA",
    "SPATIAL_CSW_ADMIN_USR",
    "SPATIAL_WFS_ADMIN_USR",
    "SYS",
    "SYSBACKUP",
    "SYSDG",
    "SYSKM",
    "SYSMAN",
    "SYSTEM",
    "WMSYS",
    "XDB",
    "XS$NULL",
];

/// A schema and the objects it owns
#[derive(Debug)]
pub struct OracleSchema {
    data_source: Weak<OracleDataSource>,
    dictionary: Dictionary,
    name: String,
    id: i64,
    table_cache: ObjectCache<TableLoader>,
    trigger_cache: ObjectCache<TriggerLoader>,
    data_type_cache: ObjectCache<SchemaDataTypeLoader>,
    synonym_cache: ObjectCache<SynonymLoader>,
    db_link_cache: ObjectCache<DbLinkLoader>,
    java_class_cache: ObjectCache<JavaClassLoader>,
    scheduler_job_cache: ObjectCache<SchedulerJobLoader>,
}

impl OracleSchema {
    pub fn new(data_source: &OracleDataSource, name: impl Into<String>, id: i64) -> Self {
        Self {
            data_source: data_source.weak(),
            dictionary: data_source.dictionary().clone(),
            name: name.into(),
            id,
            table_cache: ObjectCache::new(TableLoader),
            trigger_cache: ObjectCache::new(TriggerLoader),
            data_type_cache: ObjectCache::new(SchemaDataTypeLoader),
            synonym_cache: ObjectCache::new(SynonymLoader),
            db_link_cache: ObjectCache::new(DbLinkLoader),
            java_class_cache: ObjectCache::new(JavaClassLoader),
            scheduler_job_cache: ObjectCache::new(SchedulerJobLoader),
        }
    }

    pub(crate) fn from_row(data_source: &OracleDataSource, row: &DataRow) -> Result<Self> {
        Ok(Self::new(
            data_source,
            row.require_string("USERNAME")?,
            row.get_opt_i64("USER_ID").unwrap_or(-1),
        ))
    }

    /// The data source owning this schema
    pub fn data_source(&self) -> Result<Arc<OracleDataSource>> {
        self.data_source
            .upgrade()
            .with_context(|| format!("The data source of schema '{}' was closed", self.name))
    }

    /// The user id, -1 if the schema was not read from the dictionary
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn is_system(&self) -> bool {
        SYSTEM_SCHEMAS.contains(&self.name.as_str())
    }

    /// Drops all cached objects of the schema
    pub fn refresh(&self) -> Result<()> {
        self.table_cache.clear_cache()?;
        self.trigger_cache.clear_cache()?;
        self.data_type_cache.clear_cache()?;
        self.synonym_cache.clear_cache()?;
        self.db_link_cache.clear_cache()?;
        self.java_class_cache.clear_cache()?;
        self.scheduler_job_cache.clear_cache()?;
        Ok(())
    }

    pub fn get_tables(&self, progress: &Progress) -> Result<Vec<Arc<OracleTable>>> {
        self.table_cache.get_all_objects(progress, self)
    }

    pub fn get_table(&self, progress: &Progress, name: &str) -> Result<Option<Arc<OracleTable>>> {
        self.table_cache.get_object(progress, self, name)
    }

    pub fn get_triggers(&self, progress: &Progress) -> Result<Vec<Arc<OracleTrigger>>> {
        self.trigger_cache.get_all_objects(progress, self)
    }

    pub fn get_trigger(
        &self,
        progress: &Progress,
        name: &str,
    ) -> Result<Option<Arc<OracleTrigger>>> {
        self.trigger_cache.get_object(progress, self, name)
    }

    pub fn get_data_types(&self, progress: &Progress) -> Result<Vec<Arc<OracleDataType>>> {
        self.data_type_cache.get_all_objects(progress, self)
    }

    pub fn get_data_type(
        &self,
        progress: &Progress,
        name: &str,
    ) -> Result<Option<Arc<OracleDataType>>> {
        self.data_type_cache.get_object(progress, self, name)
    }

    pub fn get_synonyms(&self, progress: &Progress) -> Result<Vec<Arc<OracleSynonym>>> {
        self.synonym_cache.get_all_objects(progress, self)
    }

    pub fn get_synonym(
        &self,
        progress: &Progress,
        name: &str,
    ) -> Result<Option<Arc<OracleSynonym>>> {
        self.synonym_cache.get_object(progress, self, name)
    }

    pub fn get_db_links(&self, progress: &Progress) -> Result<Vec<Arc<OracleDbLink>>> {
        self.db_link_cache.get_all_objects(progress, self)
    }

    pub fn get_db_link(
        &self,
        progress: &Progress,
        name: &str,
    ) -> Result<Option<Arc<OracleDbLink>>> {
        self.db_link_cache.get_object(progress, self, name)
    }

    pub fn get_java_classes(&self, progress: &Progress) -> Result<Vec<Arc<OracleJavaClass>>> {
        self.java_class_cache.get_all_objects(progress, self)
    }

    pub fn get_java_class(
        &self,
        progress: &Progress,
        name: &str,
    ) -> Result<Option<Arc<OracleJavaClass>>> {
        self.java_class_cache.get_object(progress, self, name)
    }

    pub fn get_scheduler_jobs(
        &self,
        progress: &Progress,
    ) -> Result<Vec<Arc<OracleSchedulerJob>>> {
        self.scheduler_job_cache.get_all_objects(progress, self)
    }

    pub fn get_scheduler_job(
        &self,
        progress: &Progress,
        name: &str,
    ) -> Result<Option<Arc<OracleSchedulerJob>>> {
        self.scheduler_job_cache.get_object(progress, self, name)
    }

    pub fn table_cache(&self) -> &ObjectCache<TableLoader> {
        &self.table_cache
    }

    pub fn data_type_cache(&self) -> &ObjectCache<SchemaDataTypeLoader> {
        &self.data_type_cache
    }

    pub fn db_link_cache(&self) -> &ObjectCache<DbLinkLoader> {
        &self.db_link_cache
    }

    pub fn java_class_cache(&self) -> &ObjectCache<JavaClassLoader> {
        &self.java_class_cache
    }

    pub fn scheduler_job_cache(&self) -> &ObjectCache<SchedulerJobLoader> {
        &self.scheduler_job_cache
    }
}

catalog_object!(OracleSchema, "schema");

impl DictionaryScope for OracleSchema {
    fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}

type P = PropertyDescriptor<OracleSchema, OracleDataSource>;

lazy_static! {
    static ref SCHEMA_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |s, _| Ok(s.name.as_str().into())),
        P::new("id", "ID", 2, |s, _| Ok(s.id.into())).hidden(),
        P::new("system", "System", 3, |s, _| Ok(s.is_system().into())),
    ];
}

impl PropertySource for OracleSchema {
    type Scope = OracleDataSource;

    fn properties() -> &'static [P] {
        SCHEMA_PROPERTIES.as_slice()
    }
}
