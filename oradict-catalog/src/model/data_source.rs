use std::sync::{Arc, Weak};

use lazy_static::lazy_static;
use oradict_core::{
    config::{CatalogConfig, DataSourceConfig},
    data::DataValue,
    err::{Context, Result},
};
use oradict_logging::{debug, info};

use crate::{
    cache::{CacheLoader, ObjectCache},
    dictionary::{DataRow, Dictionary, DictionaryQuery, DictionaryScope, DictionarySource, MemoryDictionary},
    object::CatalogObject,
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
};

use super::{
    normalize_type_name, OracleDataType, OracleRole, OracleSchema, OracleTablespace, OracleUser,
};

/// An Oracle database, the root of the catalog
#[derive(Debug)]
pub struct OracleDataSource {
    this: Weak<Self>,
    name: String,
    config: DataSourceConfig,
    dictionary: Dictionary,
    schema_cache: ObjectCache<SchemaLoader>,
    user_cache: ObjectCache<UserLoader>,
    role_cache: ObjectCache<RoleLoader>,
    tablespace_cache: ObjectCache<TablespaceLoader>,
    data_type_cache: ObjectCache<DataTypeLoader>,
}

impl OracleDataSource {
    pub fn new(config: DataSourceConfig, source: Arc<dyn DictionarySource>) -> Arc<Self> {
        let dictionary = Dictionary::new(source, config.admin);
        Self::with_dictionary(config, dictionary)
    }

    pub fn with_dictionary(config: DataSourceConfig, dictionary: Dictionary) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            name: config.name.clone(),
            config,
            dictionary,
            schema_cache: ObjectCache::new(SchemaLoader),
            user_cache: ObjectCache::new(UserLoader),
            role_cache: ObjectCache::new(RoleLoader),
            tablespace_cache: ObjectCache::new(TablespaceLoader),
            data_type_cache: ObjectCache::new(DataTypeLoader),
        })
    }

    /// Opens the data source of the catalog config, serving the dictionary
    /// from its yaml fixture
    pub fn from_config(conf: &CatalogConfig) -> Result<Arc<Self>> {
        let path = conf
            .fixture
            .as_ref()
            .context("The catalog config does not specify a dictionary fixture")?;

        let source = Arc::new(MemoryDictionary::load(path)?);
        let dictionary = Dictionary::new(source, conf.data_source.admin)
            .with_log_limit(conf.logging.max_value_length);

        Ok(Self::with_dictionary(conf.data_source.clone(), dictionary))
    }

    pub(crate) fn weak(&self) -> Weak<Self> {
        self.this.clone()
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    /// Whether the DBA_* views are readable
    pub fn is_admin(&self) -> bool {
        self.dictionary.is_admin()
    }

    pub fn active_schema_name(&self) -> Option<&str> {
        self.config.active_schema.as_deref()
    }

    /// Reads the metadata required up front, the remaining catalog is loaded on demand
    pub fn initialize(&self, progress: &Progress) -> Result<()> {
        info!("Initializing data source '{}'", self.name);

        let types = self.data_type_cache.get_all_objects(progress, self)?;
        debug!("Found {} data types in '{}'", types.len(), self.name);

        if let Some(schema) = self.active_schema(progress)? {
            debug!("Active schema of '{}' is '{}'", self.name, schema.name());
        }

        Ok(())
    }

    /// Drops all cached metadata
    pub fn refresh(&self) -> Result<()> {
        info!("Refreshing data source '{}'", self.name);

        self.schema_cache.clear_cache()?;
        self.user_cache.clear_cache()?;
        self.role_cache.clear_cache()?;
        self.tablespace_cache.clear_cache()?;
        self.data_type_cache.clear_cache()?;

        Ok(())
    }

    pub fn active_schema(&self, progress: &Progress) -> Result<Option<Arc<OracleSchema>>> {
        match self.active_schema_name() {
            Some(name) => self.get_schema(progress, name),
            None => Ok(None),
        }
    }

    pub fn get_schemas(&self, progress: &Progress) -> Result<Vec<Arc<OracleSchema>>> {
        self.schema_cache.get_all_objects(progress, self)
    }

    pub fn get_schema(&self, progress: &Progress, name: &str) -> Result<Option<Arc<OracleSchema>>> {
        self.schema_cache.get_object(progress, self, name)
    }

    pub fn get_users(&self, progress: &Progress) -> Result<Vec<Arc<OracleUser>>> {
        self.user_cache.get_all_objects(progress, self)
    }

    pub fn get_user(&self, progress: &Progress, name: &str) -> Result<Option<Arc<OracleUser>>> {
        self.user_cache.get_object(progress, self, name)
    }

    pub fn get_roles(&self, progress: &Progress) -> Result<Vec<Arc<OracleRole>>> {
        self.role_cache.get_all_objects(progress, self)
    }

    pub fn get_role(&self, progress: &Progress, name: &str) -> Result<Option<Arc<OracleRole>>> {
        self.role_cache.get_object(progress, self, name)
    }

    pub fn get_tablespaces(&self, progress: &Progress) -> Result<Vec<Arc<OracleTablespace>>> {
        self.tablespace_cache.get_all_objects(progress, self)
    }

    pub fn get_tablespace(
        &self,
        progress: &Progress,
        name: &str,
    ) -> Result<Option<Arc<OracleTablespace>>> {
        self.tablespace_cache.get_object(progress, self, name)
    }

    /// The data types which do not belong to any schema
    pub fn get_data_types(&self, progress: &Progress) -> Result<Vec<Arc<OracleDataType>>> {
        self.data_type_cache.get_all_objects(progress, self)
    }

    /// Returns an already loaded data type which does not belong to any schema
    pub fn get_local_data_type(&self, name: &str) -> Result<Option<Arc<OracleDataType>>> {
        self.data_type_cache.get_cached_object(&normalize_type_name(name))
    }

    /// Looks up a data type by its full name, either `OWNER.NAME` or just `NAME`
    pub fn resolve_data_type(
        &self,
        progress: &Progress,
        full_name: &str,
    ) -> Result<Option<Arc<OracleDataType>>> {
        match full_name.split_once('.') {
            Some((owner, name)) => {
                let schema = match self.get_schema(progress, owner)? {
                    Some(schema) => schema,
                    None => {
                        debug!("Schema '{}' of data type '{}' not found", owner, name);
                        return Ok(None);
                    }
                };

                schema.get_data_type(progress, &normalize_type_name(name))
            }
            None => self
                .data_type_cache
                .get_object(progress, self, &normalize_type_name(full_name)),
        }
    }

    pub fn schema_cache(&self) -> &ObjectCache<SchemaLoader> {
        &self.schema_cache
    }

    pub fn user_cache(&self) -> &ObjectCache<UserLoader> {
        &self.user_cache
    }

    pub fn role_cache(&self) -> &ObjectCache<RoleLoader> {
        &self.role_cache
    }

    pub fn tablespace_cache(&self) -> &ObjectCache<TablespaceLoader> {
        &self.tablespace_cache
    }

    pub fn data_type_cache(&self) -> &ObjectCache<DataTypeLoader> {
        &self.data_type_cache
    }
}

catalog_object!(OracleDataSource, "data source");

impl DictionaryScope for OracleDataSource {
    fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}

type P = PropertyDescriptor<OracleDataSource, ()>;

lazy_static! {
    static ref DATA_SOURCE_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |ds, _| Ok(ds.name.as_str().into())),
        P::new("admin", "Admin", 2, |ds, _| Ok(ds.is_admin().into())),
        P::new("active_schema", "Active Schema", 3, |ds, _| {
            Ok(ds.active_schema_name().into())
        }),
    ];
}

impl PropertySource for OracleDataSource {
    type Scope = ();

    fn properties() -> &'static [P] {
        DATA_SOURCE_PROPERTIES.as_slice()
    }
}

/// Lists the schemas of the data source
pub struct SchemaLoader;

impl CacheLoader for SchemaLoader {
    type Owner = OracleDataSource;
    type Object = OracleSchema;

    const DESCRIPTION: &'static str = "schemas";

    fn query(&self, owner: &OracleDataSource) -> DictionaryQuery {
        DictionaryQuery::new(owner.dictionary.all_view("USERS")).order_by("USERNAME")
    }

    fn fetch(&self, owner: &OracleDataSource, row: &DataRow) -> Result<OracleSchema> {
        OracleSchema::from_row(owner, row)
    }

    fn complete(
        &self,
        _progress: &Progress,
        owner: &OracleDataSource,
        objects: &mut Vec<Arc<OracleSchema>>,
    ) -> Result<()> {
        if let Some(filter) = owner.config.schema_filter.as_ref() {
            objects.retain(|s| filter.matches(s.name()));
        }

        // the active schema is listed even when filtered out
        if let Some(active) = owner.active_schema_name() {
            if !objects.iter().any(|s| s.name() == active) {
                objects.push(Arc::new(OracleSchema::new(owner, active, -1)));
            }
        }

        objects.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(())
    }
}

/// Lists the users of the data source
pub struct UserLoader;

impl CacheLoader for UserLoader {
    type Owner = OracleDataSource;
    type Object = OracleUser;

    const DESCRIPTION: &'static str = "users";

    fn query(&self, owner: &OracleDataSource) -> DictionaryQuery {
        DictionaryQuery::new(owner.dictionary.all_view("USERS")).order_by("USERNAME")
    }

    fn fetch(&self, owner: &OracleDataSource, row: &DataRow) -> Result<OracleUser> {
        OracleUser::from_row(owner.dictionary.clone(), row)
    }
}

/// Lists the roles of the data source, requires DBA access
pub struct RoleLoader;

impl CacheLoader for RoleLoader {
    type Owner = OracleDataSource;
    type Object = OracleRole;

    const DESCRIPTION: &'static str = "roles";

    fn query(&self, _owner: &OracleDataSource) -> DictionaryQuery {
        DictionaryQuery::new("DBA_ROLES").order_by("ROLE")
    }

    fn fetch(&self, owner: &OracleDataSource, row: &DataRow) -> Result<OracleRole> {
        OracleRole::from_row(owner.dictionary.clone(), row)
    }
}

/// Lists the tablespaces of the data source
pub struct TablespaceLoader;

impl CacheLoader for TablespaceLoader {
    type Owner = OracleDataSource;
    type Object = OracleTablespace;

    const DESCRIPTION: &'static str = "tablespaces";

    fn query(&self, owner: &OracleDataSource) -> DictionaryQuery {
        DictionaryQuery::new(owner.dictionary.admin_view("TABLESPACES")).order_by("TABLESPACE_NAME")
    }

    fn fetch(&self, _owner: &OracleDataSource, row: &DataRow) -> Result<OracleTablespace> {
        OracleTablespace::from_row(row)
    }
}

/// Lists the data types without an owner, complemented with the predefined types
pub struct DataTypeLoader;

impl CacheLoader for DataTypeLoader {
    type Owner = OracleDataSource;
    type Object = OracleDataType;

    const DESCRIPTION: &'static str = "data types";

    fn query(&self, _owner: &OracleDataSource) -> DictionaryQuery {
        DictionaryQuery::new("ALL_TYPES")
            .filter("OWNER", DataValue::Null)
            .order_by("TYPE_NAME")
    }

    fn fetch(&self, _owner: &OracleDataSource, row: &DataRow) -> Result<OracleDataType> {
        OracleDataType::from_row(None, row)
    }

    fn complete(
        &self,
        _progress: &Progress,
        _owner: &OracleDataSource,
        objects: &mut Vec<Arc<OracleDataType>>,
    ) -> Result<()> {
        for predefined in OracleDataType::predefined_types() {
            if !objects.iter().any(|t| t.name() == predefined.name()) {
                objects.push(Arc::new(predefined));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use oradict_core::config::ObjectFilterConfig;

    use super::*;

    const FIXTURE: &str = r#"
DBA_USERS:
  - USERNAME: HR
    USER_ID: 10
  - USERNAME: SCOTT
    USER_ID: 11
  - USERNAME: SYS
    USER_ID: 0
  - USERNAME: BIN$X
    USER_ID: 12
ALL_TYPES:
  - TYPE_NAME: XMLTYPE
    TYPECODE: OBJECT
    PREDEFINED: "NO"
  - TYPE_NAME: ADDRESS_T
    OWNER: HR
    TYPECODE: OBJECT
"#;

    fn data_source(config: DataSourceConfig) -> (Arc<MemoryDictionary>, Arc<OracleDataSource>) {
        let source = Arc::new(MemoryDictionary::from_yaml(FIXTURE).unwrap());
        let ds = OracleDataSource::new(config, source.clone());
        (source, ds)
    }

    #[test]
    fn test_data_source_schemas() {
        let (_, ds) = data_source(DataSourceConfig::new("ORCL", true));
        let progress = Progress::new();

        let schemas = ds.get_schemas(&progress).unwrap();

        assert_eq!(
            schemas.iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["BIN$X", "HR", "SCOTT", "SYS"]
        );
        assert!(ds.get_schema(&progress, "SYS").unwrap().unwrap().is_system());
        assert!(!ds.get_schema(&progress, "HR").unwrap().unwrap().is_system());
    }

    #[test]
    fn test_data_source_schema_filter_keeps_active_schema() {
        let mut config = DataSourceConfig::new("ORCL", true);
        config.active_schema = Some("SCOTT".into());
        config.schema_filter = Some(ObjectFilterConfig::new(vec!["%".into()], vec!["S%".into()]));
        let (_, ds) = data_source(config);
        let progress = Progress::new();

        let schemas = ds.get_schemas(&progress).unwrap();

        assert_eq!(
            schemas.iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["BIN$X", "HR", "SCOTT"]
        );
        assert_eq!(
            ds.active_schema(&progress).unwrap().unwrap().name(),
            "SCOTT"
        );
    }

    #[test]
    fn test_data_source_adds_missing_active_schema() {
        let mut config = DataSourceConfig::new("ORCL", true);
        config.active_schema = Some("GHOST".into());
        let (_, ds) = data_source(config);

        let active = ds.active_schema(&Progress::new()).unwrap().unwrap();

        assert_eq!(active.name(), "GHOST");
        assert_eq!(active.id(), -1);
    }

    #[test]
    fn test_data_source_data_types() {
        let (_, ds) = data_source(DataSourceConfig::new("ORCL", true));
        let progress = Progress::new();

        assert!(ds.get_local_data_type("NUMBER").unwrap().is_none());

        ds.initialize(&progress).unwrap();

        let xml = ds.get_local_data_type("XMLTYPE").unwrap().unwrap();
        assert!(!xml.is_predefined());
        let number = ds.get_local_data_type("NUMBER(10,2)").unwrap().unwrap();
        assert!(number.is_predefined());

        let resolved = ds.resolve_data_type(&progress, "VARCHAR2(20)").unwrap().unwrap();
        assert_eq!(resolved.name(), "VARCHAR2");

        let resolved = ds.resolve_data_type(&progress, "HR.ADDRESS_T").unwrap().unwrap();
        assert_eq!(resolved.owner(), Some("HR"));

        assert!(ds.resolve_data_type(&progress, "NOPE.ADDRESS_T").unwrap().is_none());
        assert!(ds.resolve_data_type(&progress, "NOPE").unwrap().is_none());
    }

    #[test]
    fn test_data_source_refresh_reloads() {
        let (source, ds) = data_source(DataSourceConfig::new("ORCL", true));
        let progress = Progress::new();

        let before = ds.get_schema(&progress, "HR").unwrap().unwrap();
        ds.refresh().unwrap();
        let after = ds.get_schema(&progress, "HR").unwrap().unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(source.query_count(), 2);
    }

    #[test]
    fn test_data_source_from_config_without_fixture() {
        let conf = CatalogConfig::default();

        assert!(OracleDataSource::from_config(&conf).is_err());
    }
}
