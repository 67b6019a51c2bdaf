use lazy_static::lazy_static;
use oradict_core::{data::chrono::NaiveDateTime, err::Result};

use crate::{
    cache::CacheLoader,
    dictionary::{DataRow, DictionaryQuery, DictionaryScope, RowExt},
    lazy::LazyValue,
    object::CatalogObject,
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
    resolver::resolve_foreign,
};

use super::OracleSchema;

/// A database link to a remote database
#[derive(Debug)]
pub struct OracleDbLink {
    name: String,
    user_name: Option<String>,
    host: Option<String>,
    created: Option<NaiveDateTime>,
}

impl OracleDbLink {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        Ok(Self {
            name: row.require_string("DB_LINK")?,
            user_name: row.get_string("USERNAME"),
            host: row.get_string("HOST"),
            created: row.get_datetime("CREATED"),
        })
    }

    /// Finds the link named by another object of the schema, eg a synonym
    /// pointing to a remote table. Unknown links are returned by name.
    pub fn resolve_object(
        progress: &Progress,
        schema: &OracleSchema,
        name: Option<&str>,
    ) -> Result<LazyValue<OracleDbLink>> {
        resolve_foreign(progress, schema, schema.db_link_cache(), name)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.created
    }
}

catalog_object!(OracleDbLink, "database link");

type P = PropertyDescriptor<OracleDbLink, OracleSchema>;

lazy_static! {
    static ref DB_LINK_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |l, _| Ok(l.name.as_str().into())),
        P::new("user_name", "User", 2, |l, _| Ok(l.user_name().into())),
        P::new("host", "Host", 3, |l, _| Ok(l.host().into())),
        P::new("created", "Created", 4, |l, _| Ok(l.created.into())),
    ];
}

impl PropertySource for OracleDbLink {
    type Scope = OracleSchema;

    fn properties() -> &'static [P] {
        DB_LINK_PROPERTIES.as_slice()
    }
}

/// Lists the database links owned by a schema
pub struct DbLinkLoader;

impl CacheLoader for DbLinkLoader {
    type Owner = OracleSchema;
    type Object = OracleDbLink;

    const DESCRIPTION: &'static str = "database links";

    fn query(&self, owner: &OracleSchema) -> DictionaryQuery {
        DictionaryQuery::new(owner.dictionary().all_view("DB_LINKS"))
            .filter("OWNER", owner.name())
            .order_by("DB_LINK")
    }

    fn fetch(&self, _owner: &OracleSchema, row: &DataRow) -> Result<OracleDbLink> {
        OracleDbLink::from_row(row)
    }
}
