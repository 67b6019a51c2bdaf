use lazy_static::lazy_static;
use oradict_core::err::Result;

use crate::{
    cache::CacheLoader,
    dictionary::{DataRow, DictionaryQuery, DictionaryScope, RowExt},
    lazy::LazyValue,
    object::CatalogObject,
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
};

use super::{OracleDbLink, OracleSchema};

/// An alias of an object, possibly living in a remote database
#[derive(Debug)]
pub struct OracleSynonym {
    name: String,
    object_owner: Option<String>,
    object_name: Option<String>,
    object_type: Option<String>,
    db_link: Option<String>,
}

impl OracleSynonym {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        Ok(Self {
            name: row.require_string("SYNONYM_NAME")?,
            object_owner: row.get_string("TABLE_OWNER"),
            object_name: row.get_string("TABLE_NAME"),
            object_type: row.get_string("OBJECT_TYPE"),
            db_link: row.get_string_trimmed("DB_LINK"),
        })
    }

    pub fn object_owner(&self) -> Option<&str> {
        self.object_owner.as_deref()
    }

    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }

    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    /// The database link the aliased object is reached through.
    ///
    /// Without a progress context only the link name is returned. The link is
    /// looked up on every call since synonyms do not hold on to their links.
    pub fn db_link(
        &self,
        progress: Option<&Progress>,
        schema: &OracleSchema,
    ) -> Result<LazyValue<OracleDbLink>> {
        match progress {
            Some(progress) => OracleDbLink::resolve_object(progress, schema, self.db_link.as_deref()),
            None => Ok(LazyValue::from_name(self.db_link.clone())),
        }
    }
}

catalog_object!(OracleSynonym, "synonym");

type P = PropertyDescriptor<OracleSynonym, OracleSchema>;

lazy_static! {
    static ref SYNONYM_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |s, _| Ok(s.name.as_str().into())),
        P::new("object_owner", "Object Owner", 2, |s, _| Ok(s.object_owner().into())),
        P::new("object_name", "Object Name", 3, |s, _| Ok(s.object_name().into())),
        P::new("object_type", "Object Type", 4, |s, _| Ok(s.object_type().into())),
        P::new("db_link", "DB Link", 5, |s, ctx| Ok(s.db_link(ctx.progress, ctx.scope)?.into())),
    ];
}

impl PropertySource for OracleSynonym {
    type Scope = OracleSchema;

    fn properties() -> &'static [P] {
        SYNONYM_PROPERTIES.as_slice()
    }
}

/// Lists the synonyms owned by a schema
pub struct SynonymLoader;

impl CacheLoader for SynonymLoader {
    type Owner = OracleSchema;
    type Object = OracleSynonym;

    const DESCRIPTION: &'static str = "synonyms";

    fn query(&self, owner: &OracleSchema) -> DictionaryQuery {
        DictionaryQuery::new(owner.dictionary().all_view("SYNONYMS"))
            .filter("OWNER", owner.name())
            .order_by("SYNONYM_NAME")
    }

    fn fetch(&self, _owner: &OracleSchema, row: &DataRow) -> Result<OracleSynonym> {
        OracleSynonym::from_row(row)
    }
}
