use std::{fmt, sync::Arc};

use lazy_static::lazy_static;
use oradict_core::err::Result;
use oradict_logging::{debug, warn};

use crate::{
    cache::CacheLoader,
    dictionary::{DataRow, DictionaryQuery, RowExt},
    lazy::{LazyRef, LazyValue},
    lookup::ObjectLookup,
    object::CatalogObject,
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
    resolver::Fallback,
};

use super::{OracleDataSource, OracleSchema};

/// The broad category of values held by a data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    String,
    Numeric,
    DateTime,
    Binary,
    Content,
    Rowid,
    Array,
    Object,
    Reference,
    Unknown,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Built-in Oracle types, keyed by their normalized name
const PREDEFINED_TYPES: &[(&str, DataKind)] = &[
    ("BFILE", DataKind::Content),
    ("BINARY ROWID", DataKind::Rowid),
    ("BINARY_DOUBLE", DataKind::Numeric),
    ("BINARY_FLOAT", DataKind::Numeric),
    ("BLOB", DataKind::Content),
    ("CANONICAL", DataKind::Unknown),
    ("CFILE", DataKind::Content),
    ("CHAR", DataKind::String),
    ("CLOB", DataKind::Content),
    ("CONTENT POINTER", DataKind::Content),
    ("CONTIGUOUS ARRAY", DataKind::Array),
    ("DATE", DataKind::DateTime),
    ("DECIMAL", DataKind::Numeric),
    ("DOUBLE PRECISION", DataKind::Numeric),
    ("FLOAT", DataKind::Numeric),
    ("INTEGER", DataKind::Numeric),
    ("INTERVAL DAY TO SECOND", DataKind::String),
    ("INTERVAL YEAR TO MONTH", DataKind::String),
    ("LOB POINTER", DataKind::Content),
    ("LONG", DataKind::Binary),
    ("LONG RAW", DataKind::Binary),
    ("NAMED COLLECTION", DataKind::Array),
    ("NAMED OBJECT", DataKind::Object),
    ("NCHAR", DataKind::String),
    ("NCLOB", DataKind::Content),
    ("NUMBER", DataKind::Numeric),
    ("NVARCHAR2", DataKind::String),
    ("OCTET", DataKind::Binary),
    ("OID", DataKind::String),
    ("POINTER", DataKind::Unknown),
    ("RAW", DataKind::Binary),
    ("REAL", DataKind::Numeric),
    ("REF", DataKind::Reference),
    ("REF CURSOR", DataKind::Reference),
    ("ROWID", DataKind::Rowid),
    ("SIGNED BINARY INTEGER", DataKind::Numeric),
    ("SMALLINT", DataKind::Numeric),
    ("TABLE", DataKind::Object),
    ("TIME", DataKind::DateTime),
    ("TIME WITH TZ", DataKind::DateTime),
    ("TIMESTAMP", DataKind::DateTime),
    ("TIMESTAMP WITH LOCAL TIME ZONE", DataKind::DateTime),
    ("TIMESTAMP WITH LOCAL TZ", DataKind::DateTime),
    ("TIMESTAMP WITH TIME ZONE", DataKind::DateTime),
    ("TIMESTAMP WITH TZ", DataKind::DateTime),
    ("UNSIGNED BINARY INTEGER", DataKind::Numeric),
    ("UROWID", DataKind::Rowid),
    ("VARCHAR", DataKind::String),
    ("VARCHAR2", DataKind::String),
    ("VARRAY", DataKind::Array),
    ("VARYING ARRAY", DataKind::Array),
];

/// Returns the kind of a predefined type, `None` for user defined types
pub fn predefined_kind(name: &str) -> Option<DataKind> {
    let name = normalize_type_name(name);

    PREDEFINED_TYPES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, kind)| *kind)
}

/// Strips the length, precision and scale modifiers from a type name,
/// eg `TIMESTAMP(6) WITH TIME ZONE` becomes `TIMESTAMP WITH TIME ZONE`
pub fn normalize_type_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut depth = 0usize;
    let mut group_start = 0;

    for (idx, c) in name.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    group_start = idx;
                }
                depth += 1;
            }
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => normalized.push(c),
            _ => {}
        }
    }

    // unbalanced modifiers are kept as written
    if depth > 0 {
        normalized.push_str(&name[group_start..]);
    }

    normalized
}

/// A built-in or user defined data type
#[derive(Debug)]
pub struct OracleDataType {
    /// None for types which do not belong to a schema
    owner: Option<String>,
    name: String,
    type_code: Option<String>,
    predefined: bool,
    incomplete: bool,
    is_final: bool,
    instantiable: bool,
    has_attributes: bool,
    has_methods: bool,
    data_kind: DataKind,
    super_type: LazyRef<OracleDataType>,
}

impl OracleDataType {
    /// Declares a type known by name only
    pub fn predefined(owner: Option<&str>, name: impl Into<String>) -> Self {
        let name = name.into();
        let data_kind = predefined_kind(&name).unwrap_or_else(|| {
            if !name.starts_with("PL/SQL") {
                warn!("Unknown predefined type: {}", name);
            }
            DataKind::Unknown
        });

        Self {
            owner: owner.map(|o| o.to_string()),
            name,
            type_code: None,
            predefined: true,
            incomplete: false,
            is_final: true,
            instantiable: true,
            has_attributes: false,
            has_methods: false,
            data_kind,
            super_type: LazyRef::from_name(None),
        }
    }

    /// All built-in types
    pub fn predefined_types() -> impl Iterator<Item = OracleDataType> {
        PREDEFINED_TYPES
            .iter()
            .map(|(name, _)| OracleDataType::predefined(None, *name))
    }

    pub(crate) fn from_row(owner: Option<&str>, row: &DataRow) -> Result<Self> {
        let name = row.require_string("TYPE_NAME")?;
        let type_code = row.get_string("TYPECODE");
        let predefined = row.get_flag("PREDEFINED");

        let super_owner = row.get_string_trimmed("SUPERTYPE_OWNER");
        let (super_type, has_attributes, has_methods) = match super_owner {
            Some(super_owner) => (
                LazyRef::from_name(
                    row.get_string("SUPERTYPE_NAME")
                        .map(|n| format!("{}.{}", super_owner, n)),
                ),
                row.get_i64("LOCAL_ATTRIBUTES") > 0,
                row.get_i64("LOCAL_METHODS") > 0,
            ),
            None => (
                LazyRef::from_name(None),
                row.get_i64("ATTRIBUTES") > 0,
                row.get_i64("METHODS") > 0,
            ),
        };

        let data_kind = match (owner, type_code.as_deref()) {
            (None, _) if predefined => predefined_kind(&name).unwrap_or(DataKind::Unknown),
            (_, Some("COLLECTION")) => DataKind::Array,
            (_, Some("OBJECT")) => DataKind::Object,
            (Some("SYS"), _) if name == "XMLTYPE" => DataKind::Content,
            _ => DataKind::Unknown,
        };

        Ok(Self {
            owner: owner.map(|o| o.to_string()),
            name,
            type_code,
            predefined,
            incomplete: row.get_flag("INCOMPLETE"),
            is_final: row.get_flag("FINAL"),
            instantiable: row.get_flag("INSTANTIABLE"),
            has_attributes,
            has_methods,
            data_kind,
            super_type,
        })
    }

    /// Finds a type by owner and name, declaring it as a new predefined type
    /// if it is not known yet
    pub fn resolve(
        progress: &Progress,
        data_source: &OracleDataSource,
        owner: Option<&str>,
        name: &str,
    ) -> Result<Arc<OracleDataType>> {
        let name = normalize_type_name(name);

        let schema = match owner {
            Some(owner) => {
                let schema = data_source.get_schema(progress, owner)?;
                if schema.is_none() {
                    warn!("Schema '{}' of data type '{}' not found", owner, name);
                }
                schema
            }
            None => None,
        };

        let found = match (owner, schema.as_ref()) {
            (Some(_), Some(schema)) => schema.get_data_type(progress, &name)?,
            (Some(_), None) => None,
            (None, _) => data_source.get_local_data_type(&name)?,
        };

        if let Some(found) = found {
            return Ok(found);
        }

        debug!("Data type '{}' not found, declaring it", name);

        Ok(match schema {
            Some(schema) => {
                let declared = Arc::new(OracleDataType::predefined(Some(schema.name()), name));
                schema.data_type_cache().cache_object(Arc::clone(&declared))?;
                declared
            }
            None => {
                let declared = Arc::new(OracleDataType::predefined(None, name));
                data_source
                    .data_type_cache()
                    .cache_object(Arc::clone(&declared))?;
                declared
            }
        })
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// `OWNER.NAME` for schema types, otherwise just the name
    pub fn full_name(&self) -> String {
        match self.owner() {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }

    pub fn type_code(&self) -> Option<&str> {
        self.type_code.as_deref()
    }

    pub fn is_predefined(&self) -> bool {
        self.predefined
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_instantiable(&self) -> bool {
        self.instantiable
    }

    pub fn has_attributes(&self) -> bool {
        self.has_attributes
    }

    pub fn has_methods(&self) -> bool {
        self.has_methods
    }

    pub fn data_kind(&self) -> DataKind {
        self.data_kind
    }

    /// The type this type inherits from, null if there is none or it cannot be found
    pub fn super_type(
        &self,
        progress: Option<&Progress>,
        data_source: &OracleDataSource,
    ) -> Result<LazyValue<OracleDataType>> {
        self.super_type
            .resolve(progress, data_source, &QualifiedTypeLookup, Fallback::Null)
    }
}

catalog_object!(OracleDataType, "data type");

/// Looks up types by their `OWNER.NAME` full name
struct QualifiedTypeLookup;

impl ObjectLookup<OracleDataSource, OracleDataType> for QualifiedTypeLookup {
    fn lookup(
        &self,
        progress: &Progress,
        owner: &OracleDataSource,
        name: &str,
    ) -> Result<Option<Arc<OracleDataType>>> {
        owner.resolve_data_type(progress, name)
    }
}

type P = PropertyDescriptor<OracleDataType, OracleDataSource>;

lazy_static! {
    static ref DATA_TYPE_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |t, _| Ok(t.name.as_str().into())),
        P::new("owner", "Owner", 2, |t, _| Ok(t.owner().into())),
        P::new("type_code", "Code", 3, |t, _| Ok(t.type_code().into())),
        P::new("data_kind", "Kind", 4, |t, _| Ok(t.data_kind.to_string().into())),
        P::new("super_type", "Super Type", 5, |t, ctx| {
            Ok(t.super_type(ctx.progress, ctx.scope)?.into())
        }),
        P::new("predefined", "Predefined", 6, |t, _| Ok(t.predefined.into())),
        P::new("incomplete", "Incomplete", 7, |t, _| Ok(t.incomplete.into())),
        P::new("final", "Final", 8, |t, _| Ok(t.is_final.into())),
        P::new("instantiable", "Instantiable", 9, |t, _| Ok(t.instantiable.into())),
    ];
}

impl PropertySource for OracleDataType {
    type Scope = OracleDataSource;

    fn properties() -> &'static [P] {
        DATA_TYPE_PROPERTIES.as_slice()
    }
}

/// Lists the data types declared in a schema
pub struct SchemaDataTypeLoader;

impl CacheLoader for SchemaDataTypeLoader {
    type Owner = OracleSchema;
    type Object = OracleDataType;

    const DESCRIPTION: &'static str = "data types";

    fn query(&self, owner: &OracleSchema) -> DictionaryQuery {
        DictionaryQuery::new("ALL_TYPES")
            .filter("OWNER", owner.name())
            .order_by("TYPE_NAME")
    }

    fn fetch(&self, owner: &OracleSchema, row: &DataRow) -> Result<OracleDataType> {
        OracleDataType::from_row(Some(owner.name()), row)
    }
}
