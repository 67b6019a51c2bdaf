use lazy_static::lazy_static;
use oradict_core::err::Result;

use crate::{
    cache::CacheLoader,
    dictionary::{DataRow, DictionaryQuery, DictionaryScope, RowExt},
    lazy::{LazyRef, LazyValue},
    object::CatalogObject,
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
    resolver::Fallback,
};

use super::OracleSchema;

/// A java class loaded into the database
#[derive(Debug)]
pub struct OracleJavaClass {
    name: String,
    major: i64,
    minor: i64,
    kind: Option<String>,
    accessibility: Option<String>,
    inner: bool,
    is_abstract: bool,
    is_final: bool,
    debug: bool,
    source: Option<String>,
    outer_class: Option<String>,
    super_class: LazyRef<OracleJavaClass>,
}

impl OracleJavaClass {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        Ok(Self {
            name: row.require_string("NAME")?,
            major: row.get_i64("MAJOR"),
            minor: row.get_i64("MINOR"),
            kind: row.get_string("KIND"),
            accessibility: row.get_string("ACCESSIBILITY"),
            inner: row.get_flag("IS_INNER"),
            is_abstract: row.get_flag("IS_ABSTRACT"),
            is_final: row.get_flag("IS_FINAL"),
            debug: row.get_flag("IS_DEBUG"),
            source: row.get_string("SOURCE"),
            outer_class: row.get_string_trimmed("OUTER"),
            super_class: LazyRef::from_name(row.get_string_trimmed("SUPER")),
        })
    }

    /// The class file version, eg `52.0`
    pub fn version(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// CLASS or INTERFACE
    pub fn kind_name(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn accessibility(&self) -> Option<&str> {
        self.accessibility.as_deref()
    }

    pub fn is_inner(&self) -> bool {
        self.inner
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn outer_class(&self) -> Option<&str> {
        self.outer_class.as_deref()
    }

    /// The class this class extends, classes outside the schema are returned by name
    pub fn super_class(
        &self,
        progress: Option<&Progress>,
        schema: &OracleSchema,
    ) -> Result<LazyValue<OracleJavaClass>> {
        self.super_class
            .resolve(progress, schema, schema.java_class_cache(), Fallback::Name)
    }
}

catalog_object!(OracleJavaClass, "java class");

type P = PropertyDescriptor<OracleJavaClass, OracleSchema>;

lazy_static! {
    static ref JAVA_CLASS_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |c, _| Ok(c.name.as_str().into())),
        P::new("version", "Version", 2, |c, _| Ok(c.version().into())),
        P::new("kind", "Kind", 3, |c, _| Ok(c.kind_name().into())),
        P::new("accessibility", "Accessibility", 4, |c, _| Ok(c.accessibility().into())),
        P::new("super_class", "Super Class", 5, |c, ctx| {
            Ok(c.super_class(ctx.progress, ctx.scope)?.into())
        }),
        P::new("outer_class", "Outer Class", 6, |c, _| Ok(c.outer_class().into())),
        P::new("inner", "Inner", 7, |c, _| Ok(c.inner.into())),
        P::new("abstract", "Abstract", 8, |c, _| Ok(c.is_abstract.into())),
        P::new("final", "Final", 9, |c, _| Ok(c.is_final.into())),
        P::new("debug", "Debug", 10, |c, _| Ok(c.debug.into())),
        P::new("source", "Source", 11, |c, _| Ok(c.source().into())).hidden(),
    ];
}

impl PropertySource for OracleJavaClass {
    type Scope = OracleSchema;

    fn properties() -> &'static [P] {
        JAVA_CLASS_PROPERTIES.as_slice()
    }
}

/// Lists the java classes owned by a schema
pub struct JavaClassLoader;

impl CacheLoader for JavaClassLoader {
    type Owner = OracleSchema;
    type Object = OracleJavaClass;

    const DESCRIPTION: &'static str = "java classes";

    fn query(&self, owner: &OracleSchema) -> DictionaryQuery {
        DictionaryQuery::new(owner.dictionary().all_view("JAVA_CLASSES"))
            .filter("OWNER", owner.name())
            .order_by("NAME")
    }

    fn fetch(&self, _owner: &OracleSchema, row: &DataRow) -> Result<OracleJavaClass> {
        OracleJavaClass::from_row(row)
    }
}
