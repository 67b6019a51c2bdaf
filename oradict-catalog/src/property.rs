use std::fmt;

use enum_as_inner::EnumAsInner;
use oradict_core::{data::chrono::NaiveDateTime, err::Result};
use serde::Serialize;

use crate::{
    lazy::LazyValue,
    object::CatalogObject,
    progress::Progress,
};

/// The context a property is read in
pub struct PropertyCtx<'a, S: ?Sized> {
    /// When absent, lazy references are shown by name and never resolved
    pub progress: Option<&'a Progress>,
    /// The scope used to resolve references, eg the owning schema
    pub scope: &'a S,
}

impl<'a, S: ?Sized> PropertyCtx<'a, S> {
    pub fn new(progress: Option<&'a Progress>, scope: &'a S) -> Self {
        Self { progress, scope }
    }

    /// A context which never blocks
    pub fn preview(scope: &'a S) -> Self {
        Self::new(None, scope)
    }
}

/// The displayed value of a property
#[derive(Debug, Clone, PartialEq, Serialize, EnumAsInner)]
#[serde(tag = "type", content = "value")]
pub enum PropertyValue {
    Null,
    Text(String),
    Integer(i64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    /// The name of a referenced object which was not resolved
    Name(String),
    /// A resolved reference to another catalog object
    Object { kind: &'static str, name: String },
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => Ok(()),
            PropertyValue::Text(s) | PropertyValue::Name(s) => write!(f, "{}", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            PropertyValue::Object { name, .. } => write!(f, "{}", name),
        }
    }
}

impl<T: CatalogObject> From<LazyValue<T>> for PropertyValue {
    fn from(val: LazyValue<T>) -> Self {
        match val {
            LazyValue::Null => PropertyValue::Null,
            LazyValue::Unresolved(name) => PropertyValue::Name(name),
            LazyValue::Resolved(obj) => PropertyValue::Object {
                kind: obj.kind(),
                name: obj.name().to_string(),
            },
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(val: &str) -> Self {
        PropertyValue::Text(val.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(val: String) -> Self {
        PropertyValue::Text(val)
    }
}

impl From<i64> for PropertyValue {
    fn from(val: i64) -> Self {
        PropertyValue::Integer(val)
    }
}

impl From<bool> for PropertyValue {
    fn from(val: bool) -> Self {
        PropertyValue::Boolean(val)
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(val: NaiveDateTime) -> Self {
        PropertyValue::DateTime(val)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(val: Option<T>) -> Self {
        val.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Reads a property of `T` within the scope `S`
pub type PropertyAccessor<T, S> = fn(&T, &PropertyCtx<S>) -> Result<PropertyValue>;

/// Describes a single property shown in the property sheet of an object
pub struct PropertyDescriptor<T, S: ?Sized> {
    pub id: &'static str,
    pub label: &'static str,
    pub order: u32,
    pub editable: bool,
    pub viewable: bool,
    pub accessor: PropertyAccessor<T, S>,
}

impl<T, S: ?Sized> PropertyDescriptor<T, S> {
    pub fn new(
        id: &'static str,
        label: &'static str,
        order: u32,
        accessor: PropertyAccessor<T, S>,
    ) -> Self {
        Self {
            id,
            label,
            order,
            editable: false,
            viewable: true,
            accessor,
        }
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Hidden from the property sheet, still readable by id
    pub fn hidden(mut self) -> Self {
        self.viewable = false;
        self
    }

    pub fn get(&self, obj: &T, ctx: &PropertyCtx<S>) -> Result<PropertyValue> {
        (self.accessor)(obj, ctx)
    }
}

/// An object exposing a table of property descriptors
pub trait PropertySource: Sized + 'static {
    type Scope: ?Sized + 'static;

    fn properties() -> &'static [PropertyDescriptor<Self, Self::Scope>];

    /// Reads a single property by id
    fn property(&self, id: &str, ctx: &PropertyCtx<Self::Scope>) -> Result<Option<PropertyValue>> {
        Self::properties()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.get(self, ctx))
            .transpose()
    }
}

/// A rendered row of a property sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub editable: bool,
    pub value: PropertyValue,
}

/// Reads every viewable property of the object, in display order
pub fn render<T: PropertySource>(obj: &T, ctx: &PropertyCtx<T::Scope>) -> Result<Vec<PropertyEntry>> {
    let mut props = T::properties().iter().filter(|p| p.viewable).collect::<Vec<_>>();
    props.sort_by_key(|p| p.order);

    props
        .into_iter()
        .map(|p| {
            Ok(PropertyEntry {
                id: p.id,
                label: p.label,
                editable: p.editable,
                value: p.get(obj, ctx)?,
            })
        })
        .collect()
}
