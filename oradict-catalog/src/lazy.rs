use std::{
    fmt::{self, Debug, Display},
    sync::{Arc, PoisonError, RwLock},
};

use enum_as_inner::EnumAsInner;
use oradict_core::err::Result;

use crate::{
    lookup::ObjectLookup,
    object::CatalogObject,
    progress::Progress,
    resolver::{self, Fallback},
};

/// The value of a reference to another catalog object
#[derive(EnumAsInner)]
pub enum LazyValue<T> {
    /// No object is referenced
    Null,
    /// The name of the referenced object, as captured from the dictionary row
    Unresolved(String),
    /// The referenced object itself
    Resolved(Arc<T>),
}

impl<T> LazyValue<T> {
    /// Creates an unresolved value, an absent or empty name is `Null`
    pub fn from_name(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.is_empty() => Self::Unresolved(name),
            _ => Self::Null,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl<T: CatalogObject> LazyValue<T> {
    /// The name of the referenced object, whether resolved or not
    pub fn name(&self) -> Option<&str> {
        match self {
            LazyValue::Null => None,
            LazyValue::Unresolved(name) => Some(name.as_str()),
            LazyValue::Resolved(obj) => Some(obj.name()),
        }
    }
}

impl<T> Clone for LazyValue<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Unresolved(name) => Self::Unresolved(name.clone()),
            Self::Resolved(obj) => Self::Resolved(Arc::clone(obj)),
        }
    }
}

/// Resolved values are equal only if they hold the same instance
impl<T> PartialEq for LazyValue<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Unresolved(a), Self::Unresolved(b)) => a == b,
            (Self::Resolved(a), Self::Resolved(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: Debug> Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Unresolved(name) => f.debug_tuple("Unresolved").field(name).finish(),
            Self::Resolved(obj) => f.debug_tuple("Resolved").field(obj).finish(),
        }
    }
}

impl<T: CatalogObject> Display for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().unwrap_or(""))
    }
}

/// Holds a reference from an owning catalog object to another object.
///
/// The reference starts out as the raw name read from the dictionary and is
/// replaced by the referenced object the first time it is successfully
/// resolved. It never reverts to a name once resolved.
pub struct LazyRef<T> {
    value: RwLock<LazyValue<T>>,
}

impl<T> LazyRef<T> {
    pub fn from_name(name: Option<String>) -> Self {
        Self {
            value: RwLock::new(LazyValue::from_name(name)),
        }
    }

    pub fn resolved(obj: Arc<T>) -> Self {
        Self {
            value: RwLock::new(LazyValue::Resolved(obj)),
        }
    }

    /// Returns the current value without attempting resolution
    pub fn peek(&self) -> LazyValue<T> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_resolved()
    }

    /// Resolves the reference using the supplied lookup.
    /// See [`resolver::resolve`] for the exact semantics.
    pub fn resolve<O, L>(
        &self,
        progress: Option<&Progress>,
        owner: &O,
        lookup: &L,
        fallback: Fallback,
    ) -> Result<LazyValue<T>>
    where
        O: CatalogObject + ?Sized,
        L: ObjectLookup<O, T> + ?Sized,
    {
        resolver::resolve(progress, owner, lookup, self, fallback)
    }

    /// Stores the object found for `name`.
    ///
    /// Compare-and-set: the object is only stored if the reference still holds
    /// `name` unresolved. If another caller resolved it first, their object is
    /// kept and returned instead.
    pub(crate) fn store(&self, name: &str, obj: Arc<T>) -> Arc<T> {
        let mut value = self.value.write().unwrap_or_else(PoisonError::into_inner);

        match &*value {
            LazyValue::Resolved(existing) => Arc::clone(existing),
            LazyValue::Unresolved(current) if current == name => {
                *value = LazyValue::Resolved(Arc::clone(&obj));
                obj
            }
            _ => obj,
        }
    }
}

impl<T: Debug> Debug for LazyRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LazyRef").field(&self.peek()).finish()
    }
}
