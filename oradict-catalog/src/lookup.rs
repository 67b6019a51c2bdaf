use std::sync::Arc;

use oradict_core::err::Result;

use crate::progress::Progress;

/// A name-keyed lookup of objects of type `T` within the scope `O`.
///
/// Returns `Ok(Some(..))` if the object was found, `Ok(None)` if it definitely
/// does not exist in the scope, or an error if the lookup itself failed.
/// Implementations may block, eg to load the scope's objects on first use.
pub trait ObjectLookup<O: ?Sized, T> {
    fn lookup(&self, progress: &Progress, owner: &O, name: &str) -> Result<Option<Arc<T>>>;
}
