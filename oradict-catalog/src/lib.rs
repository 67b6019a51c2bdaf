pub mod cache;
pub mod dictionary;
pub mod lazy;
pub mod lookup;
pub mod model;
pub mod object;
pub mod progress;
pub mod property;
pub mod resolver;

pub use cache::{CacheLoader, ObjectCache};
pub use dictionary::{
    Condition, DataRow, Dictionary, DictionaryQuery, DictionaryScope, DictionarySource,
};
pub use lazy::{LazyRef, LazyValue};
pub use lookup::ObjectLookup;
pub use object::CatalogObject;
pub use progress::Progress;
pub use resolver::{resolve, resolve_foreign, Fallback};
