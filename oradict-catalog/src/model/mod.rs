//! The catalog objects of an Oracle data source

/// Implements `CatalogObject` for a model type with a `name` field
macro_rules! catalog_object {
    ($ty:ty, $kind:literal) => {
        impl $crate::object::CatalogObject for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn kind(&self) -> &'static str {
                $kind
            }
        }
    };
}

mod data_source;
pub use data_source::*;
mod schema;
pub use schema::*;
mod user;
pub use user::*;
mod role;
pub use role::*;
mod tablespace;
pub use tablespace::*;
mod privilege;
pub use privilege::*;
mod data_type;
pub use data_type::*;
mod db_link;
pub use db_link::*;
mod synonym;
pub use synonym::*;
mod trigger;
pub use trigger::*;
mod table;
pub use table::*;
mod partition;
pub use partition::*;
mod java_class;
pub use java_class::*;
mod scheduler_job;
pub use scheduler_job::*;
mod search;
pub use search::*;
