use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use serde_yaml::{from_value, Mapping, Value};

mod filter;
pub use filter::*;
mod logging;
pub use logging::*;

/// The configuration of a catalog navigator instance
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// The human-readable name of the catalog
    pub name: String,
    /// The description of this catalog
    pub description: Option<String>,
    /// The data source whose dictionary is navigated
    pub data_source: DataSourceConfig,
    /// Logging options
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Path to a yaml dump of dictionary views, served in place of a live connection
    pub fixture: Option<PathBuf>,
}

/// Options for a single Oracle data source
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
pub struct DataSourceConfig {
    /// The name of the data source, usually the service name
    pub name: String,
    /// Whether the connected user may read the DBA_* views
    #[serde(default)]
    pub admin: bool,
    /// The schema selected by default
    pub active_schema: Option<String>,
    /// Restricts which schemas are listed
    #[serde(default)]
    pub schema_filter: Option<ObjectFilterConfig>,
}

impl DataSourceConfig {
    pub fn new(name: impl Into<String>, admin: bool) -> Self {
        Self {
            name: name.into(),
            admin,
            active_schema: None,
            schema_filter: None,
        }
    }
}
