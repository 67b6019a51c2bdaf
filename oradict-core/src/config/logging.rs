use serde::{Deserialize, Serialize};

/// Logging options
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// The default log filter, eg `info` or `oradict_catalog=debug`
    /// `RUST_LOG` takes precedence when set
    pub level: Option<String>,
    /// Values longer than this are truncated in log lines
    pub max_value_length: Option<usize>,
}
