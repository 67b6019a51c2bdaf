use std::path::PathBuf;

use crate::loader::ConfigLoader;

/// Context data when processing a configuration file
pub(crate) struct Ctx<'a> {
    /// Current configuration loader
    pub loader: &'a ConfigLoader,
    /// Path of the current config file
    pub path: Option<PathBuf>,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(loader: &'a ConfigLoader, path: Option<PathBuf>) -> Self {
        Self { loader, path }
    }
}
