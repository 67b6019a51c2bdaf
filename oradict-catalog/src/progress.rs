use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use oradict_core::err::{bail, Result};
use oradict_logging::debug;

/// Progress and cancellation handle passed to blocking catalog operations.
///
/// Operations which are handed a `Progress` may block on dictionary queries.
/// Call sites which must not block (eg rendering a list) pass no progress at
/// all, in which case lazy references are returned unresolved.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    cancelled: Arc<AtomicBool>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation, observed by every clone of this handle
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails if cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            bail!("Operation cancelled");
        }

        Ok(())
    }

    /// Reports the start of a sub task
    pub fn sub_task(&self, name: &str) {
        debug!("{}", name);
    }
}
