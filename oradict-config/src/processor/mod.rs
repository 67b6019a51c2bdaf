use oradict_core::err::Result;

use crate::ctx::Ctx;

/// A config processor resolves `${...}` interpolations found in config strings
pub(crate) trait ConfigExprProcessor {
    /// Gets the human readable display name for the processor
    fn display_name(&self) -> &str;

    /// Returns the replacement for the interpolation `${parts[0]:parts[1]:..}`
    /// or `None` if the processor does not handle it
    fn process(&self, ctx: &Ctx, parts: &[String]) -> Result<Option<String>>;
}

/// A segment of a parsed config string
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum ConfigStringExpr {
    Constant(String),
    /// Represents an interpolated value used in the configuration
    /// Format ${[part 1]:[part 2]..:[part n]}
    /// For instance, ${env:ORACLE_SID}
    Interpolation(Vec<String>),
}

pub(crate) mod dir;
pub(crate) mod env;
pub(crate) mod util;
