use oradict_core::err::Result;
use oradict_logging::trace;

use crate::ctx::Ctx;

use super::ConfigExprProcessor;

/// Interpolates `${dir}` with the directory of the current config file
#[derive(Default)]
pub struct DirConfigProcessor {}

impl ConfigExprProcessor for DirConfigProcessor {
    fn display_name(&self) -> &str {
        "current_dir"
    }

    fn process(&self, ctx: &Ctx, parts: &[String]) -> Result<Option<String>> {
        if parts != ["dir"] {
            return Ok(None);
        }

        let dir = ctx.path.as_ref().and_then(|p| p.parent());

        Ok(dir.map(|dir| {
            let replacement = dir.to_string_lossy().to_string();
            trace!("Replaced dir expression with '{}'", replacement);
            replacement
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::loader::ConfigLoader;

    use super::*;

    #[test]
    fn test_dir_processor_replaces_dir_expr() {
        let loader = ConfigLoader::new();
        let ctx = Ctx::new(&loader, Some("/a/b/c.yml".into()));

        let result = DirConfigProcessor::default().process(&ctx, &["dir".to_string()]);

        assert_eq!(result.unwrap(), Some("/a/b".into()));
    }

    #[test]
    fn test_dir_processor_ignores_when_no_present_dir() {
        let loader = ConfigLoader::new();
        let ctx = Ctx::new(&loader, None);

        let result = DirConfigProcessor::default().process(&ctx, &["dir".to_string()]);

        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_dir_processor_ignores_unknown_prefix() {
        let loader = ConfigLoader::new();
        let ctx = Ctx::new(&loader, Some("/a/b/c.yml".into()));

        let result = DirConfigProcessor::default().process(&ctx, &["test".to_string()]);

        assert_eq!(result.unwrap(), None);
    }
}
