use std::env;

use oradict_core::err::Result;
use oradict_logging::trace;

use crate::ctx::Ctx;

use super::ConfigExprProcessor;

/// Interpolates configuration using environment variables, eg `${env:ORACLE_SID}`.
/// An optional third part is used as the default, eg `${env:ORACLE_SID:ORCL}`.
#[derive(Default)]
pub struct EnvConfigProcessor {}

impl ConfigExprProcessor for EnvConfigProcessor {
    fn display_name(&self) -> &str {
        "environment"
    }

    fn process(&self, _ctx: &Ctx, parts: &[String]) -> Result<Option<String>> {
        let (name, default) = match parts {
            [prefix, name] if prefix == "env" => (name, None),
            [prefix, name, default] if prefix == "env" => (name, Some(default)),
            _ => return Ok(None),
        };

        let value = match (env::var(name), default) {
            (Ok(val), _) => val,
            (Err(_), Some(default)) => default.clone(),
            (Err(_), None) => String::new(),
        };

        trace!("Replaced env expression {} with '{}'", name, value);
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use crate::loader::ConfigLoader;

    use super::*;

    fn parts(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_env_processor_ignores_other_prefix() {
        let loader = ConfigLoader::new();
        let ctx = Ctx::new(&loader, None);

        let result = EnvConfigProcessor::default().process(&ctx, &parts(&["dir"]));

        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_env_processor_replaces_var() {
        env::set_var("ORADICT_ENV_PROCESSOR_TEST1", "VALUE");
        let loader = ConfigLoader::new();
        let ctx = Ctx::new(&loader, None);

        let result = EnvConfigProcessor::default()
            .process(&ctx, &parts(&["env", "ORADICT_ENV_PROCESSOR_TEST1"]));

        assert_eq!(result.unwrap(), Some("VALUE".into()));
    }

    #[test]
    fn test_env_processor_default_value() {
        let loader = ConfigLoader::new();
        let ctx = Ctx::new(&loader, None);

        let result = EnvConfigProcessor::default().process(
            &ctx,
            &parts(&["env", "ORADICT_ENV_PROCESSOR_MISSING", "fallback"]),
        );

        assert_eq!(result.unwrap(), Some("fallback".into()));
    }
}
