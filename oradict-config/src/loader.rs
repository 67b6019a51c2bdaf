use std::{
    any::type_name,
    fs,
    path::{Path, PathBuf},
};

use oradict_core::{
    config::CatalogConfig,
    err::{Context, Result},
};
use oradict_logging::{debug, info};
use serde::Deserialize;
use serde_yaml::Deserializer;

use crate::{
    ctx::Ctx,
    processor::{
        dir::DirConfigProcessor,
        env::EnvConfigProcessor,
        util::{interpolation_to_string, parse_expression, process_strings},
        ConfigExprProcessor, ConfigStringExpr,
    },
};

/// Parses and loads the configuration
pub struct ConfigLoader {
    processors: Vec<Box<dyn ConfigExprProcessor>>,
}

impl ConfigLoader {
    /// Initialises the configuration loader
    pub fn new() -> Self {
        Self {
            processors: vec![
                Box::new(EnvConfigProcessor::default()),
                Box::new(DirConfigProcessor::default()),
            ],
        }
    }

    /// Loads the catalog configuration from the supplied file
    pub fn load(&self, path: &Path) -> Result<CatalogConfig> {
        let path = path
            .canonicalize()
            .context("Failed to get full config path")?;
        info!("Loading config from path {}", path.display());

        let file_data = fs::read(&path).context(format!(
            "Failed to read config from file {}",
            path.display()
        ))?;

        let processed = self.load_data(file_data.as_slice(), Some(path))?;
        debug!("Parsing into {}", type_name::<CatalogConfig>());
        let config: CatalogConfig = serde_yaml::from_value(processed)
            .context("Failed to parse yaml into CatalogConfig")?;

        Ok(config)
    }

    /// Parses and processes the supplied yaml
    pub(crate) fn load_data(&self, data: &[u8], path: Option<PathBuf>) -> Result<serde_yaml::Value> {
        let config = serde_yaml::Value::deserialize(Deserializer::from_slice(data))
            .context("Failed to parse yaml")?;

        let ctx = Ctx::new(self, path);
        let config = process_strings(config, &|string| self.interpolate(&ctx, &string))?;

        debug!("Finished processing yaml");
        Ok(config)
    }

    fn interpolate(&self, ctx: &Ctx, string: &str) -> Result<String> {
        let mut output = String::with_capacity(string.len());

        for segment in parse_expression(string)? {
            match segment {
                ConfigStringExpr::Constant(c) => output.push_str(&c),
                ConfigStringExpr::Interpolation(parts) => {
                    let mut replacement = None;

                    for processor in ctx.loader.processors.iter() {
                        replacement = processor.process(ctx, &parts).context(format!(
                            "Failed to process config value \"{}\" using the {} processor",
                            string,
                            processor.display_name()
                        ))?;

                        if replacement.is_some() {
                            break;
                        }
                    }

                    // unknown interpolations are left untouched
                    output.push_str(
                        &replacement.unwrap_or_else(|| interpolation_to_string(&parts)),
                    );
                }
            }
        }

        Ok(output)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
