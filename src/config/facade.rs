//! Entry points for loading a [`ClientConfig`].

use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

use super::merge::merge_policy;
use super::sources::{environment, global_file};
use crate::config::ClientConfig;

/// Loads configuration from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the global file, then the environment.
    pub fn load() -> Result<ClientConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let config: ClientConfig = environment::add_to_builder(builder)
            .build()?
            .try_deserialize()?;
        debug!(endpoint = %config.endpoint, "Loaded configuration");
        Ok(config)
    }

    /// Like [`load`](Self::load) with `path` layered between the global file and the
    /// environment. The file must exist.
    pub fn load_with_file(path: &Path) -> Result<ClientConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = builder.add_source(File::from(path).required(true));
        let config: ClientConfig = environment::add_to_builder(builder)
            .build()?
            .try_deserialize()?;
        debug!(
            endpoint = %config.endpoint,
            config_path = %path.display(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Defaults and `path` only; neither the global file nor the environment is read.
    pub fn load_from_file(path: &Path) -> Result<ClientConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()
    }
}
