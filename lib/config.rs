//! Configuration Model

use config::builder::DefaultState;
use config::{
    Config as ConfigRaw,
    ConfigBuilder,
    ConfigError,
    Environment,
    File,
    FileFormat,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    /// The call-initiation endpoint calls are POSTed to.
    pub call_endpoint_url: String,
    pub request_timeout_s: u64,
    pub database_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dispatcher: DispatcherConfig,
}

#[derive(Debug)]
pub struct ConfigLoader {
    builder: ConfigBuilder<DefaultState>,
}

impl ConfigLoader {
    /// Loads a fresh copy of the configuration from source.
    pub fn load(&self) -> Result<Config, ConfigError> {
        Self::deserialize(self.builder.build_cloned()?)
    }

    /// creates a new loader configured to load the default and overlays
    /// the user supplied config (if supplied).
    ///
    /// * `config_file`: The path of the configuration file to load.
    pub fn from_path(path: &Option<String>) -> ConfigLoader {
        let raw = include_str!("default.toml");
        let mut builder = ConfigRaw::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .add_source(
                Environment::with_prefix("CALLBATCH")
                    .try_parsing(true)
                    .separator("__"),
            );
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        ConfigLoader { builder }
    }

    fn deserialize(config: ConfigRaw) -> Result<Config, ConfigError> {
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigLoader;

    #[test]
    fn loads_defaults() {
        let config = ConfigLoader::from_path(&None).load().unwrap();
        assert!(!config.dispatcher.call_endpoint_url.is_empty());
        assert!(config.dispatcher.request_timeout_s > 0);
        assert_eq!(config.dispatcher.database_uri, "sqlite::memory:");
    }
}
