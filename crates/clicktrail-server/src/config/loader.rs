//! Configuration loading utilities.

use super::types::ServerConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming an optional config file.
pub const CONFIG_PATH_ENV: &str = "CLICKTRAIL_CONFIG";

/// Prefix for `CLICKTRAIL__SECTION__KEY` overrides.
pub const ENV_PREFIX: &str = "CLICKTRAIL";

/// Load configuration from built-in defaults, an optional file and the
/// environment, in that order of precedence.
pub struct ConfigLoader {
    config_path: Option<String>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Set config file path.
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration.
    pub fn load(&self) -> Result<ServerConfig> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            include_str!("defaults.toml"),
            config::FileFormat::Toml,
        ));

        if let Some(path) = &self.config_path {
            if Path::new(path).exists() {
                info!(path = %path, "loading config file");
                builder = builder.add_source(config::File::with_name(path));
            } else {
                warn!(path = %path, "config file not found, using defaults");
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        );

        let config = builder.build().context("failed to build configuration")?;

        config
            .try_deserialize()
            .context("failed to deserialize configuration")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration, taking the file path from `CLICKTRAIL_CONFIG` when
/// `config_path` is not given.
pub fn load_config(config_path: Option<String>) -> Result<ServerConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path.or_else(|| std::env::var(CONFIG_PATH_ENV).ok()) {
        loader = loader.with_config_path(path);
    }

    loader.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkKind;
    use std::io::Write;

    // A prefix no test environment sets.
    const TEST_PREFIX: &str = "CLICKTRAIL_LOADER_TEST_UNSET";

    #[test]
    fn test_defaults_only() {
        let config = ConfigLoader::new()
            .with_env_prefix(TEST_PREFIX)
            .load()
            .unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.body_limit_bytes, 65536);
        assert_eq!(config.sink.kind, SinkKind::Console);
        assert!(!config.sink.pretty);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("clicktrail-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 4100\n\n[cors]\nallowed_origins = [\"http://localhost:3000\"]\n\n[sink]\npretty = true"
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_env_prefix(TEST_PREFIX)
            .with_config_path(path.to_string_lossy())
            .load();
        std::fs::remove_file(&path).ok();
        let config = config.unwrap();

        assert_eq!(config.server.port, 4100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:3000"]);
        assert!(config.sink.pretty);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ConfigLoader::new()
            .with_env_prefix(TEST_PREFIX)
            .with_config_path("/nonexistent/clicktrail.toml")
            .load()
            .unwrap();
        assert_eq!(config.server.port, 3001);
    }
}
