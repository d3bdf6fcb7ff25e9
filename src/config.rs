use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "breastcanai.toml";

/// Overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "BREASTCANAI_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// JSON model artifact, loaded once at startup.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Address the web server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_model_path() -> PathBuf { PathBuf::from("model/model.json") }
fn default_bind()       -> String  { "127.0.0.1:8080".to_string() }
fn default_log_level()  -> String  { "info".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            bind: default_bind(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An explicit path must exist. Otherwise `BREASTCANAI_CONFIG` is tried,
    /// then `breastcanai.toml` if present, then the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            return Self::load(fallback);
        }
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.model_path, PathBuf::from("model/model.json"));
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model_path = \"models/forest.json\"").unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();

        let config = Config::discover(Some(file.path())).unwrap();
        assert_eq!(config.model_path, PathBuf::from("models/forest.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Config::load("no/such/breastcanai.toml"),
            Err(ConfigError::NotFound(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind = [").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
