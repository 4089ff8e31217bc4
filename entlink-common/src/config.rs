//! Bootstrap configuration loading and config file resolution
//!
//! Config file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`ENTLINK_CONFIG`)
//! 3. Per-user config file (`<config dir>/entlink/entlink.toml`)
//! 4. Built-in defaults (no file)
//!
//! A missing or empty TOML file is never fatal: a warning is logged and the
//! compiled defaults are used. A file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ENTLINK_CONFIG";

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locates the config file for an application
pub struct ConfigResolver {
    app_name: String,
}

impl ConfigResolver {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    /// Resolve the config file path, or `None` when defaults should be used
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Per-user config file, only if present
        let user_config = self.default_config_path()?;
        if user_config.exists() {
            return Some(user_config);
        }

        // Priority 4: Built-in defaults
        None
    }

    /// `<config dir>/<app>/<app>.toml` for the current platform
    pub fn default_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| {
            d.join(&self.app_name)
                .join(format!("{}.toml", self.app_name))
        })
    }
}

/// Load a TOML config file, falling back to defaults when it is absent
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!(
            path = %path.display(),
            "Config file not found, using built-in defaults"
        );
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        warn!(path = %path.display(), "Config file is empty, using built-in defaults");
        return Ok(T::default());
    }

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.level, "info");
        assert!(logging.file.is_none());
    }

    #[test]
    fn test_cli_argument_wins() {
        let resolver = ConfigResolver::new("entlink");
        let path = resolver.resolve(Some(Path::new("/tmp/explicit.toml")));
        assert_eq!(path, Some(PathBuf::from("/tmp/explicit.toml")));
    }

    #[test]
    fn test_default_path_shape() {
        let resolver = ConfigResolver::new("entlink");
        if let Some(path) = resolver.default_config_path() {
            assert!(path.ends_with("entlink/entlink.toml"));
        }
    }
}
