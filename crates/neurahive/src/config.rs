//! Application configuration.
//!
//! Loaded once at startup from a TOML file, overridden by environment
//! variables (`NEURAHIVE__SECTION__KEY`), and passed explicitly to the
//! components that need it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::auth::AuthConfig;

pub const APP_NAME: &str = "neurahive";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. Defaults to `<data dir>/neurahive.db`.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (optional) and the environment.
    pub fn load(path: &Path, env_prefix: &str) -> Result<Self> {
        let built = Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("loading config from {}", path.display()))?;

        built
            .try_deserialize()
            .context("deserializing configuration")
    }

    /// Defaults plus a freshly generated signing secret, for new installs.
    pub fn initial() -> Self {
        let mut config = Self::default();
        config.auth.secret_key = Some(AuthConfig::generate_secret_key());
        config
    }

    /// Resolve the database file, relative to `data_dir` unless configured.
    pub fn database_path(&self, data_dir: &Path) -> Result<PathBuf> {
        match &self.database.path {
            Some(path) => expand_str_path(path),
            None => Ok(data_dir.join(format!("{APP_NAME}.db"))),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing config to TOML")
    }
}

/// Write `config` to `path` with a short header, creating parent directories.
pub fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {parent:?}"))?;
    }

    let mut body = format!("# Configuration for {APP_NAME}\n# File: {}\n\n", path.display());
    body.push_str(&config.to_toml()?);
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

/// Expand `~` and environment variables in a path.
pub fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.to_string()))
}

/// Environment variable prefix derived from the application name.
pub fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix(), "NEURAHIVE");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml"), "NHTEST_ABSENT").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(!config.auth.no_auth);
        assert_eq!(config.auth.access_token_ttl_minutes, 30);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let initial = AppConfig::initial();
        write_config(&path, &initial).unwrap();

        let loaded = AppConfig::load(&path, "NHTEST_ROUNDTRIP").unwrap();
        assert_eq!(loaded.auth.secret_key, initial.auth.secret_key);
        assert!(loaded.auth.validate().is_ok());
    }

    #[test]
    fn test_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
port = 9999

[auth]
no_auth = true
access_token_ttl_minutes = 15
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path, "NHTEST_FILE").unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.auth.no_auth);
        assert_eq!(config.auth.access_token_ttl_minutes, 15);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[auth]\nno_auth = false\n").unwrap();

        // SAFETY: test-only environment variable with a unique prefix
        unsafe {
            std::env::set_var("NHTEST_ENV9137__AUTH__NO_AUTH", "true");
        }
        let config = AppConfig::load(&path, "NHTEST_ENV9137").unwrap();
        // SAFETY: cleaning up the test environment variable
        unsafe {
            std::env::remove_var("NHTEST_ENV9137__AUTH__NO_AUTH");
        }

        assert!(config.auth.no_auth);
    }

    #[test]
    fn test_database_path() {
        let config = AppConfig::default();
        assert_eq!(
            config.database_path(Path::new("/var/lib/nh")).unwrap(),
            PathBuf::from("/var/lib/nh/neurahive.db")
        );

        let config = AppConfig {
            database: DatabaseConfig {
                path: Some("/tmp/custom.db".to_string()),
            },
            ..AppConfig::default()
        };
        assert_eq!(
            config.database_path(Path::new("/ignored")).unwrap(),
            PathBuf::from("/tmp/custom.db")
        );
    }
}
