//! Configuration management for oracli.
//!
//! Configuration is loaded from `~/.config/oracli/config.toml`. Command-line
//! flags and `ORACLE_*` environment variables take precedence over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default host when none is configured anywhere.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Default listener port.
pub const DEFAULT_PORT: u16 = 1521;

/// History file name, kept in the user's home directory.
pub const HISTORY_FILE_NAME: &str = ".oracli_history";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection defaults.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Client behaviour.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Connection values from the config file. All optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub service: Option<String>,
    /// Plain-text password. Prefer `ORACLE_PASSWORD` or the prompt.
    pub password: Option<String>,
}

/// Client behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-statement timeout in seconds (default: 55).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Commit after every successful statement (default: true).
    #[serde(default = "default_true")]
    pub autocommit: bool,
    /// Interactive prompt (default: ">>> ").
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            autocommit: true,
            prompt: default_prompt(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    55
}

fn default_true() -> bool {
    true
}

fn default_prompt() -> String {
    ">>> ".to_string()
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("oracli"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the history file path.
    pub fn history_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(HISTORY_FILE_NAME))
            .context("Could not determine home directory")
    }

    /// Load configuration from the default location, using defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, using defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub service: Option<String>,
    pub password: Option<String>,
}

/// Everything needed to open a session.
#[derive(Clone)]
pub struct ConnectionParams {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub service: String,
    pub password: String,
}

impl ConnectionParams {
    /// Merge overrides onto the config file and defaults.
    ///
    /// The password is left empty when neither source has one; the caller
    /// prompts for it.
    pub fn resolve(overrides: ConnectionOverrides, config: &ConnectionConfig) -> Result<Self> {
        let username = overrides
            .username
            .or_else(|| config.username.clone())
            .context("No username given. Use --username, ORACLE_USERNAME or the config file")?;

        Ok(Self {
            hostname: overrides
                .hostname
                .or_else(|| config.hostname.clone())
                .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
            port: overrides.port.or(config.port).unwrap_or(DEFAULT_PORT),
            username,
            service: overrides
                .service
                .or_else(|| config.service.clone())
                .unwrap_or_default(),
            password: overrides
                .password
                .or_else(|| config.password.clone())
                .unwrap_or_default(),
        })
    }

    /// Easy-connect string handed to the driver.
    pub fn connect_string(&self) -> String {
        format!("//{}:{}/{}", self.hostname, self.port, self.service)
    }

    /// `username:***@host:port/service`, safe to log.
    pub fn redacted(&self) -> String {
        format!(
            "{}:***@{}:{}/{}",
            self.username, self.hostname, self.port, self.service
        )
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.client.timeout_secs, 55);
        assert!(config.client.autocommit);
        assert_eq!(config.client.prompt, ">>> ");
        assert!(config.connection.hostname.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
[connection]
hostname = "db.internal"
port = 1522
username = "scott"
service = "ORCLPDB1"

[client]
timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.connection.hostname.as_deref(), Some("db.internal"));
        assert_eq!(config.connection.port, Some(1522));
        assert_eq!(config.client.timeout(), Duration::from_secs(10));
        // Unset fields keep their defaults.
        assert!(config.client.autocommit);
        assert_eq!(config.client.prompt, ">>> ");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.client.timeout_secs, 55);
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\ntimeout_secs = \"soon\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_resolve_precedence() {
        let config = ConnectionConfig {
            hostname: Some("from-file".to_string()),
            port: Some(1600),
            username: Some("file_user".to_string()),
            service: Some("FILESVC".to_string()),
            password: Some("file_pw".to_string()),
        };
        let overrides = ConnectionOverrides {
            hostname: Some("from-flag".to_string()),
            username: None,
            ..Default::default()
        };
        let params = ConnectionParams::resolve(overrides, &config).unwrap();
        assert_eq!(params.hostname, "from-flag");
        assert_eq!(params.port, 1600);
        assert_eq!(params.username, "file_user");
        assert_eq!(params.service, "FILESVC");
        assert_eq!(params.password, "file_pw");
    }

    #[test]
    fn test_resolve_defaults() {
        let overrides = ConnectionOverrides {
            username: Some("scott".to_string()),
            ..Default::default()
        };
        let params = ConnectionParams::resolve(overrides, &ConnectionConfig::default()).unwrap();
        assert_eq!(params.hostname, "localhost");
        assert_eq!(params.port, 1521);
        assert!(params.password.is_empty());
    }

    #[test]
    fn test_resolve_requires_username() {
        let err = ConnectionParams::resolve(ConnectionOverrides::default(), &ConnectionConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("No username"));
    }

    #[test]
    fn test_connection_strings() {
        let params = ConnectionParams {
            hostname: "db".to_string(),
            port: 1521,
            username: "scott".to_string(),
            service: "XE".to_string(),
            password: "tiger".to_string(),
        };
        assert_eq!(params.connect_string(), "//db:1521/XE");
        assert_eq!(params.redacted(), "scott:***@db:1521/XE");
        assert!(!format!("{params:?}").contains("tiger"));
    }
}
