use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Translation store
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// Users allowed to change translations
    #[serde(default)]
    pub login: LoginConfig,

    /// UI language catalog
    #[serde(default)]
    pub languages: LanguagesConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP listener configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Listener address in `host:port` form
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Store configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// SQLite file; the user data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Search configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchConfig {
    /// Maximum number of entries a search returns
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

/// A configured user
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    /// User name
    pub user: String,

    /// Hex-encoded SHA-256 digest of the password
    pub pass_sha256: String,
}

/// Login configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LoginConfig {
    #[serde(default)]
    pub users: Vec<UserCredentials>,
}

/// Language catalog configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LanguagesConfig {
    /// JSON catalog file; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_results() -> usize {
    100
}

impl Config {
    /// Load the configuration, writing a default one if the file is missing
    pub fn load_or_create<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let file = File::open(config_path)
                .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

            return Ok(config);
        }

        warn!(
            "Config file not found at '{}', creating default config.",
            config_path.display()
        );

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json).with_context(|| {
            format!(
                "Failed to write default config to file: {}",
                config_path.display()
            )
        })?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("Server host must not be empty"));
        }

        if self.search.max_results == 0 {
            return Err(anyhow!("search.max_results must be at least 1"));
        }

        for credentials in &self.login.users {
            if credentials.user.trim().is_empty() {
                return Err(anyhow!("Login users need a non-empty name"));
            }

            let digest = credentials.pass_sha256.trim();
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(anyhow!(
                    "Password of user '{}' must be a hex SHA-256 digest",
                    credentials.user
                ));
            }
        }

        if self.login.users.is_empty() {
            warn!("No login users configured, every change request will be rejected");
        }

        if let Some(path) = &self.languages.catalog_path {
            if !path.exists() {
                return Err(anyhow!("Language catalog not found: {}", path.display()));
            }
        }

        Ok(())
    }
}
