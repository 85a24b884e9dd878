use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::error::AppResult;

/// Environment variables that override keys of the YAML file.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("DB_SSL_MODE", "database.ssl_mode"),
    ("DB_MAX_CONNECTIONS", "database.max_connections"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Seconds in-flight requests get to finish after a shutdown signal.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl DatabaseConfig {
    /// Postgres connection URL; user, password and database name are percent-encoded.
    pub fn url(&self) -> AppResult<String> {
        let invalid =
            || config::ConfigError::Message("invalid database connection settings".to_string());

        let mut url = Url::parse(&format!("postgres://{}:{}", self.host, self.port))
            .map_err(|e| config::ConfigError::Message(format!("invalid database host: {e}")))?;
        url.set_username(&self.user).map_err(|_| invalid())?;
        url.set_password(Some(&self.password)).map_err(|_| invalid())?;
        url.set_path(&format!("/{}", self.name));
        url.query_pairs_mut().append_pair("sslmode", &self.ssl_mode);

        Ok(url.to_string())
    }
}

impl Config {
    /// Loads `CONFIG_PATH` (default `config.yaml`) and applies environment overrides.
    pub fn load() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
        Self::from_yaml(&config_path, |name| env::var(name).ok())
    }

    pub fn from_yaml<F>(path: &str, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Yaml).required(true));

        for (var, key) in ENV_OVERRIDES {
            // empty values are ignored so a blank variable cannot wipe a file setting
            let value = lookup(var).filter(|v| !v.is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}
