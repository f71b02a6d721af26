//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file with every section
//! defaulted, followed by environment overrides:
//!
//! | Variable            | Field                      |
//! |---------------------|----------------------------|
//! | `STOREFRONT_HOST`   | `server.host`              |
//! | `STOREFRONT_PORT`   | `server.port`              |
//! | `CLIENT_BASE_URL`   | `server.cors_origin`       |
//! | `STOREFRONT_STORAGE`| `storage.backend`          |
//! | `MONGODB_URI`       | `storage.mongodb.uri`      |
//! | `MONGODB_DATABASE`  | `storage.mongodb.database` |
//! | `STOREFRONT_LOG`    | `logging.filter`           |

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Complete configuration of the storefront backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origin allowed to call the API with credentials
    #[serde(default)]
    pub cors_origin: Option<String>,
}

/// Which backend holds the data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    #[serde(rename = "mongodb")]
    MongoDb,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default)]
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoConfig {
    #[serde(default = "default_mongodb_uri")]
    pub uri: String,

    #[serde(default = "default_mongodb_database")]
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_mongodb_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_mongodb_database() -> String {
    "storefront".to_string()
}

fn default_log_filter() -> String {
    "storefront=info,tower_http=info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: None,
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_mongodb_uri(),
            database: default_mongodb_database(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.display().to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::ParseError {
                file: None,
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load the file (when given) and apply process environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides(&std::env::vars().collect())
    }

    /// Apply overrides from the given variables
    ///
    /// Takes the variables as a map so callers (and tests) do not have to
    /// touch the process environment.
    pub fn with_env_overrides(mut self, vars: &HashMap<String, String>) -> Result<Self> {
        if let Some(host) = vars.get("STOREFRONT_HOST") {
            self.server.host = host.clone();
        }
        if let Some(port) = vars.get("STOREFRONT_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: port.clone(),
                message: "expected a port number".to_string(),
            })?;
        }
        if let Some(origin) = vars.get("CLIENT_BASE_URL") {
            self.server.cors_origin = Some(origin.clone());
        }
        if let Some(backend) = vars.get("STOREFRONT_STORAGE") {
            self.storage.backend = match backend.as_str() {
                "in-memory" => StorageBackend::InMemory,
                "mongodb" => StorageBackend::MongoDb,
                other => {
                    return Err(ConfigError::InvalidValue {
                        field: "storage.backend".to_string(),
                        value: other.to_string(),
                        message: "expected 'in-memory' or 'mongodb'".to_string(),
                    }
                    .into());
                }
            };
        }
        if let Some(uri) = vars.get("MONGODB_URI") {
            self.storage.mongodb.uri = uri.clone();
        }
        if let Some(database) = vars.get("MONGODB_DATABASE") {
            self.storage.mongodb.database = database.clone();
        }
        if let Some(filter) = vars.get("STOREFRONT_LOG") {
            self.logging.filter = filter.clone();
        }
        Ok(self)
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
