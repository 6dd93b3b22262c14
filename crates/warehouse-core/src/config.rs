//! Configuration management for the warehouse toolkit
//!
//! Loads configuration with priority:
//! 1. Specified config file
//! 2. warehouse.toml in the current directory or a parent
//! 3. Environment variables (fallback, `.env` honoured)
//! 4. Defaults
//!
//! String values written as `${VAR_NAME}` are resolved from the environment.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "warehouse.toml";

pub const ENV_DB_HOST: &str = "WAREHOUSE_DB_HOST";
pub const ENV_DB_PORT: &str = "WAREHOUSE_DB_PORT";
pub const ENV_DB_NAME: &str = "WAREHOUSE_DB_NAME";
pub const ENV_DB_USER: &str = "WAREHOUSE_DB_USER";
pub const ENV_DB_PASSWORD: &str = "WAREHOUSE_DB_PASSWORD";
pub const ENV_SCHEMA_FORMAT: &str = "WAREHOUSE_SCHEMA_FORMAT";
pub const ENV_LOG_LEVEL: &str = "WAREHOUSE_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "WAREHOUSE_LOG_JSON";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub database: DatabaseConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection parameters for the relational database
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,

    /// Database name
    pub name: String,

    pub user: String,

    #[serde(default)]
    pub password: String,
}

/// How the schema listing is rendered for agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    #[default]
    Markdown,
    Json,
}

/// Tool layer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub schema_format: SchemaFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl DatabaseConfig {
    /// Config for `name` owned by `user` on the default host and port
    pub fn new(name: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: name.into(),
            user: user.into(),
            password: String::new(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// `user@host:port/name`, safe to log
    pub fn target(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.name)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("{} is not set and no {} was found", key, CONFIG_FILE_NAME))
        };

        let port = match lookup(ENV_DB_PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{} must be a port number, got '{}'", ENV_DB_PORT, raw))?,
            None => default_port(),
        };

        Ok(Self {
            host: lookup(ENV_DB_HOST).unwrap_or_else(default_host),
            port,
            name: required(ENV_DB_NAME)?,
            user: required(ENV_DB_USER)?,
            password: lookup(ENV_DB_PASSWORD).unwrap_or_default(),
        })
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl SchemaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaFormat::Markdown => "markdown",
            SchemaFormat::Json => "json",
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" => Ok(SchemaFormat::Markdown),
            "json" => Ok(SchemaFormat::Json),
            other => Err(crate::Error::config_error(format!(
                "Invalid format type '{}': expected 'markdown' or 'json'",
                other
            ))),
        }
    }
}

impl WarehouseConfig {
    /// Load configuration with the following priority:
    /// 1. warehouse.toml in current directory or its parents
    /// 2. Environment variables (fallback)
    /// 3. Defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No {} found, reading environment", CONFIG_FILE_NAME);
                Self::from_env()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from: {:?}", path);

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Parse configuration text, resolving `${VAR}` references from the environment
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::from_toml_str_with(contents, &|key| env::var(key).ok())
    }

    /// Build configuration purely from `WAREHOUSE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    fn from_toml_str_with(contents: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let mut raw: toml::Value = toml::from_str(contents)?;
        resolve_env_refs(&mut raw, lookup)?;
        let config: WarehouseConfig = raw.try_into()?;
        Ok(config)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let database = DatabaseConfig::from_lookup(lookup)?;

        let schema_format = match lookup(ENV_SCHEMA_FORMAT) {
            Some(raw) => raw.parse::<SchemaFormat>()?,
            None => SchemaFormat::default(),
        };

        let mut logging = LoggingConfig::default();
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            logging.level = level;
        }
        if let Some(json) = lookup(ENV_LOG_JSON) {
            logging.json = matches!(json.trim(), "1" | "true" | "yes");
        }

        Ok(Self {
            database,
            tools: ToolsConfig { schema_format },
            logging,
        })
    }

    /// Find warehouse.toml by searching current directory and parents
    fn find_config_file() -> Option<PathBuf> {
        let mut current = env::current_dir().ok()?;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

/// Replace every `${VAR}` string in the tree with the variable's value
fn resolve_env_refs(value: &mut toml::Value, lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
    match value {
        toml::Value::String(s) => {
            if let Some(var_name) = env_ref(s) {
                *s = lookup(var_name).ok_or_else(|| {
                    anyhow!("Environment variable {} referenced in config is not set", var_name)
                })?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                resolve_env_refs(v, lookup)?;
            }
        }
        toml::Value::Array(items) => {
            for v in items.iter_mut() {
                resolve_env_refs(v, lookup)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn env_ref(value: &str) -> Option<&str> {
    value.strip_prefix("${")?.strip_suffix('}')
}

/// Accepts `5432` as well as `"5432"` (the latter arrives from `${VAR}` references)
fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{}'", text))),
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_log_level() -> String {
    "info".to_string()
}
