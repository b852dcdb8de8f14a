//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sql-gateway.toml` in current directory
//! 4. `~/.config/sql-gateway/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! backend = "networked"          # embedded (sqlite) or networked (postgres)
//! connection = "postgres://..."  # never exposed to callers
//! whitelist = ["safe_users_v", "analytics.daily_orders"]
//! row_cap = 200
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQL_GATEWAY_BACKEND` | Backend type |
//! | `SQL_GATEWAY_CONNECTION` | Connection target handed to the execution adapter |
//! | `SQL_GATEWAY_WHITELIST` | Comma-separated relation names |
//! | `SQL_GATEWAY_ROW_CAP` | Maximum rows per query |
//!
//! Once loaded, [`GatewayConfig::settings`] freezes the configuration into
//! [`GatewaySettings`], which every pipeline call receives by reference and
//! nothing mutates afterwards.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppResult, GatewayError, config_error},
    grammar::SqlDialect,
    whitelist::Whitelist
};

pub const DEFAULT_ROW_CAP: u64 = 200;

/// Kind of database behind the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// In-process database file (SQLite)
    Embedded,
    /// Database server reached over the network (PostgreSQL)
    Networked
}

impl BackendType {
    /// Grammar used to parse statements for this backend
    pub fn dialect(self) -> SqlDialect {
        match self {
            Self::Embedded => SqlDialect::SQLite,
            Self::Networked => SqlDialect::PostgreSQL
        }
    }
}

impl FromStr for BackendType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "embedded" | "sqlite" => Ok(Self::Embedded),
            "networked" | "postgres" | "postgresql" => Ok(Self::Networked),
            _ => Err(GatewayError::UnsupportedBackend {
                value: s.to_string()
            })
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::Networked => write!(f, "networked")
        }
    }
}

/// Gateway configuration as read from files and environment
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_backend")]
    pub backend:    String,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub whitelist:  Vec<String>,
    #[serde(default = "default_row_cap")]
    pub row_cap:    u64
}

fn default_backend() -> String {
    String::from("embedded")
}

fn default_row_cap() -> u64 {
    DEFAULT_ROW_CAP
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend:    default_backend(),
            connection: None,
            whitelist:  Vec::new(),
            row_cap:    DEFAULT_ROW_CAP
        }
    }
}

impl GatewayConfig {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sql-gateway.toml)
    /// 3. Config file in home directory (~/.config/sql-gateway/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-gateway")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sql-gateway.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    /// Override fields from environment-style variables
    pub fn apply_env<F>(&mut self, var: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>
    {
        if let Some(backend) = var("SQL_GATEWAY_BACKEND") {
            self.backend = backend;
        }

        if let Some(connection) = var("SQL_GATEWAY_CONNECTION") {
            self.connection = Some(connection);
        }

        if let Some(whitelist) = var("SQL_GATEWAY_WHITELIST") {
            self.whitelist = split_list(&whitelist);
        }

        if let Some(row_cap) = var("SQL_GATEWAY_ROW_CAP") {
            self.row_cap = row_cap
                .trim()
                .parse()
                .map_err(|_| config_error(format!("Invalid SQL_GATEWAY_ROW_CAP: '{}'", row_cap)))?;
        }

        Ok(())
    }

    /// Validate and freeze into process-wide settings
    pub fn settings(&self) -> AppResult<GatewaySettings> {
        let backend: BackendType = self.backend.parse()?;
        if self.row_cap == 0 {
            return Err(config_error("row_cap must be a positive integer"));
        }
        Ok(GatewaySettings {
            backend,
            connection: self.connection.clone(),
            whitelist: Whitelist::new(&self.whitelist),
            row_cap: self.row_cap
        })
    }
}

/// Split a comma-separated relation list
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Immutable configuration shared by every gateway call
#[derive(Clone)]
pub struct GatewaySettings {
    backend:    BackendType,
    connection: Option<String>,
    whitelist:  Whitelist,
    row_cap:    u64
}

impl fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("backend", &self.backend)
            .field("connection", &self.connection.as_ref().map(|_| "[redacted]"))
            .field("whitelist", &self.whitelist)
            .field("row_cap", &self.row_cap)
            .finish()
    }
}

impl GatewaySettings {
    pub fn backend(&self) -> BackendType {
        self.backend
    }

    /// Connection target a live execution adapter is opened with.
    ///
    /// Never part of [`ConfigResource`], error messages or logs.
    pub fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    pub fn dialect(&self) -> SqlDialect {
        self.backend.dialect()
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn row_cap(&self) -> u64 {
        self.row_cap
    }

    /// Read-only view published to callers; excludes the connection target
    pub fn resource(&self) -> ConfigResource {
        ConfigResource {
            backend_type: self.backend,
            whitelist:    self.whitelist.names(),
            row_cap:      self.row_cap
        }
    }
}

/// `{ backendType, whitelist, rowCap }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResource {
    pub backend_type: BackendType,
    pub whitelist:    Vec<String>,
    pub row_cap:      u64
}
