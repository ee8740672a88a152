//! Service configuration.
//!
//! Everything comes from environment variables, read once at startup:
//! - `HOST`: Bind host (default: 0.0.0.0)
//! - `PORT`: Bind port (default: 5000)
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD`: The admin credential (required)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: any)
//! - `STORE_BACKEND`: `postgres` (default) or `memory`
//!
//! Token signing (`JWT_SECRET`) and the database pool (`DATABASE_URL`,
//! `DB_*`) have their own config types next to the code that uses them.

use std::str::FromStr;

use thiserror::Error;

use crate::auth::AdminCredential;

/// Configuration errors found at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} must be set")]
    Missing(&'static str),
    /// A variable is set to something unusable.
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// PostgreSQL via sqlx.
    #[default]
    Postgres,
    /// Process-local, lost on restart. Development only.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Service configuration.
#[derive(Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub store_backend: StoreBackend,
    admin_username: String,
    admin_password: String,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("store_backend", &self.store_backend)
            .finish_non_exhaustive()
    }
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => 5000,
        };

        let store_backend = match get("STORE_BACKEND") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "STORE_BACKEND",
                value: raw,
            })?,
            None => StoreBackend::default(),
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            cors_origins,
            store_backend,
            admin_username: get("ADMIN_USERNAME").ok_or(ConfigError::Missing("ADMIN_USERNAME"))?,
            admin_password: get("ADMIN_PASSWORD").ok_or(ConfigError::Missing("ADMIN_PASSWORD"))?,
        })
    }

    /// Get the socket address string.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the admin credential checker.
    pub fn admin_credential(&self) -> AdminCredential {
        AdminCredential::new(&self.admin_username, &self.admin_password)
    }
}
