//! Application configuration management.
//!
//! Configuration is loaded once at startup from environment variables (and an
//! optional `.env` file). Missing or invalid values are reported as
//! [`ConfigError`] and are fatal to the binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use todo_api::infrastructure::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! println!("Listening on {}", config.bind_address());
//! ```

use std::env;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The name of the environment variable.
        key: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

// =============================================================================
// Storage Backend
// =============================================================================

/// Which task store the service runs against, chosen by the `DATABASE_URL` scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process store; data is lost on restart. Selected by `memory://`.
    InMemory,
    /// `PostgreSQL` JSONB document table. Selected by `postgres://` or `postgresql://`.
    Postgres,
}

impl StorageBackend {
    /// Determines the backend from a connection URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unsupported scheme.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let scheme = url.split_once("://").map(|(scheme, _)| scheme.to_lowercase());

        match scheme.as_deref() {
            Some("memory") => Ok(Self::InMemory),
            Some("postgres" | "postgresql") => Ok(Self::Postgres),
            _ => Err(ConfigError::InvalidValue {
                key: "DATABASE_URL".to_string(),
                message: "expected a postgres:// or memory:// URL".to_string(),
            }),
        }
    }
}

// =============================================================================
// CORS Origin
// =============================================================================

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigin {
    /// Any origin (`*`).
    Any,
    /// An explicit allow-list.
    List(Vec<String>),
}

impl FromStr for CorsOrigin {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value == "*" {
            return Ok(Self::Any);
        }

        let origins: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToString::to_string)
            .collect();

        if origins.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "CORS_ORIGIN".to_string(),
                message: "expected '*' or a comma-separated list of origins".to_string(),
            });
        }

        Ok(Self::List(origins))
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Store connection address.
    pub database_url: String,
    /// Backend selected by the scheme of `database_url`.
    pub storage: StorageBackend,
    /// HTTP server host address.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// CORS origin policy.
    pub cors_origin: CorsOrigin,
    /// Connection pool size for the `PostgreSQL` backend.
    pub database_max_connections: u32,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: store connection address (required)
    /// - `PORT`: listen port (optional, default: 5000)
    /// - `HOST`: bind address (optional, default: "0.0.0.0")
    /// - `CORS_ORIGIN`: `*` or comma-separated origins (optional, default: `*`)
    /// - `DATABASE_MAX_CONNECTIONS`: pool size (optional, default: 5)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if a required variable is not set.
    /// Returns `ConfigError::InvalidValue` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors if file doesn't exist)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url =
            read("DATABASE_URL").ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;
        let storage = StorageBackend::from_url(&database_url)?;

        let host = read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_optional("PORT", read("PORT"), DEFAULT_PORT)?;
        let cors_origin = read("CORS_ORIGIN")
            .map_or(Ok(CorsOrigin::Any), |value| value.parse())?;
        let database_max_connections = parse_optional(
            "DATABASE_MAX_CONNECTIONS",
            read("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;

        Ok(Self {
            database_url,
            storage,
            host,
            port,
            cors_origin,
            database_max_connections,
        })
    }

    /// Creates an in-memory configuration with defaults, for tests and local runs.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database_url: "memory://".to_string(),
            storage: StorageBackend::InMemory,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origin: CorsOrigin::Any,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Returns `host:port` for binding the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_optional<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.parse().map_err(|error: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: error.to_string(),
        })
    })
}

// =============================================================================
// Tests
// =============================================================================
