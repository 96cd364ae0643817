//! Centralized configuration for warmpool
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. Environment variable overrides (database and telemetry only)
//! 3. Runtime validation
//!
//! Pool tuning is deliberately not read from the environment. The defaults in
//! [`PoolOptions`] are tuned for short-lived serverless invocations and are only
//! overridden by whoever constructs the pooled resource.

pub mod error;
pub mod validation;

pub use error::{ConfigError, ConfigResult};

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::time::Duration;

// =============================================================================
// SAFE DEFAULTS
// =============================================================================

// Pool tuning for a single concurrent invocation per process
const DEFAULT_POOL_MAX: u32 = 2;
const DEFAULT_POOL_MIN: u32 = 0;
const DEFAULT_POOL_IDLE_MS: u64 = 0; // Release idle connections on every eviction run
const DEFAULT_POOL_ACQUIRE_MS: u64 = 3000;
const DEFAULT_POOL_EVICT_MS: u64 = 6000; // Replaced per invocation by the remaining time

// Database Configuration (safe local defaults)
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_NAME: &str = "postgres";
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_PASSWORD: &str = "localdev123";
const DEFAULT_DB_SSL_MODE: &str = "prefer";
const DEFAULT_APPLICATION_NAME: &str = "warmpool";

// Telemetry Configuration
const DEFAULT_TRACING_LEVEL: &str = "info";
const DEFAULT_JSON_LOGS: bool = false;
const DEFAULT_TELEMETRY_SERVICE_NAME: &str = "warmpool";

/// Pool tuning parameters handed to the pooled resource on construction
///
/// `evict_ms` is rewritten before every invocation with the host's estimate of
/// the remaining time so that idle connections are released before the
/// process is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolOptions {
    /// Maximum connections in the pool
    pub max: u32,

    /// Minimum connections kept open
    pub min: u32,

    /// Idle time in milliseconds before a connection may be evicted
    pub idle_ms: u64,

    /// Maximum time in milliseconds to wait for a connection
    pub acquire_ms: u64,

    /// Eviction window in milliseconds
    pub evict_ms: u64,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max: DEFAULT_POOL_MAX,
            min: DEFAULT_POOL_MIN,
            idle_ms: DEFAULT_POOL_IDLE_MS,
            acquire_ms: DEFAULT_POOL_ACQUIRE_MS,
            evict_ms: DEFAULT_POOL_EVICT_MS,
        }
    }
}

impl PoolOptions {
    pub const fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }

    pub const fn acquire(&self) -> Duration {
        Duration::from_millis(self.acquire_ms)
    }

    pub const fn evict(&self) -> Duration {
        Duration::from_millis(self.evict_ms)
    }

    /// Set the eviction window, saturating at `u64::MAX` milliseconds
    pub fn set_evict(&mut self, evict: Duration) {
        self.evict_ms = u64::try_from(evict.as_millis()).unwrap_or(u64::MAX);
    }
}

impl validation::Validate for PoolOptions {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_range(u64::from(self.max), 1, 1000, "pool.max")?;
        validation::validate_range(u64::from(self.min), 0, u64::from(self.max), "pool.min")?;
        validation::validate_range(self.acquire_ms, 1, u64::MAX, "pool.acquire_ms")?;
        Ok(())
    }
}

/// Database configuration for the `PostgreSQL` adapter
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Database name
    pub database: String,

    /// Username for authentication
    pub username: String,

    /// Password for authentication (use environment variables for security)
    pub password: String,

    /// SSL mode for connections ("disable", "prefer", "require")
    pub ssl_mode: String,

    /// Application name reported to the server
    pub application_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            database: DEFAULT_DB_NAME.to_string(),
            username: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            ssl_mode: DEFAULT_DB_SSL_MODE.to_string(),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Each setting checks its `WARMPOOL_DATABASE_*` key first and falls back
    /// to the conventional `DB_*` key.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |primary: &str, fallback: &str| lookup(primary).or_else(|| lookup(fallback));

        let host = var("WARMPOOL_DATABASE_HOST", "DB_HOST")
            .unwrap_or_else(|| DEFAULT_DB_HOST.to_string());

        let port = var("WARMPOOL_DATABASE_PORT", "DB_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DB_PORT);

        let database = var("WARMPOOL_DATABASE_NAME", "DB_NAME")
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let username = var("WARMPOOL_DATABASE_USERNAME", "DB_USER")
            .unwrap_or_else(|| DEFAULT_DB_USER.to_string());

        let password = var("WARMPOOL_DATABASE_PASSWORD", "DB_PASSWORD").unwrap_or_else(|| {
            tracing::warn!(
                "Using default database password - set WARMPOOL_DATABASE_PASSWORD or DB_PASSWORD. NEVER use default password in production!"
            );
            DEFAULT_DB_PASSWORD.to_string()
        });

        let ssl_mode = var("WARMPOOL_DATABASE_SSL_MODE", "DB_SSLMODE")
            .unwrap_or_else(|| DEFAULT_DB_SSL_MODE.to_string());

        let application_name = lookup("WARMPOOL_DATABASE_APPLICATION_NAME")
            .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string());

        Self {
            host,
            port,
            database,
            username,
            password,
            ssl_mode,
            application_name,
        }
    }

    /// Convert string SSL mode to `PgSslMode`
    fn parse_ssl_mode(&self) -> PgSslMode {
        match self.ssl_mode.as_str() {
            "disable" => PgSslMode::Disable,
            "require" => PgSslMode::Require,
            _ => PgSslMode::Prefer, // Safe default for "prefer" and unknown values
        }
    }

    /// Build `PostgreSQL` connection options (no URL with password exposed!)
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(self.parse_ssl_mode())
            .application_name(&self.application_name)
    }

    /// Get connection info for logging (NO PASSWORD!)
    pub fn safe_connection_string(&self) -> String {
        format!(
            "{}@{}:{}/{} (ssl: {})",
            self.username, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

impl validation::Validate for DatabaseConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.host, "host")?;
        validation::validate_non_empty(&self.database, "database")?;
        validation::validate_non_empty(&self.username, "username")?;
        validation::validate_range(u64::from(self.port), 1, u64::from(u16::MAX), "port")?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetryConfig {
    /// Tracing level (trace, debug, info, warn, error)
    pub tracing_level: String,

    /// Emit JSON formatted log lines
    pub json_logs: bool,

    /// Service name attached to the startup log line
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tracing_level: DEFAULT_TRACING_LEVEL.to_string(),
            json_logs: DEFAULT_JSON_LOGS,
            service_name: DEFAULT_TELEMETRY_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let tracing_level = lookup("WARMPOOL_TELEMETRY_TRACING_LEVEL")
            .unwrap_or_else(|| DEFAULT_TRACING_LEVEL.to_string());

        let json_logs = lookup("WARMPOOL_TELEMETRY_JSON_LOGS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_JSON_LOGS);

        let service_name = lookup("WARMPOOL_TELEMETRY_SERVICE_NAME")
            .unwrap_or_else(|| DEFAULT_TELEMETRY_SERVICE_NAME.to_string());

        Self {
            tracing_level,
            json_logs,
            service_name,
        }
    }
}

impl validation::Validate for TelemetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.service_name, "service_name")?;
        validation::validate_tracing_level(&self.tracing_level)?;
        Ok(())
    }
}
