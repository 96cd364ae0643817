//! Error types for pooled resources

use thiserror::Error;
use warmpool_config::ConfigError;

/// Errors raised by a pooled resource's connection manager
///
/// The coordinator passes these through untouched; it never wraps or
/// translates a collaborator's failure.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Underlying driver failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Connections are disabled until the pool is re-initialized
    #[error("Connection pool is closed; call init before acquiring connections")]
    ConnectionDisabled,

    /// The pool has never been initialized
    #[error("Connection pool has not been initialized")]
    NotInitialized,

    /// Invalid pool configuration
    #[error("Invalid pool configuration: {0}")]
    Config(#[from] ConfigError),

    /// Any other collaborator failure
    #[error("{message}")]
    Other { message: String },
}

impl PoolError {
    /// Convenience constructor for ad-hoc failures
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
