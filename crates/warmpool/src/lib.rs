//! Lifecycle management for a connection pool living across serverless invocations
//!
//! A process keeps one pooled resource between invocations. Before each
//! invocation the pool is re-initialized with an eviction window equal to the
//! time the host says is left; after each invocation the pool is drained so no
//! connection survives into a frozen process.
//!
//! ```no_run
//! use warmpool::{PoolManager, SqlxResource};
//! use warmpool_config::DatabaseConfig;
//!
//! let manager = PoolManager::global();
//! manager.create::<SqlxResource>(DatabaseConfig::from_env());
//! ```

pub mod context;
pub mod error;
pub mod manager;
pub mod options;
pub mod resource;
pub mod sqlx_pool;

pub mod mock;
pub use mock::{MockConnectionManager, MockResource};

// Public exports
pub use context::InvocationContext;
pub use error::{PoolError, PoolResult};
pub use manager::{HandlerFuture, PoolManager};
pub use options::SharedPoolOptions;
pub use resource::{ConnectionManager, PoolConstructor, PooledResource};
pub use sqlx_pool::{SqlxConnectionManager, SqlxResource};
pub use warmpool_config::PoolOptions;
