//! Capabilities the coordinator needs from a pooled resource

use async_trait::async_trait;

use crate::error::PoolResult;
use crate::options::SharedPoolOptions;

/// Start/stop capability of a connection pool
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// (Re)create the underlying pools
    ///
    /// Must not block on network I/O; connections are opened on demand.
    ///
    /// # Errors
    /// Returns the pool's own failure if it cannot be created
    fn init_pools(&self) -> PoolResult<()>;

    /// Drain and close the underlying pools
    ///
    /// Implementations may disable connection acquisition afterwards until
    /// [`ConnectionManager::restore_connection`] is called.
    ///
    /// # Errors
    /// Returns the pool's own failure if closing fails
    async fn close(&self) -> PoolResult<()>;

    /// Remove any "connections disabled" override installed by `close`
    ///
    /// Returns `true` if an override was present.
    fn restore_connection(&self) -> bool {
        false
    }
}

/// An object owning a connection pool, e.g. an ORM instance
pub trait PooledResource: Send + Sync + 'static {
    fn connection_manager(&self) -> &dyn ConnectionManager;
}

/// Construction by constructor: typed arguments plus the shared pool options
///
/// The options handle stays live after construction. The coordinator updates
/// its eviction window before every invocation, so implementations should
/// read it when their pools are (re)initialized rather than copy it once.
pub trait PoolConstructor: PooledResource + Sized {
    /// Resource specific arguments (connection target, dialect settings, ...)
    type Args;

    fn construct(args: Self::Args, options: SharedPoolOptions) -> Self;
}
