//! `PostgreSQL` pooled resource backed by `sqlx`

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};
use warmpool_config::validation::Validate;
use warmpool_config::{DatabaseConfig, PoolOptions};

use crate::error::{PoolError, PoolResult};
use crate::options::SharedPoolOptions;
use crate::resource::{ConnectionManager, PoolConstructor, PooledResource};

/// Shortest eviction window handed to sqlx; a zero window makes its reaper spin
const MIN_EVICT_WINDOW: Duration = Duration::from_millis(100);

/// Longest eviction window; Lambda invocations are capped at 15 minutes
const MAX_EVICT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Connection manager that rebuilds a lazy `PgPool` on every init
///
/// Pools never connect eagerly, so `init_pools` performs no network I/O.
/// After `close`, [`SqlxConnectionManager::pool`] refuses to hand out the
/// drained pool until the next `init_pools`/`restore_connection` pair.
pub struct SqlxConnectionManager {
    connect_options: PgConnectOptions,
    options: SharedPoolOptions,
    pool: RwLock<Option<PgPool>>,
    connection_disabled: AtomicBool,
}

impl SqlxConnectionManager {
    pub fn new(connect_options: PgConnectOptions, options: SharedPoolOptions) -> Self {
        Self {
            connect_options,
            options,
            pool: RwLock::new(None),
            connection_disabled: AtomicBool::new(false),
        }
    }

    /// Translate pool options into `sqlx` pool settings
    ///
    /// Connections never outlive the eviction window. An idle time of zero
    /// means idle connections are released as soon as the window allows.
    /// The window is clamped to 100 ms..15 min so an expired deadline or an
    /// unbounded budget cannot stall or overflow the pool's reaper.
    pub fn pool_options(options: &PoolOptions) -> PgPoolOptions {
        let evict = options.evict().clamp(MIN_EVICT_WINDOW, MAX_EVICT_WINDOW);
        let idle = if options.idle_ms == 0 {
            evict
        } else {
            options.idle().min(evict)
        };

        PgPoolOptions::new()
            .max_connections(options.max)
            .min_connections(options.min)
            .acquire_timeout(options.acquire())
            .idle_timeout(idle)
            .max_lifetime(evict)
    }

    /// The pool for the current invocation
    ///
    /// # Errors
    /// - `PoolError::ConnectionDisabled` after `close` until the next init
    /// - `PoolError::NotInitialized` if `init_pools` never ran
    pub fn pool(&self) -> PoolResult<PgPool> {
        if self.connection_disabled.load(Ordering::Acquire) {
            return Err(PoolError::ConnectionDisabled);
        }
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PoolError::NotInitialized)
    }
}

#[async_trait]
impl ConnectionManager for SqlxConnectionManager {
    fn init_pools(&self) -> PoolResult<()> {
        let options = self.options.snapshot();
        options.validate()?;

        let pool = Self::pool_options(&options).connect_lazy_with(self.connect_options.clone());
        let previous = self
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(pool);

        if let Some(previous) = previous
            && !previous.is_closed()
        {
            warn!("Replacing a pool that was never closed");
        }
        debug!(
            max = options.max,
            evict_ms = options.evict_ms,
            "Created lazy PostgreSQL pool"
        );
        Ok(())
    }

    async fn close(&self) -> PoolResult<()> {
        let pool = self
            .pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        self.connection_disabled.store(true, Ordering::Release);
        if let Some(pool) = pool {
            pool.close().await;
        }
        Ok(())
    }

    fn restore_connection(&self) -> bool {
        self.connection_disabled.swap(false, Ordering::AcqRel)
    }
}

/// Pooled resource wrapping a single `PostgreSQL` database
pub struct SqlxResource {
    connections: SqlxConnectionManager,
    target: String,
}

impl SqlxResource {
    pub fn new(config: &DatabaseConfig, options: SharedPoolOptions) -> Self {
        Self {
            connections: SqlxConnectionManager::new(config.connect_options(), options),
            target: config.safe_connection_string(),
        }
    }

    /// The pool for the current invocation
    ///
    /// # Errors
    /// Fails if the pool is closed or was never initialized
    pub fn pool(&self) -> PoolResult<PgPool> {
        self.connections.pool()
    }

    /// Connection target without credentials, for logging
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl PooledResource for SqlxResource {
    fn connection_manager(&self) -> &dyn ConnectionManager {
        &self.connections
    }
}

impl PoolConstructor for SqlxResource {
    type Args = DatabaseConfig;

    fn construct(args: Self::Args, options: SharedPoolOptions) -> Self {
        Self::new(&args, options)
    }
}
