//! Process-wide coordinator for a pooled resource
//!
//! The manager holds at most one pooled resource and the options it was built
//! with. A typical process goes through these states:
//!
//! - *uninitialized*: nothing stored, `init`/`close` report `false`
//! - *active, closed*: a resource is stored but its pools are drained
//! - *active, open*: pools were initialized for the current invocation
//!
//! [`PoolManager::wrap_handler`] moves between the two active states once per
//! invocation. The manager assumes the host runs one invocation at a time per
//! process; the internal locks only guard against misuse, they do not make
//! concurrent invocations share a pool safely.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{debug, info, warn};
use warmpool_config::PoolOptions;

use crate::context::InvocationContext;
use crate::error::{PoolError, PoolResult};
use crate::options::SharedPoolOptions;
use crate::resource::{PoolConstructor, PooledResource};

/// Future returned by a wrapped handler
pub type HandlerFuture<R, E> = BoxFuture<'static, Result<R, E>>;

static GLOBAL: OnceLock<Arc<PoolManager>> = OnceLock::new();

/// Keeps one pooled resource warm across invocations
pub struct PoolManager {
    resource: RwLock<Option<Arc<dyn PooledResource>>>,
    options: SharedPoolOptions,
    pool_open: AtomicBool,
}

impl Default for PoolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolManager")
            .field("has_resource", &self.get().is_some())
            .field("options", &self.options.snapshot())
            .field("pool_open", &self.is_pool_open())
            .finish()
    }
}

impl PoolManager {
    /// Create an empty manager with the default serverless pool options
    pub fn new() -> Self {
        Self::with_options(PoolOptions::default())
    }

    pub fn with_options(options: PoolOptions) -> Self {
        Self {
            resource: RwLock::new(None),
            options: SharedPoolOptions::new(options),
            pool_open: AtomicBool::new(false),
        }
    }

    /// The process-wide manager, created empty on first use
    pub fn global() -> &'static Arc<Self> {
        GLOBAL.get_or_init(|| Arc::new(Self::new()))
    }

    /// Handle to the options delivered to constructors and factories
    pub fn options(&self) -> SharedPoolOptions {
        self.options.clone()
    }

    /// The stored resource, if any
    ///
    /// A resource stays stored after [`PoolManager::close`], so this may
    /// return a resource whose pools are currently drained.
    pub fn get(&self) -> Option<Arc<dyn PooledResource>> {
        self.resource
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `init` ran more recently than `close`
    pub fn is_pool_open(&self) -> bool {
        self.pool_open.load(Ordering::Acquire)
    }

    /// Build a resource through its constructor and store it
    ///
    /// The constructor receives its own arguments plus the manager's options.
    /// Any previously stored resource is replaced without being closed.
    pub fn create<T: PoolConstructor>(&self, args: T::Args) -> Arc<T> {
        let resource = Arc::new(T::construct(args, self.options()));
        self.store(Arc::clone(&resource));
        resource
    }

    /// Build a resource through a factory and store it
    ///
    /// The factory receives the manager's options and should pass them to
    /// the pool it creates. Any previously stored resource is replaced
    /// without being closed.
    pub fn register<T, F>(&self, factory: F) -> Arc<T>
    where
        T: PooledResource,
        F: FnOnce(SharedPoolOptions) -> T,
    {
        let resource = Arc::new(factory(self.options()));
        self.store(Arc::clone(&resource));
        resource
    }

    fn store<T: PooledResource>(&self, resource: Arc<T>) {
        let previous = self
            .resource
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(resource);

        if previous.is_some() {
            warn!("Replacing a stored pooled resource without closing it");
        } else {
            info!("Pooled resource registered");
        }
        self.pool_open.store(false, Ordering::Release);
    }

    /// Prepare the stored resource for a new invocation
    ///
    /// Initializes its pools, then removes any connection override a previous
    /// close installed. Returns `Ok(false)` when nothing is stored.
    ///
    /// # Errors
    /// Returns the connection manager's error unchanged if its pools cannot
    /// be initialized
    pub fn init(&self) -> PoolResult<bool> {
        let Some(resource) = self.get() else {
            debug!("init skipped: no pooled resource registered");
            return Ok(false);
        };

        let connections = resource.connection_manager();
        connections.init_pools()?;
        if connections.restore_connection() {
            debug!("Restored connection acquisition disabled by previous close");
        }

        self.pool_open.store(true, Ordering::Release);
        debug!(evict_ms = self.options.snapshot().evict_ms, "Pools initialized");
        Ok(true)
    }

    /// Drain the stored resource's pools
    ///
    /// The resource itself stays stored for the next [`PoolManager::init`].
    /// Returns `Ok(false)` when nothing is stored.
    ///
    /// # Errors
    /// Returns the connection manager's error unchanged if closing fails
    pub async fn close(&self) -> PoolResult<bool> {
        let Some(resource) = self.get() else {
            debug!("close skipped: no pooled resource registered");
            return Ok(false);
        };

        resource.connection_manager().close().await?;
        self.pool_open.store(false, Ordering::Release);
        debug!("Pools closed");
        Ok(true)
    }

    /// Forget the stored resource and restore the default options
    ///
    /// The resource is dropped without being closed.
    pub fn reset(&self) {
        self.resource
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.options.replace(PoolOptions::default());
        self.pool_open.store(false, Ordering::Release);
    }

    /// Wrap an invocation handler with init/close around every call
    ///
    /// For each event the returned handler:
    /// 1. sets the eviction window to the event's remaining time,
    /// 2. calls [`PoolManager::init`],
    /// 3. runs `handler` (skipped if `init` failed),
    /// 4. always calls [`PoolManager::close`], even if the handler failed or
    ///    panicked.
    ///
    /// The handler's result is returned unchanged unless `close` fails, in
    /// which case the close error is returned instead. A handler panic is
    /// resumed after `close` completes.
    pub fn wrap_handler<Ev, F, Fut, R, E>(
        self: &Arc<Self>,
        handler: F,
    ) -> impl Fn(Ev) -> HandlerFuture<R, E> + Clone + Send + Sync + use<Ev, F, Fut, R, E>
    where
        Ev: InvocationContext + Send + 'static,
        F: Fn(Ev) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Send + 'static,
        E: From<PoolError> + Send + 'static,
    {
        let manager = Arc::clone(self);
        let handler = Arc::new(handler);

        move |event: Ev| {
            let manager = Arc::clone(&manager);
            let handler = Arc::clone(&handler);
            async move { manager.run_invocation(event, &*handler).await }.boxed()
        }
    }

    async fn run_invocation<Ev, F, Fut, R, E>(&self, event: Ev, handler: &F) -> Result<R, E>
    where
        Ev: InvocationContext,
        F: Fn(Ev) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<PoolError>,
    {
        let remaining = event.remaining_time();
        self.options.set_evict(remaining);
        debug!(remaining_ms = remaining.as_millis(), "Starting invocation");

        let outcome: Result<Result<R, E>, Box<dyn Any + Send>> = match self.init() {
            Ok(_) => AssertUnwindSafe(handler(event)).catch_unwind().await,
            Err(error) => Ok(Err(E::from(error))),
        };

        let closed = self.close().await;

        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                if let Err(error) = &closed {
                    warn!(%error, "Pool close failed while unwinding a handler panic");
                }
                std::panic::resume_unwind(panic);
            }
        };

        match closed {
            Ok(_) => result,
            Err(error) => {
                if result.is_err() {
                    warn!("Handler error discarded because closing the pool failed");
                }
                Err(E::from(error))
            }
        }
    }
}
