//! Mock pooled resource for testing

// Allow test-specific patterns in mock implementation
#![allow(clippy::unwrap_used)] // Mocks can panic on lock poisoning
#![allow(clippy::arithmetic_side_effects)] // Test counters can overflow
#![allow(clippy::significant_drop_tightening)] // Mock locks don't need optimization

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warmpool_config::PoolOptions;

use crate::error::{PoolError, PoolResult};
use crate::options::SharedPoolOptions;
use crate::resource::{ConnectionManager, PoolConstructor, PooledResource};

/// Mock connection manager recording every lifecycle call
#[derive(Clone)]
pub struct MockConnectionManager {
    options: SharedPoolOptions,
    init_calls: Arc<AtomicUsize>,
    close_calls: Arc<AtomicUsize>,
    closes_completed: Arc<AtomicUsize>,
    restored: Arc<AtomicUsize>,
    connection_override: Arc<AtomicBool>,
    evict_at_init: Arc<Mutex<Vec<u64>>>,
    events: Arc<Mutex<Vec<String>>>,

    // Behavior controls for testing
    close_delay: Arc<Mutex<Duration>>,
    fail_next_init: Arc<Mutex<Option<String>>>,
    fail_next_close: Arc<Mutex<Option<String>>>,
}

impl MockConnectionManager {
    pub fn new(options: SharedPoolOptions) -> Self {
        Self {
            options,
            init_calls: Arc::new(AtomicUsize::new(0)),
            close_calls: Arc::new(AtomicUsize::new(0)),
            closes_completed: Arc::new(AtomicUsize::new(0)),
            restored: Arc::new(AtomicUsize::new(0)),
            connection_override: Arc::new(AtomicBool::new(false)),
            evict_at_init: Arc::new(Mutex::new(Vec::new())),
            events: Arc::new(Mutex::new(Vec::new())),
            close_delay: Arc::new(Mutex::new(Duration::ZERO)),
            fail_next_init: Arc::new(Mutex::new(None)),
            fail_next_close: Arc::new(Mutex::new(None)),
        }
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Number of `close` calls that ran to completion (awaited past the delay)
    pub fn closes_completed(&self) -> usize {
        self.closes_completed.load(Ordering::SeqCst)
    }

    /// Number of overrides removed by `restore_connection`
    pub fn restored(&self) -> usize {
        self.restored.load(Ordering::SeqCst)
    }

    /// Whether `close` disabled connection acquisition and nothing restored it
    pub fn has_connection_override(&self) -> bool {
        self.connection_override.load(Ordering::SeqCst)
    }

    /// Eviction window (ms) observed at each `init_pools` call
    pub fn evict_at_init(&self) -> Vec<u64> {
        self.evict_at_init.lock().unwrap().clone()
    }

    /// Ordered log of lifecycle calls plus anything passed to [`Self::record`]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn record(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }

    /// Make every `close` sleep before completing
    pub fn set_close_delay(&self, delay: Duration) {
        *self.close_delay.lock().unwrap() = delay;
    }

    pub fn fail_next_init(&self, message: &str) {
        *self.fail_next_init.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_next_close(&self, message: &str) {
        *self.fail_next_close.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    fn init_pools(&self) -> PoolResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.record("init_pools");
        self.evict_at_init
            .lock()
            .unwrap()
            .push(self.options.snapshot().evict_ms);

        if let Some(message) = self.fail_next_init.lock().unwrap().take() {
            return Err(PoolError::other(message));
        }
        Ok(())
    }

    async fn close(&self) -> PoolResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.record("close");

        let delay = *self.close_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.connection_override.store(true, Ordering::SeqCst);

        let failure = self.fail_next_close.lock().unwrap().take();
        if let Some(message) = failure {
            return Err(PoolError::other(message));
        }
        self.closes_completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn restore_connection(&self) -> bool {
        let had_override = self.connection_override.swap(false, Ordering::SeqCst);
        if had_override {
            self.restored.fetch_add(1, Ordering::SeqCst);
            self.record("restore_connection");
        }
        had_override
    }
}

/// Mock pooled resource remembering how it was constructed
pub struct MockResource<A = ()> {
    /// Arguments given to the constructor
    pub args: A,
    /// Options as they were when the resource was built
    pub options_at_construction: PoolOptions,
    /// Live handle to the manager's options
    pub options: SharedPoolOptions,
    connections: MockConnectionManager,
}

impl<A> MockResource<A> {
    pub fn with_args(args: A, options: SharedPoolOptions) -> Self {
        Self {
            args,
            options_at_construction: options.snapshot(),
            connections: MockConnectionManager::new(options.clone()),
            options,
        }
    }

    /// Typed access to the mock connection manager
    pub const fn connections(&self) -> &MockConnectionManager {
        &self.connections
    }
}

impl MockResource {
    /// Factory-style constructor
    pub fn new(options: SharedPoolOptions) -> Self {
        Self::with_args((), options)
    }
}

impl<A: Send + Sync + 'static> PooledResource for MockResource<A> {
    fn connection_manager(&self) -> &dyn ConnectionManager {
        &self.connections
    }
}

impl<A: Send + Sync + 'static> PoolConstructor for MockResource<A> {
    type Args = A;

    fn construct(args: Self::Args, options: SharedPoolOptions) -> Self {
        Self::with_args(args, options)
    }
}
