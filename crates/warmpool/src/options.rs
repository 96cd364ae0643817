//! Shared, mutable pool options

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use warmpool_config::PoolOptions;

/// Cloneable handle to the pool options owned by a [`crate::PoolManager`]
///
/// Every clone observes the same values, so the eviction window written by the
/// manager before an invocation is what the pool sees when it re-initializes.
#[derive(Debug, Clone, Default)]
pub struct SharedPoolOptions {
    inner: Arc<RwLock<PoolOptions>>,
}

impl SharedPoolOptions {
    pub fn new(options: PoolOptions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(options)),
        }
    }

    /// Copy of the current values
    pub fn snapshot(&self) -> PoolOptions {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn evict(&self) -> Duration {
        self.snapshot().evict()
    }

    pub fn set_evict(&self, evict: Duration) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_evict(evict);
    }

    /// Replace every value at once
    pub fn replace(&self, options: PoolOptions) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = options;
    }

    /// Whether two handles share the same underlying options
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_observe_updates() {
        let options = SharedPoolOptions::default();
        let held_by_pool = options.clone();

        options.set_evict(Duration::from_millis(4321));

        assert_eq!(held_by_pool.snapshot().evict_ms, 4321);
        assert!(held_by_pool.same_as(&options));
    }

    #[test]
    fn test_replace_resets_all_values() {
        let options = SharedPoolOptions::new(PoolOptions {
            max: 9,
            ..PoolOptions::default()
        });
        options.replace(PoolOptions::default());
        assert_eq!(options.snapshot(), PoolOptions::default());
    }

    #[test]
    fn test_independent_handles_are_not_shared() {
        let a = SharedPoolOptions::default();
        let b = SharedPoolOptions::default();
        assert!(!a.same_as(&b));
    }
}
