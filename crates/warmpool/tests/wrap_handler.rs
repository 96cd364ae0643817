//! Tests for handler wrapping: eviction window, init/close ordering, failures

#![allow(clippy::unwrap_used)]

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use warmpool::{MockResource, PoolError, PoolManager};

#[derive(Debug, Error)]
enum TestError {
    #[error("handler failed: {0}")]
    Handler(String),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

fn setup() -> (Arc<PoolManager>, Arc<MockResource>) {
    let manager = Arc::new(PoolManager::new());
    let resource = manager.register(MockResource::new);
    (manager, resource)
}

#[tokio::test]
async fn test_eviction_set_to_remaining_time_before_init() {
    let (manager, resource) = setup();
    let wrapped = manager.wrap_handler(|_budget: Duration| async { Ok::<_, TestError>(()) });

    wrapped(Duration::from_millis(2750)).await.unwrap();
    wrapped(Duration::from_millis(900)).await.unwrap();

    assert_eq!(resource.connections().evict_at_init(), vec![2750, 900]);
    assert_eq!(manager.options().snapshot().evict_ms, 900);
    // The resource holds the same handle, so it sees the update too
    assert_eq!(resource.options.snapshot().evict_ms, 900);
}

#[tokio::test]
async fn test_handler_runs_between_init_and_close() {
    let (manager, resource) = setup();
    let observed = Arc::clone(&resource);
    let wrapped = manager.wrap_handler(move |budget: Duration| {
        let observed = Arc::clone(&observed);
        async move {
            observed.connections().record("handler");
            Ok::<_, TestError>(budget.as_millis())
        }
    });

    let result = wrapped(Duration::from_secs(3)).await.unwrap();

    assert_eq!(result, 3000);
    assert_eq!(
        resource.connections().events(),
        vec!["init_pools", "handler", "close"]
    );
    assert!(!manager.is_pool_open());
}

#[tokio::test]
async fn test_handler_sees_open_pool() {
    let (manager, _resource) = setup();
    let inside = Arc::clone(&manager);
    let wrapped = manager.wrap_handler(move |_budget: Duration| {
        let open = inside.is_pool_open();
        async move { Ok::<_, TestError>(open) }
    });

    assert!(wrapped(Duration::from_secs(1)).await.unwrap());
}

#[tokio::test]
async fn test_handler_error_propagates_after_close() {
    let (manager, resource) = setup();
    let wrapped = manager.wrap_handler(|_budget: Duration| async {
        Err::<(), _>(TestError::Handler("boom".to_string()))
    });

    let error = wrapped(Duration::from_secs(1)).await.unwrap_err();

    assert!(matches!(error, TestError::Handler(ref message) if message == "boom"));
    assert_eq!(resource.connections().close_calls(), 1);
    assert_eq!(resource.connections().closes_completed(), 1);
}

#[tokio::test]
async fn test_close_failure_supersedes_success() {
    let (manager, resource) = setup();
    resource.connections().fail_next_close("drain failed");
    let wrapped = manager.wrap_handler(|_budget: Duration| async { Ok::<_, TestError>(42) });

    let error = wrapped(Duration::from_secs(1)).await.unwrap_err();

    assert!(matches!(error, TestError::Pool(PoolError::Other { ref message }) if message == "drain failed"));
}

#[tokio::test]
async fn test_close_failure_supersedes_handler_error() {
    let (manager, resource) = setup();
    resource.connections().fail_next_close("drain failed");
    let wrapped = manager.wrap_handler(|_budget: Duration| async {
        Err::<(), _>(TestError::Handler("boom".to_string()))
    });

    let error = wrapped(Duration::from_secs(1)).await.unwrap_err();

    assert!(matches!(error, TestError::Pool(_)));
    assert_eq!(resource.connections().close_calls(), 1);
}

#[tokio::test]
async fn test_init_failure_skips_handler_but_closes() {
    let (manager, resource) = setup();
    resource.connections().fail_next_init("no pool for you");
    let observed = Arc::clone(&resource);
    let wrapped = manager.wrap_handler(move |_budget: Duration| {
        let observed = Arc::clone(&observed);
        async move {
            observed.connections().record("handler");
            Ok::<_, TestError>(())
        }
    });

    let error = wrapped(Duration::from_secs(1)).await.unwrap_err();

    assert!(matches!(error, TestError::Pool(PoolError::Other { .. })));
    assert_eq!(resource.connections().events(), vec!["init_pools", "close"]);
}

#[tokio::test]
async fn test_handler_panic_still_closes_once() {
    let (manager, resource) = setup();
    let wrapped = manager.wrap_handler(|_budget: Duration| async {
        if true {
            panic!("handler panicked");
        }
        Ok::<(), TestError>(())
    });

    let outcome = AssertUnwindSafe(wrapped(Duration::from_secs(1)))
        .catch_unwind()
        .await;

    assert!(outcome.is_err());
    assert_eq!(resource.connections().close_calls(), 1);
    assert_eq!(resource.connections().closes_completed(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wrapped_handler_awaits_slow_close() {
    let (manager, resource) = setup();
    resource
        .connections()
        .set_close_delay(Duration::from_millis(200));
    let wrapped = manager.wrap_handler(|_budget: Duration| async { Ok::<_, TestError>(()) });

    wrapped(Duration::from_secs(1)).await.unwrap();

    assert_eq!(resource.connections().closes_completed(), 1);
}

#[tokio::test]
async fn test_wrap_without_resource_runs_handler() {
    let manager = Arc::new(PoolManager::new());
    let wrapped = manager.wrap_handler(|budget: Duration| async move {
        Ok::<_, TestError>(budget.as_millis())
    });

    assert_eq!(wrapped(Duration::from_millis(5)).await.unwrap(), 5);
    assert_eq!(manager.options().snapshot().evict_ms, 5);
}

#[tokio::test]
async fn test_wrapped_handler_accepts_lambda_events() {
    let (manager, resource) = setup();
    let wrapped = manager.wrap_handler(
        |event: lambda_runtime::LambdaEvent<serde_json::Value>| async move {
            Ok::<_, lambda_runtime::Error>(event.payload)
        },
    );

    let mut context = lambda_runtime::Context::default();
    context.deadline = 0;
    let event = lambda_runtime::LambdaEvent::new(serde_json::json!({ "ok": true }), context);

    let payload = wrapped(event).await.unwrap();

    assert_eq!(payload, serde_json::json!({ "ok": true }));
    // Deadline already passed: eviction window collapses to zero
    assert_eq!(resource.connections().evict_at_init(), vec![0]);
}
