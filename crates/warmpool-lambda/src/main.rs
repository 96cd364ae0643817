//! Reference AWS Lambda function using a warm `PostgreSQL` pool
//!
//! The pool is registered once per cold start; every invocation re-opens it
//! with an eviction window matching the invocation's remaining time and
//! drains it before returning.

use anyhow::Context as _;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use warmpool::{InvocationContext, PoolManager, SqlxResource};
use warmpool_config::validation::Validate;
use warmpool_config::{DatabaseConfig, TelemetryConfig};

#[derive(Debug, Deserialize)]
struct Request {
    /// Optional label echoed back in the response
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Serialize)]
struct Response {
    request_id: String,
    label: Option<String>,
    value: i32,
    remaining_ms: u128,
}

async fn handle(resource: &SqlxResource, event: LambdaEvent<Request>) -> Result<Response, Error> {
    let remaining_ms = event.remaining_time().as_millis();
    let pool = resource.pool()?;

    let value: i32 = sqlx::query_scalar("SELECT 1::int4")
        .fetch_one(&pool)
        .await?;

    Ok(Response {
        request_id: event.context.request_id,
        label: event.payload.label,
        value,
        remaining_ms,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    warmpool_common::initialize_environment();

    let telemetry = TelemetryConfig::from_env();
    telemetry
        .validate()
        .context("Invalid telemetry configuration")?;
    warmpool_common::init_tracing(&telemetry);

    let database = DatabaseConfig::from_env();
    database
        .validate()
        .context("Invalid database configuration")?;
    info!("Using database {}", database.safe_connection_string());

    let manager = PoolManager::global();
    let resource = manager.create::<SqlxResource>(database);

    let handler = manager.wrap_handler(move |event: LambdaEvent<Request>| {
        let resource = Arc::clone(&resource);
        async move { handle(&resource, event).await }
    });

    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_label_is_optional() {
        let request: Request = serde_json::from_str("{}").unwrap();
        assert!(request.label.is_none());

        let request: Request = serde_json::from_str(r#"{"label":"warmup"}"#).unwrap();
        assert_eq!(request.label.as_deref(), Some("warmup"));
    }

    #[test]
    fn test_response_serializes_all_fields() {
        let response = Response {
            request_id: "abc".to_string(),
            label: None,
            value: 1,
            remaining_ms: 900,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["value"], 1);
        assert_eq!(json["remaining_ms"], 900);
        assert!(json["label"].is_null());
    }
}
