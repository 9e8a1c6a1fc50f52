//! crates/studio_booking_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core logic depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the concrete document database and device storage.

use async_trait::async_trait;
use serde_json::{json, Value};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Malformed record at {path}: {message}")]
    Decode { path: String, message: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A path-addressed document database (`users/abc`, `bookings/u1/42`, ...).
///
/// Reading a path returns the whole subtree below it. Writing a path replaces
/// that subtree. There are no transactions and no conditional writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the value at `path`, or `None` when nothing is stored there.
    async fn read(&self, path: &str) -> PortResult<Option<Value>>;

    /// Replaces the value at `path`. Server value sentinels inside `value`
    /// are resolved by the store at write time.
    async fn write(&self, path: &str, value: Value) -> PortResult<()>;

    /// Produces a fresh child key under `parent`. Nothing is written.
    async fn generate_key(&self, parent: &str) -> PortResult<String>;
}

/// Device-local key/value storage, used to mirror the session across restarts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    async fn remove(&self, keys: &[String]) -> PortResult<()>;
}

//=========================================================================================
// Server Values
//=========================================================================================

/// Placeholder replaced by the store with the write time in epoch milliseconds.
pub fn server_timestamp() -> Value {
    json!({ ".sv": "timestamp" })
}

/// Replaces every server timestamp placeholder inside `value` with `now_millis`.
/// Used by stores that do not resolve placeholders natively.
pub fn resolve_server_values(value: &mut Value, now_millis: i64) {
    if is_timestamp_placeholder(value) {
        *value = Value::from(now_millis);
        return;
    }
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                resolve_server_values(child, now_millis);
            }
        }
        Value::Array(items) => {
            for child in items {
                resolve_server_values(child, now_millis);
            }
        }
        _ => {}
    }
}

fn is_timestamp_placeholder(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => map.len() == 1 && map.get(".sv").and_then(Value::as_str) == Some("timestamp"),
        None => false,
    }
}
