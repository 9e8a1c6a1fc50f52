//! services/api/src/adapters/firebase.rs
//!
//! An adapter for the Firebase Realtime Database REST API. It implements the
//! `DocumentStore` port from the `core` crate. Server timestamp placeholders
//! are passed through untouched; the database resolves them itself.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use studio_booking_core::ports::{DocumentStore, PortError, PortResult};
use tracing::debug;

use super::{push_key, segments};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct FirebaseDocumentStore {
    client: Client,
    base_url: String,
    auth: Option<String>,
}

impl FirebaseDocumentStore {
    /// Creates a new adapter for the database at `base_url`
    /// (e.g. `https://my-app-default-rtdb.firebaseio.com`). `auth` is sent as
    /// the `auth` query parameter when present.
    pub fn new(client: Client, base_url: &str, auth: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, segments(path).join("/"))
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }
}

fn status_error(status: StatusCode, path: &str) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(path.to_string()),
        other => PortError::Unexpected(format!("Realtime Database returned {} for {}", other, path)),
    }
}

fn request_error(e: reqwest::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for FirebaseDocumentStore {
    async fn read(&self, path: &str) -> PortResult<Option<Value>> {
        let response = self
            .with_auth(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(request_error)?;
        if !response.status().is_success() {
            return Err(status_error(response.status(), path));
        }
        let value: Value = response.json().await.map_err(request_error)?;
        debug!("Read {} from Realtime Database", path);
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    async fn write(&self, path: &str, value: Value) -> PortResult<()> {
        let response = self
            .with_auth(self.client.put(self.url(path)))
            .json(&value)
            .send()
            .await
            .map_err(request_error)?;
        if !response.status().is_success() {
            return Err(status_error(response.status(), path));
        }
        debug!("Wrote {} to Realtime Database", path);
        Ok(())
    }

    async fn generate_key(&self, _parent: &str) -> PortResult<String> {
        Ok(push_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_rest_urls() {
        let store = FirebaseDocumentStore::new(Client::new(), "https://studio.firebaseio.com/", None);
        assert_eq!(store.url("bookings/u1/7"), "https://studio.firebaseio.com/bookings/u1/7.json");
        assert_eq!(store.url(""), "https://studio.firebaseio.com/.json");
    }

    #[test]
    fn maps_auth_statuses() {
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, "users"), PortError::Unauthorized));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "users"),
            PortError::Unexpected(_)
        ));
    }
}
