//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service. Every failure
//! reaches the client as a status code and one message string.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use studio_booking_core::accounts::{AccountError, FieldError};
use studio_booking_core::checkout::CheckoutError;
use studio_booking_core::domain::ClassId;
use studio_booking_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more input fields were rejected.
    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Conflict(String),

    /// Some booking writes failed; others may have been committed.
    #[error("Failed to process checkout")]
    CheckoutFailed { failed: Vec<ClassId> },

    /// A read or write against a store failed. `message` is what the user sees.
    #[error("{message}")]
    Remote {
        message: &'static str,
        #[source]
        source: PortError,
    },

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wraps a store failure with the message shown to the user. Not-found
    /// outcomes keep their own message.
    pub fn remote(message: &'static str) -> impl FnOnce(PortError) -> ApiError {
        move |source| match source {
            PortError::NotFound(what) => ApiError::NotFound(what),
            source => ApiError::Remote { message, source },
        }
    }

    /// Maps an account failure, using `message` for store failures.
    pub fn account(message: &'static str) -> impl FnOnce(AccountError) -> ApiError {
        move |e| match e {
            AccountError::Validation(fields) => ApiError::Validation(fields),
            AccountError::NoUsers => ApiError::NotFound("No users found".to_string()),
            AccountError::InvalidCredentials => ApiError::Unauthenticated("Invalid credentials".to_string()),
            AccountError::Hashing(reason) => ApiError::Internal(reason),
            AccountError::Port(source) => ApiError::Remote { message, source },
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::NotAuthenticated => ApiError::Unauthenticated("Please login first".to_string()),
            CheckoutError::AlreadySubmitting => ApiError::Conflict("Checkout already in progress".to_string()),
            CheckoutError::WritesFailed { failed, .. } => ApiError::CheckoutFailed { failed },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(fields) => {
                let message = fields
                    .first()
                    .map(|f| f.message.clone())
                    .unwrap_or_else(|| self.to_string());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "error": message, "fields": fields }),
                )
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::Unauthenticated(message) => (StatusCode::UNAUTHORIZED, json!({ "error": message })),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, json!({ "error": message })),
            ApiError::CheckoutFailed { failed } => {
                tracing::error!(failed = ?failed, "Checkout failed");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": self.to_string(), "failedClassIds": failed }),
                )
            }
            ApiError::Remote { message, source } => {
                tracing::error!(error.cause = %source, "{}", message);
                (StatusCode::BAD_GATEWAY, json!({ "error": message }))
            }
            e @ (ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Migrate(_)
            | ApiError::Io(_)
            | ApiError::Internal(_)) => {
                tracing::error!(error.message = %e, "Unexpected error happened");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Something went wrong" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
