//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that only lets requests through while someone is signed in.
///
/// The signed-in `SessionUser` is inserted into request extensions for
/// handlers to use. Otherwise the request is answered with 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = state
        .session
        .current()
        .ok_or_else(|| ApiError::Unauthenticated("Please login first".to_string()))?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
