//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and logout.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studio_booking_core::{
    accounts::{self, Registration},
    domain::SessionUser,
};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

impl From<SessionUser> for AuthResponse {
    fn from(user: SessionUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
///
/// Registration does not sign the user in; the client goes on to log in.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 422, description = "Invalid input"),
        (status = 502, description = "Registration failed")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form = Registration {
        name: req.name,
        email: req.email,
        password: req.password,
        confirm_password: req.confirm_password,
    };
    let user = accounts::register(state.store.as_ref(), form)
        .await
        .map_err(ApiError::account("Registration failed"))?;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(SessionUser::from(user)))))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "No users found"),
        (status = 422, description = "Missing fields"),
        (status = 502, description = "Login failed")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = accounts::login(state.store.as_ref(), &req.email, &req.password)
        .await
        .map_err(ApiError::account("Login failed"))?;

    let session_user = state.session.login(user).await;
    info!("User {} logged in", session_user.id);

    Ok(Json(AuthResponse::from(session_user)))
}

/// POST /auth/logout - End the current session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logout successful")
    )
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.logout().await;
    StatusCode::NO_CONTENT
}

/// GET /auth/me - The signed-in user
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current session", body = AuthResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(State(state): State<Arc<AppState>>) -> Result<Json<AuthResponse>, ApiError> {
    state
        .session
        .current()
        .map(|user| Json(AuthResponse::from(user)))
        .ok_or_else(|| ApiError::Unauthenticated("Not signed in".to_string()))
}
