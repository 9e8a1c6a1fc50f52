//! services/api/src/web/profile.rs

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use studio_booking_core::{domain::BookedClass, history, SessionUser};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct BookingHistoryResponse {
    #[schema(value_type = Vec<Object>)]
    pub bookings: Vec<BookedClass>,
}

/// GET /profile/bookings - Past bookings of the signed-in user
#[utoipa::path(
    get,
    path = "/profile/bookings",
    responses(
        (status = 200, description = "Bookings with the course price joined in", body = BookingHistoryResponse),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "Failed to load bookings")
    )
)]
pub async fn booking_history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<BookingHistoryResponse>, ApiError> {
    let bookings = history::booking_history(state.store.as_ref(), &user.id)
        .await
        .map_err(ApiError::remote("Failed to load bookings"))?;
    Ok(Json(BookingHistoryResponse { bookings }))
}
