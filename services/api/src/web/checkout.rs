//! services/api/src/web/checkout.rs

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use studio_booking_core::{CheckoutOutcome, CheckoutReceipt, CheckoutState};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// `cart_cleared` after a booking, `idle` when the cart was empty.
    #[schema(value_type = String)]
    pub state: CheckoutState,
    /// Absent when there was nothing to book.
    #[schema(value_type = Option<Object>)]
    pub receipt: Option<CheckoutReceipt>,
}

/// POST /checkout - Book everything in the cart
///
/// An empty cart is not an error; nothing is written and no receipt comes
/// back.
#[utoipa::path(
    post,
    path = "/checkout",
    responses(
        (status = 200, description = "Bookings written and cart cleared", body = CheckoutResponse),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "A checkout is already running"),
        (status = 502, description = "Some bookings could not be written; the cart is kept")
    )
)]
pub async fn checkout_handler(State(state): State<Arc<AppState>>) -> Result<Json<CheckoutResponse>, ApiError> {
    let outcome = state
        .checkout
        .submit(state.store.as_ref(), &state.session, &state.cart)
        .await?;

    let response = match outcome {
        CheckoutOutcome::NothingToBook => CheckoutResponse {
            state: CheckoutState::Idle,
            receipt: None,
        },
        CheckoutOutcome::Confirmed(receipt) => {
            info!("Checkout confirmed {} bookings", receipt.bookings.len());
            CheckoutResponse {
                state: state.checkout.state(),
                receipt: Some(receipt),
            }
        }
    };
    Ok(Json(response))
}
