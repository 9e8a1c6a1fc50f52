//! services/api/src/web/cart.rs
//!
//! Endpoints over the in-memory cart.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studio_booking_core::{catalog, domain::CartItem, Cart, ClassId};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub class_id: ClassId,
}

#[derive(Serialize, ToSchema)]
pub struct CartResponse {
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<CartItem>,
    pub count: usize,
    pub total: f64,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self::from(cart.items())
    }
}

impl From<Vec<CartItem>> for CartResponse {
    /// Count and total come from the same snapshot as the items.
    fn from(items: Vec<CartItem>) -> Self {
        Self {
            count: items.len(),
            total: items.iter().map(|i| i.price).sum(),
            items,
        }
    }
}

/// GET /cart - What is in the cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart contents in the order added", body = CartResponse)
    )
)]
pub async fn get_cart_handler(State(state): State<Arc<AppState>>) -> Json<CartResponse> {
    Json(CartResponse::from(state.cart.as_ref()))
}

/// POST /cart - Add a class by id
///
/// Adding a class that is already in the cart leaves the cart unchanged and
/// answers 200 instead of 201.
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Class added", body = CartResponse),
        (status = 200, description = "Class was already in the cart", body = CartResponse),
        (status = 404, description = "No such class"),
        (status = 502, description = "Failed to load classes")
    )
)]
pub async fn add_to_cart_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddToCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let classes = catalog::fetch_catalog(state.store.as_ref())
        .await
        .map_err(ApiError::remote("Failed to load classes"))?;
    let class = classes
        .iter()
        .find(|c| c.class.id == req.class_id)
        .ok_or_else(|| ApiError::NotFound(format!("Class {} not found", req.class_id)))?;

    let status = if state.cart.add_to_cart(CartItem::from_class(class)) {
        info!("Added class {} to cart", req.class_id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(CartResponse::from(state.cart.as_ref()))))
}

/// DELETE /cart/{class_id} - Remove one class
#[utoipa::path(
    delete,
    path = "/cart/{class_id}",
    params(("class_id" = i64, Path, description = "Class to remove")),
    responses(
        (status = 200, description = "Cart after removal", body = CartResponse)
    )
)]
pub async fn remove_from_cart_handler(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<ClassId>,
) -> Json<CartResponse> {
    state.cart.remove_from_cart(class_id);
    Json(CartResponse::from(state.cart.as_ref()))
}

/// DELETE /cart - Empty the cart
#[utoipa::path(
    delete,
    path = "/cart",
    responses(
        (status = 204, description = "Cart emptied")
    )
)]
pub async fn clear_cart_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.cart.clear_cart();
    StatusCode::NO_CONTENT
}
