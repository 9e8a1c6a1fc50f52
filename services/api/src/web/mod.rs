pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod middleware;
pub mod profile;
pub mod rest;
pub mod state;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the full application router, Swagger UI included.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Checkout stays public: an empty cart is a no-op even when signed out,
    // and the flow itself rejects a missing session.
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/courses", get(catalog::list_courses_handler))
        .route("/classes", get(catalog::list_classes_handler))
        .route("/classes/filters", get(catalog::filter_options_handler))
        .route("/classes/featured", get(catalog::featured_handler))
        .route("/classes/suggestions", get(catalog::suggestions_handler))
        .route(
            "/cart",
            get(cart::get_cart_handler)
                .post(cart::add_to_cart_handler)
                .delete(cart::clear_cart_handler),
        )
        .route("/cart/{class_id}", delete(cart::remove_from_cart_handler))
        .route("/checkout", post(checkout::checkout_handler));

    let protected_routes = Router::new()
        .route("/profile/bookings", get(profile::booking_history_handler))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), require_auth));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&app_state.config.cors_origin))
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!("CORS_ORIGIN '{}' is not a valid header value; cross-origin requests are refused", origin);
            layer
        }
    }
}
