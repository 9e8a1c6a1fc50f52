//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::web::{auth, cart, catalog, checkout, profile};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        catalog::list_courses_handler,
        catalog::list_classes_handler,
        catalog::filter_options_handler,
        catalog::featured_handler,
        catalog::suggestions_handler,
        cart::get_cart_handler,
        cart::add_to_cart_handler,
        cart::remove_from_cart_handler,
        cart::clear_cart_handler,
        checkout::checkout_handler,
        profile::booking_history_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            catalog::CoursesResponse,
            catalog::ClassesResponse,
            catalog::FilterOptionsResponse,
            cart::AddToCartRequest,
            cart::CartResponse,
            checkout::CheckoutResponse,
            profile::BookingHistoryResponse,
        )
    ),
    tags(
        (name = "Studio Booking API", description = "Browse yoga classes, fill a cart, and book them.")
    )
)]
pub struct ApiDoc;
