//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use studio_booking_core::{
    ports::{DocumentStore, LocalStore},
    Cart, CheckoutFlow, SessionStore,
};
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The process serves one app instance, so it holds exactly one session and
/// one cart.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub session: Arc<SessionStore>,
    pub cart: Arc<Cart>,
    pub checkout: Arc<CheckoutFlow>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the stores together and restores any persisted session. Must
    /// run before the first request is served.
    pub async fn start(
        config: Arc<Config>,
        store: Arc<dyn DocumentStore>,
        local: Arc<dyn LocalStore>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(local));
        match session.restore().await {
            Some(user) => info!("Resuming session for {}", user.email),
            None => info!("No saved session; starting signed out."),
        }

        Self {
            store,
            session,
            cart: Arc::new(Cart::new()),
            checkout: Arc::new(CheckoutFlow::new(config.confirmation_delay)),
            config,
        }
    }
}
