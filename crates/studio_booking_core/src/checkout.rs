//! crates/studio_booking_core/src/checkout.rs
//!
//! Turns the cart into bookings.
//!
//! Each cart entry becomes one independent write to
//! `bookings/{userId}/{classId}`. The writes run concurrently and the
//! checkout only counts as confirmed when all of them succeed. The store is
//! not transactional: a failed checkout may still have committed some of its
//! bookings. Those are reported, not rolled back, and because the booking
//! path is fixed per class a retry simply overwrites them.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cart::Cart;
use crate::domain::{Booking, ClassId};
use crate::ports::DocumentStore;
use crate::records::encode_booking;
use crate::session::SessionStore;

pub const BOOKINGS_PATH: &str = "bookings";

pub fn booking_path(user_id: &str, class_id: ClassId) -> String {
    format!("{}/{}/{}", BOOKINGS_PATH, user_id, class_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    Submitting,
    CartCleared,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Please login first")]
    NotAuthenticated,
    #[error("Checkout already in progress")]
    AlreadySubmitting,
    #[error("Failed to process checkout")]
    WritesFailed { failed: Vec<ClassId>, attempted: usize },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub bookings: Vec<Booking>,
    pub total: f64,
    /// How long the confirmation stays on screen before moving on.
    #[serde(rename = "confirmationDelayMs", serialize_with = "as_millis")]
    pub confirmation_delay: Duration,
}

fn as_millis<S: serde::Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(delay.as_millis() as u64)
}

#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// The cart was empty. Nothing was written.
    NothingToBook,
    Confirmed(CheckoutReceipt),
}

/// Runs checkouts and tracks where the current one stands.
pub struct CheckoutFlow {
    state: Mutex<CheckoutState>,
    confirmation_delay: Duration,
}

impl CheckoutFlow {
    pub fn new(confirmation_delay: Duration) -> Self {
        Self {
            state: Mutex::new(CheckoutState::Idle),
            confirmation_delay,
        }
    }

    pub fn state(&self) -> CheckoutState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: CheckoutState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Books every class in the cart for the signed-in user.
    ///
    /// On success the booked classes leave the cart. On failure the cart is
    /// left as it was so the user can try again.
    pub async fn submit(
        &self,
        store: &dyn DocumentStore,
        session: &SessionStore,
        cart: &Cart,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let items = cart.items();
        if items.is_empty() {
            return Ok(CheckoutOutcome::NothingToBook);
        }
        let user = session.current().ok_or(CheckoutError::NotAuthenticated)?;

        let guard = SubmitGuard::begin(self)?;

        let bookings: Vec<Booking> = items.iter().map(|item| Booking::confirmed(item, &user)).collect();
        let writes = bookings.iter().map(|booking| async move {
            let path = booking_path(&booking.user_id, booking.class_id);
            let result = store.write(&path, encode_booking(booking)).await;
            (booking.class_id, result)
        });

        let mut failed = Vec::new();
        for (class_id, result) in join_all(writes).await {
            if let Err(e) = result {
                error!("Booking write for class {} failed: {}", class_id, e);
                failed.push(class_id);
            }
        }

        if !failed.is_empty() {
            let attempted = bookings.len();
            if failed.len() < attempted {
                warn!(
                    "Checkout for user {} partially committed: {} of {} bookings failed",
                    user.id,
                    failed.len(),
                    attempted
                );
            }
            return Err(CheckoutError::WritesFailed { failed, attempted });
        }

        // Classes added while the writes were in flight stay in the cart.
        let booked: Vec<ClassId> = bookings.iter().map(|b| b.class_id).collect();
        cart.remove_classes(&booked);
        guard.commit();
        info!("Confirmed {} bookings for user {}", bookings.len(), user.id);

        let total = bookings.iter().map(|b| b.price).sum();
        Ok(CheckoutOutcome::Confirmed(CheckoutReceipt {
            bookings,
            total,
            confirmation_delay: self.confirmation_delay,
        }))
    }
}

/// Holds the flow in `Submitting` for one invocation. Dropping it without
/// `commit` (failure, or the caller abandoning the future mid-write) puts the
/// flow back to `Idle`.
struct SubmitGuard<'a> {
    flow: &'a CheckoutFlow,
    committed: bool,
}

impl<'a> SubmitGuard<'a> {
    fn begin(flow: &'a CheckoutFlow) -> Result<Self, CheckoutError> {
        let mut state = flow.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == CheckoutState::Submitting {
            return Err(CheckoutError::AlreadySubmitting);
        }
        *state = CheckoutState::Submitting;
        Ok(Self { flow, committed: false })
    }

    fn commit(mut self) {
        self.committed = true;
        self.flow.set_state(CheckoutState::CartCleared);
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.flow.set_state(CheckoutState::Idle);
        }
    }
}
