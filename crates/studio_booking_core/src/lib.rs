pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod domain;
pub mod history;
pub mod ports;
pub mod records;
pub mod session;

pub use cart::Cart;
pub use checkout::{CheckoutError, CheckoutFlow, CheckoutOutcome, CheckoutReceipt, CheckoutState};
pub use domain::{BookedClass, Booking, BookingStatus, CartItem, Class, ClassId, Course, CourseId, EnrichedClass, SessionUser, User};
pub use ports::{DocumentStore, LocalStore, PortError, PortResult};
pub use session::SessionStore;
