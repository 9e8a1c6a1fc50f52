//! crates/studio_booking_core/src/domain.rs
//!
//! Defines the core data structures for the studio booking application.
//! Field names follow the camelCase layout the document store uses, so the
//! same types decode at the store boundary and encode on the API surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ClassId = i64;
pub type CourseId = i64;

/// A registered user, keyed by the id the store assigned at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub created_at: String,
}

/// The user held by the session store: a `User` without its password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

/// A recurring offering. Authored out-of-band; read-only for the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Course {
    pub id: CourseId,
    pub course_name: String,
    pub description: String,
    pub days_of_week: String,
    pub time_of_course: String,
    pub duration: i64,
    pub difficulty_level: String,
    pub type_of_class: String,
    pub capacity: i64,
    pub price_per_class: f64,
}

/// One scheduled occurrence of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub date: String,
    pub instructor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A class annotated with the price of its course, joined at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedClass {
    #[serde(flatten)]
    pub class: Class,
    pub price_per_class: Option<f64>,
}

/// A class the user intends to book. Lives only in the in-memory cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub class_id: ClassId,
    pub class_name: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub date: String,
    pub instructor_name: String,
    pub price: f64,
}

impl CartItem {
    /// Builds a cart entry from a catalog class. A class whose course is
    /// missing goes into the cart at no charge.
    pub fn from_class(enriched: &EnrichedClass) -> Self {
        let class = &enriched.class;
        Self {
            class_id: class.id,
            class_name: class.name.clone(),
            course_id: class.course_id,
            course_name: class.course_name.clone(),
            date: class.date.clone(),
            instructor_name: class.instructor_name.clone(),
            price: enriched.price_per_class.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
        }
    }
}

/// A persisted reservation, stored at `bookings/{userId}/{classId}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub class_id: ClassId,
    pub class_name: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub date: String,
    pub instructor_name: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub booking_time: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub price: f64,
}

impl Booking {
    /// A booking for one cart entry, not yet written. The store assigns
    /// `booking_time` at write time.
    pub fn confirmed(item: &CartItem, user: &SessionUser) -> Self {
        Self {
            class_id: item.class_id,
            class_name: item.class_name.clone(),
            course_id: item.course_id,
            course_name: item.course_name.clone(),
            date: item.date.clone(),
            instructor_name: item.instructor_name.clone(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            booking_time: None,
            status: BookingStatus::Confirmed,
            price: item.price,
        }
    }
}

/// A booking as shown in the profile history, with the course price joined
/// in (falling back to the price paid when the course no longer exists).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedClass {
    #[serde(flatten)]
    pub booking: Booking,
    pub price_per_class: f64,
}
