//! crates/studio_booking_core/src/history.rs
//!
//! The profile's booking history.

use futures::try_join;

use crate::catalog::COURSES_PATH;
use crate::checkout::BOOKINGS_PATH;
use crate::domain::{BookedClass, Course};
use crate::ports::{DocumentStore, PortResult};
use crate::records::{decode_bookings, decode_collection};

/// Every booking the user has made, with the current course price joined in.
/// When a booking's course is gone or has no price (zero), the price paid
/// stands in for it.
pub async fn booking_history(store: &dyn DocumentStore, user_id: &str) -> PortResult<Vec<BookedClass>> {
    let path = format!("{}/{}", BOOKINGS_PATH, user_id);
    let (bookings, courses) = try_join!(store.read(&path), store.read(COURSES_PATH))?;

    let Some(bookings) = bookings else {
        return Ok(Vec::new());
    };
    let bookings = decode_bookings(&path, bookings)?;
    let courses: Vec<Course> = match courses {
        Some(value) => decode_collection(COURSES_PATH, value)?
            .into_iter()
            .map(|(_, course)| course)
            .collect(),
        None => Vec::new(),
    };

    Ok(bookings
        .into_iter()
        .map(|booking| {
            let price_per_class = courses
                .iter()
                .find(|course| course.id == booking.course_id)
                .map(|course| course.price_per_class)
                .filter(|price| *price != 0.0)
                .unwrap_or(booking.price);
            BookedClass {
                booking,
                price_per_class,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockDocumentStore;
    use serde_json::json;

    fn booking(class_id: i64, course_id: i64, price: f64) -> serde_json::Value {
        json!({
            "classId": class_id, "className": "Sunrise", "courseId": course_id,
            "courseName": "Flow", "date": "2024-11-25", "instructorName": "Ana",
            "userId": "u1", "userName": "Una", "userEmail": "u1@example.com",
            "bookingTime": 1_700_000_000_000i64, "status": "confirmed", "price": price
        })
    }

    #[tokio::test]
    async fn joins_course_price_with_fallback() {
        let mut store = MockDocumentStore::new();
        store.expect_read().returning(|path| match path {
            "bookings/u1" => Ok(Some(json!({ "7": booking(7, 10, 9.0), "8": booking(8, 77, 11.0) }))),
            "courses" => Ok(Some(json!({ "0": {
                "id": 10, "courseName": "Flow", "description": "", "daysOfWeek": "Monday",
                "timeOfCourse": "10:00", "duration": 60, "difficultyLevel": "Beginner",
                "typeOfClass": "Flow Yoga", "capacity": 20, "pricePerClass": 12.0
            }}))),
            other => panic!("unexpected read of {other}"),
        });

        let history = booking_history(&store, "u1").await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].booking.class_id, 7);
        assert_eq!(history[0].price_per_class, 12.0);
        assert_eq!(history[1].price_per_class, 11.0);
    }

    #[tokio::test]
    async fn no_bookings_is_an_empty_history() {
        let mut store = MockDocumentStore::new();
        store.expect_read().returning(|_| Ok(None));
        assert!(booking_history(&store, "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_course_price_falls_back_to_price_paid() {
        let mut store = MockDocumentStore::new();
        store.expect_read().returning(|path| match path {
            "bookings/u1" => Ok(Some(json!({ "7": booking(7, 10, 9.0) }))),
            "courses" => Ok(Some(json!([{
                "id": 10, "courseName": "Flow", "description": "", "daysOfWeek": "Monday",
                "timeOfCourse": "10:00", "duration": 60, "difficultyLevel": "Beginner",
                "typeOfClass": "Flow Yoga", "capacity": 20, "pricePerClass": 0.0
            }]))),
            other => panic!("unexpected read of {other}"),
        });

        let history = booking_history(&store, "u1").await.unwrap();

        assert_eq!(history[0].price_per_class, 9.0);
    }
}
