//! crates/studio_booking_core/src/records.rs
//!
//! Translates between the untyped JSON held by the document store and the
//! typed domain structs. Every value read from the store passes through here,
//! so a missing or unexpected field surfaces as `PortError::Decode`.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Booking, BookingStatus, ClassId, CourseId, User};
use crate::ports::{server_timestamp, PortError, PortResult};

//=========================================================================================
// Collections
//=========================================================================================

/// Decodes a collection node into `(key, record)` pairs.
///
/// The store returns a collection either as an object keyed by child key or,
/// for dense integer keys, as an array with `null` holes. Both are accepted.
/// Object entries come back with integer-like keys first in numeric order,
/// then the remaining keys in lexical order.
pub fn decode_collection<T: DeserializeOwned>(path: &str, value: Value) -> PortResult<Vec<(String, T)>> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));
            entries
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(key, v)| {
                    let record = decode_one(&format!("{}/{}", path, key), v)?;
                    Ok((key, record))
                })
                .collect()
        }
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(index, v)| {
                let key = index.to_string();
                let record = decode_one(&format!("{}/{}", path, key), v)?;
                Ok((key, record))
            })
            .collect(),
        other => Err(PortError::Decode {
            path: path.to_string(),
            message: format!("expected a collection, found {}", kind_of(&other)),
        }),
    }
}

/// Decodes a single record.
pub fn decode_one<T: DeserializeOwned>(path: &str, value: Value) -> PortResult<T> {
    serde_json::from_value(value).map_err(|e| PortError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// A user as stored under `users/{id}`. The id is the key, not a field.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UserRecord {
    email: String,
    name: String,
    password: String,
    created_at: String,
}

pub fn decode_users(value: Value) -> PortResult<Vec<User>> {
    let records: Vec<(String, UserRecord)> = decode_collection("users", value)?;
    Ok(records
        .into_iter()
        .map(|(id, r)| User {
            id,
            email: r.email,
            name: r.name,
            password: r.password,
            created_at: r.created_at,
        })
        .collect())
}

pub fn encode_user(user: &User) -> PortResult<Value> {
    let record = UserRecord {
        email: user.email.clone(),
        name: user.name.clone(),
        password: user.password.clone(),
        created_at: user.created_at.clone(),
    };
    serde_json::to_value(record).map_err(|e| PortError::Unexpected(e.to_string()))
}

//=========================================================================================
// Bookings
//=========================================================================================

/// A booking as stored under `bookings/{userId}/{classId}`. `bookingTime`
/// holds the epoch milliseconds the store resolved at write time.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BookingRecord {
    class_id: ClassId,
    class_name: String,
    course_id: CourseId,
    course_name: String,
    date: String,
    instructor_name: String,
    user_id: String,
    user_name: String,
    user_email: String,
    booking_time: Option<i64>,
    status: BookingStatus,
    price: f64,
}

impl BookingRecord {
    fn into_domain(self) -> Booking {
        Booking {
            class_id: self.class_id,
            class_name: self.class_name,
            course_id: self.course_id,
            course_name: self.course_name,
            date: self.date,
            instructor_name: self.instructor_name,
            user_id: self.user_id,
            user_name: self.user_name,
            user_email: self.user_email,
            booking_time: self
                .booking_time
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            status: self.status,
            price: self.price,
        }
    }
}

pub fn decode_bookings(path: &str, value: Value) -> PortResult<Vec<Booking>> {
    let records: Vec<(String, BookingRecord)> = decode_collection(path, value)?;
    Ok(records.into_iter().map(|(_, r)| r.into_domain()).collect())
}

/// Encodes a booking for writing. The booking time is always left to the
/// store, whatever the in-memory value says.
pub fn encode_booking(booking: &Booking) -> Value {
    serde_json::json!({
        "classId": booking.class_id,
        "className": booking.class_name,
        "courseId": booking.course_id,
        "courseName": booking.course_name,
        "date": booking.date,
        "instructorName": booking.instructor_name,
        "userId": booking.user_id,
        "userName": booking.user_name,
        "userEmail": booking.user_email,
        "bookingTime": server_timestamp(),
        "status": booking.status.as_str(),
        "price": booking.price,
    })
}

/// Formats a timestamp the way registration stamps `createdAt`.
pub fn format_created_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Course;
    use serde_json::json;

    fn course_json(id: i64, price: f64) -> Value {
        json!({
            "id": id,
            "courseName": "Flow",
            "description": "d",
            "daysOfWeek": "Monday",
            "timeOfCourse": "10:00",
            "duration": 60,
            "difficultyLevel": "Beginner",
            "typeOfClass": "Flow Yoga",
            "capacity": 20,
            "pricePerClass": price,
        })
    }

    #[test]
    fn decodes_array_collections_skipping_holes() {
        let value = json!([null, course_json(1, 10.0), null, course_json(3, 12.5)]);
        let courses: Vec<(String, Course)> = decode_collection("courses", value).unwrap();
        let keys: Vec<&str> = courses.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["1", "3"]);
        assert_eq!(courses[1].1.price_per_class, 12.5);
    }

    #[test]
    fn orders_integer_keys_numerically() {
        let value = json!({
            "10": course_json(10, 1.0),
            "2": course_json(2, 1.0),
            "-Nabc": course_json(99, 1.0),
        });
        let courses: Vec<(String, Course)> = decode_collection("courses", value).unwrap();
        let ids: Vec<i64> = courses.iter().map(|(_, c)| c.id).collect();
        assert_eq!(ids, vec![2, 10, 99]);
    }

    #[test]
    fn rejects_unknown_fields() {
        let mut course = course_json(1, 10.0);
        course["rogue"] = json!(true);
        let err = decode_collection::<Course>("courses", json!({ "1": course })).unwrap_err();
        match err {
            PortError::Decode { path, .. } => assert_eq!(path, "courses/1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_fields() {
        let value = json!({ "u1": { "email": "a@b.c", "name": "A", "createdAt": "x" } });
        assert!(matches!(decode_users(value), Err(PortError::Decode { .. })));
    }

    #[test]
    fn rejects_scalar_collections() {
        assert!(matches!(
            decode_collection::<Course>("courses", json!(5)),
            Err(PortError::Decode { .. })
        ));
    }

    #[test]
    fn user_ids_come_from_keys() {
        let value = json!({
            "-Nkey1": { "email": "a@b.c", "name": "A", "password": "p", "createdAt": "t" }
        });
        let users = decode_users(value).unwrap();
        assert_eq!(users[0].id, "-Nkey1");
        assert_eq!(users[0].email, "a@b.c");
    }

    #[test]
    fn booking_time_decodes_from_millis() {
        let value = json!({
            "7": {
                "classId": 7, "className": "Sunrise", "courseId": 1, "courseName": "Flow",
                "date": "2024-11-25", "instructorName": "Ana", "userId": "u1",
                "userName": "U", "userEmail": "u@x.y", "bookingTime": 1_700_000_000_000i64,
                "status": "confirmed", "price": 10.0
            }
        });
        let bookings = decode_bookings("bookings/u1", value).unwrap();
        assert_eq!(bookings[0].booking_time.unwrap().timestamp_millis(), 1_700_000_000_000);
        assert_eq!(bookings[0].status, BookingStatus::Confirmed);
    }
}
