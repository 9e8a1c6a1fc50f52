//! crates/studio_booking_core/src/catalog.rs
//!
//! Fetching, joining and filtering the class catalog.
//!
//! Collections are small, so everything is pulled wholesale and recomputed
//! from scratch on every query. Classes carry no price of their own; the
//! price of the owning course is joined in at read time.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};
use futures::try_join;
use serde::Serialize;

use crate::domain::{Class, Course, EnrichedClass};
use crate::ports::{DocumentStore, PortError, PortResult};
use crate::records::decode_collection;

pub const CLASSES_PATH: &str = "classes";
pub const COURSES_PATH: &str = "courses";

/// Number of classes shown on the home screen.
pub const FEATURED_COUNT: usize = 4;

/// Quick search stays quiet until the user has typed this many characters.
pub const MIN_SUGGESTION_CHARS: usize = 2;

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

//=========================================================================================
// Fetching
//=========================================================================================

/// Fetches every course. An absent collection is reported as not found.
pub async fn fetch_courses(store: &dyn DocumentStore) -> PortResult<Vec<Course>> {
    match store.read(COURSES_PATH).await? {
        Some(value) => decode_records(COURSES_PATH, value),
        None => Err(PortError::NotFound("No courses found".to_string())),
    }
}

/// Fetches classes and courses concurrently and joins them once both arrive.
/// Absent collections count as empty.
pub async fn fetch_catalog(store: &dyn DocumentStore) -> PortResult<Vec<EnrichedClass>> {
    let (classes, courses) = try_join!(store.read(CLASSES_PATH), store.read(COURSES_PATH))?;

    let classes: Vec<Class> = match classes {
        Some(value) => decode_records(CLASSES_PATH, value)?,
        None => Vec::new(),
    };
    let courses: Vec<Course> = match courses {
        Some(value) => decode_records(COURSES_PATH, value)?,
        None => Vec::new(),
    };

    Ok(enrich_classes(classes, &courses))
}

fn decode_records<T: serde::de::DeserializeOwned>(path: &str, value: serde_json::Value) -> PortResult<Vec<T>> {
    Ok(decode_collection(path, value)?
        .into_iter()
        .map(|(_, record)| record)
        .collect())
}

//=========================================================================================
// Join
//=========================================================================================

/// Annotates each class with the price of the first course whose id matches
/// its `course_id`. Classes without a matching course get no price.
pub fn enrich_classes(classes: Vec<Class>, courses: &[Course]) -> Vec<EnrichedClass> {
    classes
        .into_iter()
        .map(|class| {
            let price_per_class = courses
                .iter()
                .find(|course| course.id == class.course_id)
                .map(|course| course.price_per_class);
            EnrichedClass {
                class,
                price_per_class,
            }
        })
        .collect()
}

//=========================================================================================
// Filtering
//=========================================================================================

/// Search text plus day and course selections. Every predicate must hold;
/// an empty selection matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassFilter {
    pub query: String,
    pub days: Vec<Weekday>,
    pub courses: Vec<String>,
}

impl ClassFilter {
    pub fn matches(&self, enriched: &EnrichedClass) -> bool {
        self.matches_query(&enriched.class)
            && self.matches_day(&enriched.class)
            && self.matches_course(&enriched.class)
    }

    /// Returns the matching classes in their original order.
    pub fn apply(&self, classes: &[EnrichedClass]) -> Vec<EnrichedClass> {
        classes.iter().filter(|c| self.matches(c)).cloned().collect()
    }

    fn matches_query(&self, class: &Class) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        class.name.to_lowercase().contains(&needle)
            || class.instructor_name.to_lowercase().contains(&needle)
    }

    fn matches_day(&self, class: &Class) -> bool {
        if self.days.is_empty() {
            return true;
        }
        match weekday_of(&class.date) {
            Some(day) => self.days.contains(&day),
            None => false,
        }
    }

    fn matches_course(&self, class: &Class) -> bool {
        self.courses.is_empty() || self.courses.iter().any(|c| c == &class.course_name)
    }
}

/// Parses a day name such as `Monday` or `mon`.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    Weekday::from_str(name.trim()).ok()
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// The weekday of a class date, read as written (no timezone shifting).
pub fn weekday_of(date: &str) -> Option<Weekday> {
    use chrono::Datelike;

    let date = date.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(date) {
        return Some(at.date_naive().weekday());
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(at.date().weekday());
    }
    ["%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .map(|d| d.weekday())
}

//=========================================================================================
// Screen helpers
//=========================================================================================

/// What a filter picker offers: every weekday, and each course name once in
/// the order it first appears.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub days_of_week: Vec<&'static str>,
    pub courses: Vec<String>,
}

pub fn filter_options(classes: &[EnrichedClass]) -> FilterOptions {
    let mut courses: Vec<String> = Vec::new();
    for enriched in classes {
        if !courses.contains(&enriched.class.course_name) {
            courses.push(enriched.class.course_name.clone());
        }
    }
    FilterOptions {
        days_of_week: WEEKDAYS.iter().copied().map(weekday_name).collect(),
        courses,
    }
}

/// Quick search across class and course names. Returns nothing until the
/// text is at least `MIN_SUGGESTION_CHARS` long.
pub fn search_suggestions(classes: &[EnrichedClass], text: &str) -> Vec<EnrichedClass> {
    if text.chars().count() < MIN_SUGGESTION_CHARS {
        return Vec::new();
    }
    let needle = text.to_lowercase();
    classes
        .iter()
        .filter(|c| {
            c.class.name.to_lowercase().contains(&needle)
                || c.class.course_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub fn featured(classes: &[EnrichedClass], count: usize) -> Vec<EnrichedClass> {
    classes.iter().take(count).cloned().collect()
}
