//! services/api/src/web/catalog.rs
//!
//! Read-only endpoints over courses and classes.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studio_booking_core::{
    catalog::{self, ClassFilter, FEATURED_COUNT},
    domain::{Course, EnrichedClass},
};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Query string for `/classes`. `days` and `courses` are comma separated.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassQuery {
    /// Matched against class and instructor names, ignoring case.
    pub q: Option<String>,
    /// Day names, e.g. `Monday,Wednesday`.
    pub days: Option<String>,
    /// Course names.
    pub courses: Option<String>,
}

impl ClassQuery {
    fn to_filter(&self) -> Result<ClassFilter, ApiError> {
        let days = split_list(self.days.as_deref())
            .into_iter()
            .map(|name| {
                catalog::parse_weekday(&name).ok_or_else(|| ApiError::BadRequest(format!("Unknown day '{}'", name)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ClassFilter {
            query: self.q.clone().unwrap_or_default(),
            days,
            courses: split_list(self.courses.as_deref()),
        })
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionQuery {
    pub q: String,
}

#[derive(Serialize, ToSchema)]
pub struct CoursesResponse {
    #[schema(value_type = Vec<Object>)]
    pub courses: Vec<Course>,
}

#[derive(Serialize, ToSchema)]
pub struct ClassesResponse {
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub classes: Vec<EnrichedClass>,
}

impl From<Vec<EnrichedClass>> for ClassesResponse {
    fn from(classes: Vec<EnrichedClass>) -> Self {
        Self {
            count: classes.len(),
            classes,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptionsResponse {
    pub days_of_week: Vec<String>,
    pub courses: Vec<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /courses - Every course
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "All courses", body = CoursesResponse),
        (status = 404, description = "No courses found"),
        (status = 502, description = "Failed to load courses")
    )
)]
pub async fn list_courses_handler(State(state): State<Arc<AppState>>) -> Result<Json<CoursesResponse>, ApiError> {
    let courses = catalog::fetch_courses(state.store.as_ref())
        .await
        .map_err(ApiError::remote("Failed to load courses"))?;
    Ok(Json(CoursesResponse { courses }))
}

/// GET /classes - Classes with their course price, filtered
#[utoipa::path(
    get,
    path = "/classes",
    params(ClassQuery),
    responses(
        (status = 200, description = "Matching classes in catalog order", body = ClassesResponse),
        (status = 400, description = "Unknown day name"),
        (status = 502, description = "Failed to load classes")
    )
)]
pub async fn list_classes_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClassQuery>,
) -> Result<Json<ClassesResponse>, ApiError> {
    let filter = query.to_filter()?;
    let classes = catalog::fetch_catalog(state.store.as_ref())
        .await
        .map_err(ApiError::remote("Failed to load classes"))?;
    Ok(Json(filter.apply(&classes).into()))
}

/// GET /classes/filters - Choices for the filter picker
#[utoipa::path(
    get,
    path = "/classes/filters",
    responses(
        (status = 200, description = "Days and course names", body = FilterOptionsResponse),
        (status = 502, description = "Failed to load classes")
    )
)]
pub async fn filter_options_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilterOptionsResponse>, ApiError> {
    let classes = catalog::fetch_catalog(state.store.as_ref())
        .await
        .map_err(ApiError::remote("Failed to load classes"))?;
    let options = catalog::filter_options(&classes);
    Ok(Json(FilterOptionsResponse {
        days_of_week: options.days_of_week.into_iter().map(str::to_string).collect(),
        courses: options.courses,
    }))
}

/// GET /classes/featured - The classes shown on the home screen
#[utoipa::path(
    get,
    path = "/classes/featured",
    responses(
        (status = 200, description = "First classes of the catalog", body = ClassesResponse),
        (status = 502, description = "Failed to load classes")
    )
)]
pub async fn featured_handler(State(state): State<Arc<AppState>>) -> Result<Json<ClassesResponse>, ApiError> {
    let classes = catalog::fetch_catalog(state.store.as_ref())
        .await
        .map_err(ApiError::remote("Failed to load classes"))?;
    Ok(Json(catalog::featured(&classes, FEATURED_COUNT).into()))
}

/// GET /classes/suggestions - Quick search by class or course name
#[utoipa::path(
    get,
    path = "/classes/suggestions",
    params(SuggestionQuery),
    responses(
        (status = 200, description = "Matches; empty below two characters", body = ClassesResponse),
        (status = 502, description = "Failed to load classes")
    )
)]
pub async fn suggestions_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<ClassesResponse>, ApiError> {
    let classes = catalog::fetch_catalog(state.store.as_ref())
        .await
        .map_err(ApiError::remote("Failed to load classes"))?;
    Ok(Json(catalog::search_suggestions(&classes, &query.q).into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn query_string_becomes_a_filter() {
        let query = ClassQuery {
            q: Some("yoga".to_string()),
            days: Some("Monday, wed".to_string()),
            courses: Some("Flow,,Yin".to_string()),
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.query, "yoga");
        assert_eq!(filter.days, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(filter.courses, vec!["Flow", "Yin"]);
    }

    #[test]
    fn unknown_days_are_rejected() {
        let query = ClassQuery {
            days: Some("Caturday".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.to_filter(), Err(ApiError::BadRequest(_))));
    }
}
