use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DoctorAvailabilityResponse, DoctorError, DoctorScheduleForm};
use crate::services::{doctor::DoctorService, validation, UpsertOutcome};

#[derive(Debug, Deserialize)]
pub struct DoctorListQuery {
    pub clinic_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Clinic wall-clock reference, defaults to now.
    pub at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertDoctorRequest {
    #[serde(flatten)]
    pub schedule: DoctorScheduleForm,
    #[serde(default)]
    pub clinic_id: Option<Uuid>,
}

/// Bearer token forwarded to the record store, if the caller sent one.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorListQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service
        .list_doctors(query.clinic_id, bearer_token(&headers))
        .await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn upsert_doctor(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    Json(request): Json<UpsertDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor_service = DoctorService::new(&state);

    let outcome = doctor_service
        .upsert_doctor(request.schedule, request.clinic_id, bearer_token(&headers))
        .await?;

    let status = match outcome {
        UpsertOutcome::Created(_) => StatusCode::CREATED,
        UpsertOutcome::Updated(_) => StatusCode::OK,
    };

    Ok((status, Json(json!(outcome.into_record()))))
}

pub async fn validate_schedule(
    Json(schedule): Json<DoctorScheduleForm>,
) -> Result<Json<Value>, AppError> {
    let schedule = validation::validate_form(schedule).map_err(DoctorError::from)?;

    Ok(Json(json!({
        "valid": true,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service
        .get_doctor(doctor_id, bearer_token(&headers))
        .await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    doctor_service
        .delete_doctor(doctor_id, bearer_token(&headers))
        .await?;

    Ok(Json(json!({ "deleted": doctor_id })))
}

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
    headers: HeaderMap,
) -> Result<Json<DoctorAvailabilityResponse>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let reference_now = query
        .at
        .unwrap_or_else(|| Utc::now().with_timezone(&state.clinic_offset()).naive_local());

    let (doctor, interval) = doctor_service
        .doctor_availability(doctor_id, reference_now, bearer_token(&headers))
        .await?;

    Ok(Json(DoctorAvailabilityResponse::new(&doctor, &interval)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn missing_or_foreign_scheme_yields_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
