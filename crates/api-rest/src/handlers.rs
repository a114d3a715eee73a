//! Request handlers.
//!
//! Bodies are taken as raw JSON and run through `ward_core::validation`, so a body that parses
//! but is missing or mistyping a field is answered with the validation message rather than a
//! generic deserialization error.

use api_shared::{
    ErrorRes, HealthRes, HealthService, MedicalCenter, Patient, PatientWithVisits,
    SuggestDiagnosesReq, SuggestDiagnosesRes, Visit, Vital,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use ward_core::validation::{
    validate_diagnosis_request, validate_medical_center, validate_patient, validate_visit,
    validate_vital,
};
use ward_core::VitalQuery;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Answers any method a route does not serve.
pub async fn method_not_allowed(method: Method, allow: &'static str) -> Response {
    let mut response = ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {} Not Allowed", method),
    )
    .into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(allow));
    response
}

/// Treats a missing or blank query parameter the same way.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses an epoch-milliseconds query bound.
fn parse_millis(value: Option<String>) -> ApiResult<Option<DateTime<Utc>>> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(Some)
        .ok_or_else(|| ApiError::bad_request("Invalid date format"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientLookup {
    pub patient_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body(
        content = Patient,
        description = "Patient fields. `patientId`, `createdAt` and `updatedAt` are assigned by the server."
    ),
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Validation failed", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Create a patient.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    const FAILURE: &str = "Failed to create patient";

    let Json(body) = body?;
    let new = validate_patient(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let patient = state
        .services
        .patients
        .create(new)
        .await
        .map_err(|e| ApiError::from_core(e, FAILURE))?;

    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/patients",
    params(("patientId" = Option<String>, Query, description = "Return only this patient")),
    responses(
        (status = 200, description = "All patients, or the single requested patient", body = [Patient]),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List patients, or fetch one with `?patientId=`.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    lookup: Result<Query<PatientLookup>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(lookup) = lookup?;
    const FAILURE: &str = "Failed to retrieve patients";
    let patients = &state.services.patients;

    match present(lookup.patient_id) {
        Some(id) => {
            let patient = patients
                .get(&id)
                .await
                .map_err(|e| ApiError::from_core(e, FAILURE))?;
            Ok(Json(patient).into_response())
        }
        None => {
            let all = patients
                .list()
                .await
                .map_err(|e| ApiError::from_core(e, FAILURE))?;
            Ok(Json(all).into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient with its visits", body = PatientWithVisits),
        (status = 400, description = "Invalid patient ID", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Fetch a patient together with every visit that references it.
#[axum::debug_handler]
pub async fn get_patient_with_visits(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientWithVisits>> {
    let patient = state
        .services
        .patients
        .get_with_visits(&id)
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to retrieve patient with visits"))?;
    Ok(Json(patient))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterLookup {
    pub center_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/centers",
    request_body(
        content = MedicalCenter,
        description = "Centre fields. `centerId`, `createdAt` and `updatedAt` are assigned by the server."
    ),
    responses(
        (status = 201, description = "Medical center created", body = MedicalCenter),
        (status = 400, description = "Validation failed", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_center(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MedicalCenter>)> {
    let Json(body) = body?;
    let new = validate_medical_center(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let center = state
        .services
        .centers
        .create(new)
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to create medical center"))?;

    Ok((StatusCode::CREATED, Json(center)))
}

#[utoipa::path(
    get,
    path = "/centers",
    params(("centerId" = Option<String>, Query, description = "Return only this centre")),
    responses(
        (status = 200, description = "All centres, or the single requested centre", body = [MedicalCenter]),
        (status = 404, description = "Medical center not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_centers(
    State(state): State<AppState>,
    lookup: Result<Query<CenterLookup>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(lookup) = lookup?;
    const FAILURE: &str = "Failed to retrieve medical centers";
    let centers = &state.services.centers;

    match present(lookup.center_id) {
        Some(id) => {
            let center = centers
                .get(&id)
                .await
                .map_err(|e| ApiError::from_core(e, FAILURE))?;
            Ok(Json(center).into_response())
        }
        None => {
            let all = centers
                .list()
                .await
                .map_err(|e| ApiError::from_core(e, FAILURE))?;
            Ok(Json(all).into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitLookup {
    pub visit_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/visits",
    request_body(content = Visit, description = "`patientId` and `centerId`. `visitId` is assigned by the server."),
    responses(
        (status = 201, description = "Visit recorded and patient touched", body = Visit),
        (status = 400, description = "Validation failed", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Record a visit. Moves the referenced patient's `updatedAt` forward.
#[axum::debug_handler]
pub async fn create_visit(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Visit>)> {
    let Json(body) = body?;
    let new = validate_visit(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let visit = state
        .services
        .visits
        .create(new)
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to create visit"))?;

    Ok((StatusCode::CREATED, Json(visit)))
}

#[utoipa::path(
    get,
    path = "/visits",
    params(("visitId" = Option<String>, Query, description = "Return only this visit")),
    responses(
        (status = 200, description = "All visits, or the single requested visit", body = [Visit]),
        (status = 404, description = "Visit not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_visits(
    State(state): State<AppState>,
    lookup: Result<Query<VisitLookup>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(lookup) = lookup?;
    const FAILURE: &str = "Failed to retrieve visits";
    let visits = &state.services.visits;

    match present(lookup.visit_id) {
        Some(id) => {
            let visit = visits
                .get(&id)
                .await
                .map_err(|e| ApiError::from_core(e, FAILURE))?;
            Ok(Json(visit).into_response())
        }
        None => {
            let all = visits
                .list()
                .await
                .map_err(|e| ApiError::from_core(e, FAILURE))?;
            Ok(Json(all).into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsFilter {
    pub patient_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[utoipa::path(
    post,
    path = "/vitals",
    request_body(
        content = Vital,
        description = "`patientId`, `type`, `value` and `timestamp` (epoch milliseconds)."
    ),
    responses(
        (status = 201, description = "Vital recorded", body = Vital),
        (status = 400, description = "Validation failed", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_vital(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vital>)> {
    let Json(body) = body?;
    let new = validate_vital(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let vital = state
        .services
        .vitals
        .create(new)
        .await
        .map_err(|e| ApiError::from_core(e, "Error creating vital"))?;

    Ok((StatusCode::CREATED, Json(vital)))
}

#[utoipa::path(
    get,
    path = "/vitals",
    params(
        ("patientId" = Option<String>, Query, description = "Only this patient's vitals"),
        ("from" = Option<i64>, Query, description = "Inclusive lower bound, epoch milliseconds"),
        ("to" = Option<i64>, Query, description = "Inclusive upper bound, epoch milliseconds")
    ),
    responses(
        (status = 200, description = "Matching vitals, oldest first", body = [Vital]),
        (status = 400, description = "Invalid date format", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Query vitals by patient and/or measurement time.
#[axum::debug_handler]
pub async fn list_vitals(
    State(state): State<AppState>,
    filter: Result<Query<VitalsFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Vital>>> {
    let Query(filter) = filter?;
    let query = VitalQuery {
        patient_id: present(filter.patient_id),
        from: parse_millis(filter.from)?,
        to: parse_millis(filter.to)?,
    };
    let vitals = state
        .services
        .vitals
        .query(&query)
        .await
        .map_err(|e| ApiError::from_core(e, "Error retrieving vitals"))?;

    Ok(Json(vitals))
}

#[utoipa::path(
    post,
    path = "/diagnoses",
    request_body = SuggestDiagnosesReq,
    responses(
        (status = 200, description = "Suggested diagnoses", body = SuggestDiagnosesRes),
        (status = 400, description = "Validation failed", body = ErrorRes),
        (status = 500, description = "Suggestion failed", body = ErrorRes)
    )
)]
/// Ask the model for potential diagnoses based on the patient's current vitals.
#[axum::debug_handler]
pub async fn suggest_diagnoses(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SuggestDiagnosesRes>> {
    let Json(body) = body?;
    let patient_id =
        validate_diagnosis_request(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let suggestion = state
        .services
        .diagnosis
        .suggest(&patient_id)
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to suggest diagnoses"))?;

    Ok(Json(suggestion))
}
