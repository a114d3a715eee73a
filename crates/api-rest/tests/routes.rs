use api_rest::router;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use ward_core::{GenerationError, GenerationService, MemoryStore, Services, VitalSignsMode};

struct CannedGenerator;

#[async_trait]
impl GenerationService for CannedGenerator {
    async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Value, GenerationError> {
        assert!(prompt.contains("Heart rate: 72 bpm"));
        Ok(json!({ "suggestedDiagnoses": "No acute findings." }))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

fn app() -> Router {
    router(Services::new(
        Arc::new(MemoryStore::new()),
        VitalSignsMode::Fixed,
        Arc::new(CannedGenerator),
    ))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, body) = send_raw(
        app,
        method,
        uri,
        body.map(|b| b.to_string()).unwrap_or_default(),
    )
    .await;
    (status, body)
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: String,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

fn patient_body() -> Value {
    json!({
        "fullName": "Juan Pérez",
        "birthYear": 1980,
        "documentType": "DNI",
        "documentNumber": "12345678A",
        "medicalHistory": "Hypertension",
        "contact": { "phone": "+34 600 000 000", "email": "juan@example.com", "address": "Calle Mayor 1" },
        "status": "En espera"
    })
}

async fn create_patient(app: &Router) -> Value {
    let (status, body) = send(app, "POST", "/patients", Some(patient_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_create_patient_returns_record_with_id_and_timestamps() {
    let app = app();
    let created = create_patient(&app).await;

    let id = created["patientId"].as_str().expect("patientId should be set");
    assert_eq!(id.len(), 32);
    assert_eq!(created["fullName"], "Juan Pérez");
    assert_eq!(created["contact"]["email"], "juan@example.com");
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());

    let (status, fetched) = send(&app, "GET", &format!("/patients?patientId={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_patient_validation_failures() {
    let app = app();

    let mut missing_name = patient_body();
    missing_name.as_object_mut().unwrap().remove("fullName");
    let (status, body) = send(&app, "POST", "/patients", Some(missing_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: fullName");

    let mut too_old = patient_body();
    too_old["birthYear"] = json!(1899);
    let (status, body) = send(&app, "POST", "/patients", Some(too_old)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("birthYear"));

    let (status, body) = send(&app, "GET", "/patients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]), "nothing should have been written");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, _, body) =
        send_raw(&app(), "POST", "/patients", "{ not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_repeated_query_parameter_is_json_bad_request() {
    let app = app();
    for uri in [
        "/patients?patientId=a&patientId=b",
        "/centers?centerId=a&centerId=b",
        "/visits?visitId=a&visitId=b",
        "/vitals?patientId=a&patientId=b",
    ] {
        let (status, headers, body) = send_raw(&app, "GET", uri, String::new()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json", "{uri}");
        assert_eq!(body, json!({ "error": "Invalid query string" }), "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        "GET",
        "/patients?patientId=0123456789abcdef0123456789abcdef",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Patient not found" }));

    let (status, _) = send(&app, "GET", "/patients/0123456789abcdef0123456789abcdef", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patient_with_visits_rejects_bad_id() {
    let (status, body) = send(&app(), "GET", "/patients/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid patient ID");
}

#[tokio::test]
async fn test_visit_touches_patient_and_appears_in_patient_view() {
    let app = app();
    let patient = create_patient(&app).await;
    let id = patient["patientId"].as_str().unwrap();

    let (status, visit) = send(
        &app,
        "POST",
        "/visits",
        Some(json!({ "patientId": id, "centerId": "center-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(visit["visitId"].is_string());

    let (status, with_visits) = send(&app, "GET", &format!("/patients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(with_visits["visits"].as_array().unwrap().len(), 1);
    assert_eq!(with_visits["visits"][0]["centerId"], "center-1");
    assert_eq!(with_visits["fullName"], "Juan Pérez");

    let before =
        chrono::DateTime::parse_from_rfc3339(patient["updatedAt"].as_str().unwrap()).unwrap();
    let after =
        chrono::DateTime::parse_from_rfc3339(with_visits["updatedAt"].as_str().unwrap()).unwrap();
    assert!(after >= before);

    let (status, visits) = send(&app, "GET", "/visits", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visits.as_array().unwrap().len(), 1);

    let visit_id = visit["visitId"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/visits?visitId={visit_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, visit);
}

#[tokio::test]
async fn test_visit_for_unknown_patient_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/visits",
        Some(json!({ "patientId": "0123456789abcdef0123456789abcdef", "centerId": "c1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Patient not found");

    let (_, visits) = send(&app, "GET", "/visits", None).await;
    assert_eq!(visits, json!([]));
}

#[tokio::test]
async fn test_vitals_range_query() {
    let app = app();
    for (ts, patient) in [(100, "p1"), (200, "p1"), (300, "p1"), (200, "p2")] {
        let (status, _) = send(
            &app,
            "POST",
            "/vitals",
            Some(json!({ "patientId": patient, "type": "heart-rate", "value": 72, "timestamp": ts })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/vitals?patientId=p1&from=150&to=250", None).await;
    assert_eq!(status, StatusCode::OK);
    let vitals = body.as_array().unwrap();
    assert_eq!(vitals.len(), 1);
    assert_eq!(vitals[0]["type"], "heart-rate");
    assert_eq!(
        chrono::DateTime::parse_from_rfc3339(vitals[0]["timestamp"].as_str().unwrap())
            .unwrap()
            .timestamp_millis(),
        200
    );

    let (_, all) = send(&app, "GET", "/vitals", None).await;
    assert_eq!(all.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_vitals_bad_bounds_and_bodies() {
    let app = app();
    let (status, body) = send(&app, "GET", "/vitals?from=abc&to=250", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid date format");

    let (status, _) = send(
        &app,
        "POST",
        "/vitals",
        Some(json!({ "patientId": "p1", "type": "heart-rate", "value": "72", "timestamp": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_centers_round_trip() {
    let app = app();
    let (status, center) = send(
        &app,
        "POST",
        "/centers",
        Some(json!({ "name": "Hospital Central", "address": "Calle Mayor 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = center["centerId"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/centers?centerId={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, center);

    let (status, body) = send(&app, "GET", "/centers?centerId=missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Medical center not found");
}

#[tokio::test]
async fn test_suggest_diagnoses() {
    let app = app();
    let (status, body) = send(&app, "POST", "/diagnoses", Some(json!({ "patientId": "p1" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "suggestedDiagnoses": "No acute findings." }));

    let (status, _) = send(&app, "POST", "/diagnoses", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_methods_are_405_with_allow_header() {
    let app = app();
    for (method, uri, allow) in [
        ("DELETE", "/patients", "POST, GET"),
        ("PUT", "/visits", "POST, GET"),
        ("PATCH", "/vitals", "POST, GET"),
        ("POST", "/patients/0123456789abcdef0123456789abcdef", "GET"),
        ("GET", "/diagnoses", "POST"),
    ] {
        let (status, headers, body) = send_raw(&app, method, uri, String::new()).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(headers[header::ALLOW], allow, "{method} {uri}");
        assert_eq!(body["error"], format!("Method {method} Not Allowed"));
    }
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(&app(), "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/patients"].is_object());
    assert!(body["paths"]["/diagnoses"].is_object());
}
