//! # API REST
//!
//! REST API implementation for Ward.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (status codes, `Allow` headers, CORS, request tracing)
//!
//! Uses `api-shared` for wire types and `ward-core` for everything behind the handlers.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use ward_core::Services;

use handlers::method_not_allowed;

pub use error::{ApiError, ApiResult};

/// Application state for the REST API server.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::create_patient,
        handlers::list_patients,
        handlers::get_patient_with_visits,
        handlers::create_center,
        handlers::list_centers,
        handlers::create_visit,
        handlers::list_visits,
        handlers::create_vital,
        handlers::list_vitals,
        handlers::suggest_diagnoses,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::Contact,
        api_shared::PatientStatus,
        api_shared::Patient,
        api_shared::PatientWithVisits,
        api_shared::MedicalCenter,
        api_shared::Visit,
        api_shared::VitalType,
        api_shared::Vital,
        api_shared::SuggestDiagnosesReq,
        api_shared::SuggestDiagnosesRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full REST router: API routes, Swagger UI, CORS and request tracing.
pub fn router(services: Services) -> Router {
    const COLLECTION: &str = "POST, GET";

    Router::new()
        .route(
            "/health",
            get(handlers::health).fallback(|method: Method| method_not_allowed(method, "GET")),
        )
        .route(
            "/patients",
            get(handlers::list_patients)
                .post(handlers::create_patient)
                .fallback(|method: Method| method_not_allowed(method, COLLECTION)),
        )
        .route(
            "/patients/:id",
            get(handlers::get_patient_with_visits)
                .fallback(|method: Method| method_not_allowed(method, "GET")),
        )
        .route(
            "/centers",
            get(handlers::list_centers)
                .post(handlers::create_center)
                .fallback(|method: Method| method_not_allowed(method, COLLECTION)),
        )
        .route(
            "/visits",
            get(handlers::list_visits)
                .post(handlers::create_visit)
                .fallback(|method: Method| method_not_allowed(method, COLLECTION)),
        )
        .route(
            "/vitals",
            get(handlers::list_vitals)
                .post(handlers::create_vital)
                .fallback(|method: Method| method_not_allowed(method, COLLECTION)),
        )
        .route(
            "/diagnoses",
            post(handlers::suggest_diagnoses)
                .fallback(|method: Method| method_not_allowed(method, "POST")),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { services })
}
