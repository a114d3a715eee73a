use api_shared::ErrorRes;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ward_core::WardError;

/// An HTTP error answered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Maps a core error onto a status code.
    ///
    /// Client errors keep their message. Anything else becomes a 500 whose body is only
    /// `failure`; the underlying error is logged.
    pub fn from_core(err: WardError, failure: &'static str) -> Self {
        match err {
            WardError::Validation(e) => Self::bad_request(e.to_string()),
            WardError::InvalidId { kind, .. } => {
                Self::bad_request(format!("Invalid {} ID", kind.to_string().to_lowercase()))
            }
            WardError::NotFound { kind, .. } => {
                Self::new(StatusCode::NOT_FOUND, format!("{} not found", kind))
            }
            other => {
                tracing::error!("{}: {:?}", failure, other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, failure)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("rejected request body: {}", rejection.body_text());
        Self::bad_request("Invalid JSON body")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("rejected query string: {}", rejection.body_text());
        Self::bad_request("Invalid query string")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorRes::new(self.message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ward_core::{RecordKind, StoreError, ValidationError};

    #[test]
    fn test_validation_error_is_bad_request_with_message() {
        let err = ApiError::from_core(
            WardError::Validation(ValidationError::Missing("fullName")),
            "Failed to create patient",
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Missing required field: fullName");
    }

    #[test]
    fn test_not_found_names_the_record_kind() {
        let err = ApiError::from_core(
            WardError::not_found(RecordKind::MedicalCenter, "c1"),
            "Failed to retrieve medical centers",
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Medical center not found");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::from_core(
            WardError::Store(StoreError::InvalidId("x".into())),
            "Failed to retrieve visits",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to retrieve visits");
    }

    #[test]
    fn test_query_rejection_is_json_bad_request() {
        #[derive(Debug, serde::Deserialize)]
        struct Lookup {
            #[serde(rename = "patientId")]
            _patient_id: Option<String>,
        }

        let uri: axum::http::Uri = "/vitals?patientId=a&patientId=b".parse().unwrap();
        let rejection = axum::extract::Query::<Lookup>::try_from_uri(&uri)
            .expect_err("a repeated field should be rejected");

        let err = ApiError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Invalid query string");
    }
}
