use std::fmt;

use crate::diagnosis::GenerationError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Patient,
    MedicalCenter,
    Visit,
    Vital,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Patient => "Patient",
            RecordKind::MedicalCenter => "Medical center",
            RecordKind::Visit => "Visit",
            RecordKind::Vital => "Vital",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid {kind} id: {source}")]
    InvalidId {
        kind: RecordKind,
        #[source]
        source: ward_uuid::UuidError,
    },
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },
    #[error("document store error: {0}")]
    Store(#[from] StoreError),
    #[error(
        "patient touch failed and removing visit {visit_id} also failed: touch={touch_error}; cleanup={cleanup_error}"
    )]
    CompensationFailed {
        visit_id: String,
        #[source]
        touch_error: Box<WardError>,
        cleanup_error: StoreError,
    },
    #[error("vital signs unavailable: {0}")]
    VitalSigns(String),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl WardError {
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        WardError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type WardResult<T> = std::result::Result<T, WardError>;
