//! Input validation for records submitted by callers.
//!
//! Each `validate_*` function takes the raw JSON body of a request and either returns the typed,
//! validated record or a [`ValidationError`] naming the first field that failed. Checks are
//! shallow presence/type checks; the only numeric bound is the patient birth year. References
//! between records (a vital's `patientId`, a visit's `centerId`) are never resolved here.

use api_shared::{Contact, PatientStatus, VitalType};
use chrono::{DateTime, Datelike, Utc};
use serde_json::{Map, Value};
use ward_types::NonEmptyText;

use crate::constants::MIN_BIRTH_YEAR;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    Missing(&'static str),
    #[error("Invalid {field}: expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("Invalid {field}: {reason}")]
    OutOfRange { field: &'static str, reason: String },
    #[error("Invalid {field}: unknown value '{value}'")]
    UnknownValue { field: &'static str, value: String },
}

impl ValidationError {
    /// The wire name of the field that failed, if the failure is about a field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::Missing(field)
            | ValidationError::WrongType { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::UnknownValue { field, .. } => Some(field),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validated patient fields, ready to be stamped and persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub full_name: NonEmptyText,
    pub birth_year: i32,
    pub document_type: NonEmptyText,
    pub document_number: NonEmptyText,
    pub medical_history: Option<String>,
    pub contact: Option<Contact>,
    pub status: PatientStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMedicalCenter {
    pub name: NonEmptyText,
    pub address: NonEmptyText,
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVital {
    pub patient_id: NonEmptyText,
    pub kind: VitalType,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub patient_id: NonEmptyText,
    pub center_id: NonEmptyText,
}

/// Field accessor over a JSON object that reports failures by wire field name.
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    fn of(value: &'a Value) -> ValidationResult<Self> {
        value.as_object().map(Fields).ok_or(ValidationError::NotAnObject)
    }

    /// Absent and `null` are treated alike.
    fn get(&self, field: &'static str) -> Option<&'a Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    fn required_text(&self, field: &'static str) -> ValidationResult<NonEmptyText> {
        let value = self.get(field).ok_or(ValidationError::Missing(field))?;
        let text = value.as_str().ok_or(ValidationError::WrongType {
            field,
            expected: "a string",
        })?;
        NonEmptyText::new(text).map_err(|_| ValidationError::Missing(field))
    }

    fn optional_string(&self, field: &'static str) -> ValidationResult<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ValidationError::WrongType {
                field,
                expected: "a string",
            }),
        }
    }

    fn required_number(&self, field: &'static str) -> ValidationResult<f64> {
        self.get(field)
            .ok_or(ValidationError::Missing(field))?
            .as_f64()
            .ok_or(ValidationError::WrongType {
                field,
                expected: "a number",
            })
    }

    fn required_integer(&self, field: &'static str) -> ValidationResult<i64> {
        let value = self.get(field).ok_or(ValidationError::Missing(field))?;
        let wrong_type = ValidationError::WrongType {
            field,
            expected: "an integer",
        };
        if let Some(n) = value.as_i64() {
            return Ok(n);
        }
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                Ok(f as i64)
            }
            _ => Err(wrong_type),
        }
    }

    fn optional_contact(&self, field: &'static str) -> ValidationResult<Option<Contact>> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let inner = value.as_object().map(Fields).ok_or(ValidationError::WrongType {
            field,
            expected: "an object",
        })?;
        Ok(Some(Contact {
            phone: inner.optional_string("phone")?,
            email: inner.optional_string("email")?,
            address: inner.optional_string("address")?,
        }))
    }
}

/// Checks that `year` lies in `MIN_BIRTH_YEAR..=current_year`.
pub fn check_birth_year(year: i64, current_year: i32) -> ValidationResult<i32> {
    if year < i64::from(MIN_BIRTH_YEAR) || year > i64::from(current_year) {
        return Err(ValidationError::OutOfRange {
            field: "birthYear",
            reason: format!("must be between {} and {}", MIN_BIRTH_YEAR, current_year),
        });
    }
    Ok(year as i32)
}

/// Validates a patient body (`POST /patients`).
pub fn validate_patient(body: &Value) -> ValidationResult<NewPatient> {
    validate_patient_in_year(body, Utc::now().year())
}

/// Same as [`validate_patient`], with the upper birth-year bound supplied by the caller.
pub fn validate_patient_in_year(body: &Value, current_year: i32) -> ValidationResult<NewPatient> {
    let fields = Fields::of(body)?;

    let full_name = fields.required_text("fullName")?;
    let birth_year = check_birth_year(fields.required_integer("birthYear")?, current_year)?;
    let document_type = fields.required_text("documentType")?;
    let document_number = fields.required_text("documentNumber")?;
    let medical_history = fields.optional_string("medicalHistory")?;
    let contact = fields.optional_contact("contact")?;
    let status = validate_status(fields.required_text("status")?.as_str())?;

    Ok(NewPatient {
        full_name,
        birth_year,
        document_type,
        document_number,
        medical_history,
        contact,
        status,
    })
}

/// Parses a status label against the fixed list.
pub fn validate_status(label: &str) -> ValidationResult<PatientStatus> {
    label
        .parse::<PatientStatus>()
        .map_err(|e| ValidationError::UnknownValue {
            field: "status",
            value: e.0,
        })
}

/// Validates a medical centre body (`POST /centers`).
pub fn validate_medical_center(body: &Value) -> ValidationResult<NewMedicalCenter> {
    let fields = Fields::of(body)?;

    Ok(NewMedicalCenter {
        name: fields.required_text("name")?,
        address: fields.required_text("address")?,
        contact: fields.optional_contact("contact")?,
    })
}

/// Validates a vital body (`POST /vitals`). `timestamp` is epoch milliseconds.
pub fn validate_vital(body: &Value) -> ValidationResult<NewVital> {
    let fields = Fields::of(body)?;

    let patient_id = fields.required_text("patientId")?;
    let kind_label = fields.required_text("type")?;
    let kind = kind_label
        .as_str()
        .parse::<VitalType>()
        .map_err(|e| ValidationError::UnknownValue {
            field: "type",
            value: e.0,
        })?;
    let value = fields.required_number("value")?;
    let millis = fields.required_integer("timestamp")?;
    let timestamp = DateTime::from_timestamp_millis(millis).ok_or(ValidationError::OutOfRange {
        field: "timestamp",
        reason: "not a representable instant".into(),
    })?;

    Ok(NewVital {
        patient_id,
        kind,
        value,
        timestamp,
    })
}

/// Validates a visit body (`POST /visits`).
pub fn validate_visit(body: &Value) -> ValidationResult<NewVisit> {
    let fields = Fields::of(body)?;

    Ok(NewVisit {
        patient_id: fields.required_text("patientId")?,
        center_id: fields.required_text("centerId")?,
    })
}

/// Validates a diagnosis request body (`POST /diagnoses`) and returns the patient id.
pub fn validate_diagnosis_request(body: &Value) -> ValidationResult<NonEmptyText> {
    Fields::of(body)?.required_text("patientId")
}
