//! Patient documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use ward_types::NonEmptyText;
use ward_uuid::DocumentId;

use crate::visit::Visit;

/// Where a patient currently is in the hospital flow.
///
/// The wire value is the label shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PatientStatus {
    #[serde(rename = "En espera")]
    Waiting,
    #[serde(rename = "Pre-cirugía")]
    PreSurgery,
    #[serde(rename = "En Cirugía")]
    InSurgery,
    #[serde(rename = "Post-cirugía")]
    PostSurgery,
    #[serde(rename = "De alta")]
    Discharged,
    #[serde(rename = "Visto/Consulta Finalizada")]
    ConsultationFinished,
    #[serde(rename = "Telemedicina")]
    Telemedicine,
}

impl PatientStatus {
    pub const ALL: [PatientStatus; 7] = [
        PatientStatus::Waiting,
        PatientStatus::PreSurgery,
        PatientStatus::InSurgery,
        PatientStatus::PostSurgery,
        PatientStatus::Discharged,
        PatientStatus::ConsultationFinished,
        PatientStatus::Telemedicine,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PatientStatus::Waiting => "En espera",
            PatientStatus::PreSurgery => "Pre-cirugía",
            PatientStatus::InSurgery => "En Cirugía",
            PatientStatus::PostSurgery => "Post-cirugía",
            PatientStatus::Discharged => "De alta",
            PatientStatus::ConsultationFinished => "Visto/Consulta Finalizada",
            PatientStatus::Telemedicine => "Telemedicina",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a string is not one of the known status labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown patient status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for PatientStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientStatus::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Optional contact sub-record. Each field is optional on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A patient as stored in the `patients` collection and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[schema(value_type = String)]
    pub patient_id: DocumentId,
    #[schema(value_type = String)]
    pub full_name: NonEmptyText,
    pub birth_year: i32,
    #[schema(value_type = String)]
    pub document_type: NonEmptyText,
    #[schema(value_type = String)]
    pub document_number: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    pub status: PatientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `GET /patients/{id}` body: the patient plus every visit that references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientWithVisits {
    #[serde(flatten)]
    pub patient: Patient,
    pub visits: Vec<Visit>,
}
