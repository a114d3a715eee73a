use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /diagnoses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestDiagnosesReq {
    /// The ID of the patient to analyse.
    pub patient_id: String,
}

/// Structured output requested from the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestDiagnosesRes {
    /// Potential diagnoses or risk factors, as one paragraph.
    pub suggested_diagnoses: String,
}
