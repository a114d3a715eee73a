//! Vital-sign documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use ward_types::NonEmptyText;
use ward_uuid::DocumentId;

/// The kinds of measurement a vital can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum VitalType {
    HeartRate,
    OxygenSaturation,
    Temperature,
    BloodPressure,
    Glucose,
}

impl VitalType {
    pub const ALL: [VitalType; 5] = [
        VitalType::HeartRate,
        VitalType::OxygenSaturation,
        VitalType::Temperature,
        VitalType::BloodPressure,
        VitalType::Glucose,
    ];

    /// Wire name, e.g. `heart-rate`.
    pub fn as_str(self) -> &'static str {
        match self {
            VitalType::HeartRate => "heart-rate",
            VitalType::OxygenSaturation => "oxygen-saturation",
            VitalType::Temperature => "temperature",
            VitalType::BloodPressure => "blood-pressure",
            VitalType::Glucose => "glucose",
        }
    }
}

impl fmt::Display for VitalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVitalType(pub String);

impl fmt::Display for UnknownVitalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown vital type '{}'", self.0)
    }
}

impl std::error::Error for UnknownVitalType {}

impl FromStr for VitalType {
    type Err = UnknownVitalType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VitalType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVitalType(s.to_string()))
    }
}

/// A single timestamped measurement as stored in the `vitals` collection.
///
/// `patient_id` is a plain reference; it is never checked against the patients collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vital {
    #[schema(value_type = String)]
    pub id: DocumentId,
    #[schema(value_type = String)]
    pub patient_id: NonEmptyText,
    #[serde(rename = "type")]
    pub kind: VitalType,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
