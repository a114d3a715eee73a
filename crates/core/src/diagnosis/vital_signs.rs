//! Where the diagnosis flow gets a patient's current vitals from.

use api_shared::VitalType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::{SAMPLE_HEART_RATE, SAMPLE_OXYGEN_SATURATION, SAMPLE_TEMPERATURE_CELSIUS};
use crate::error::{WardError, WardResult};
use crate::repositories::VitalService;

/// The three figures the diagnosis prompt is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    /// Beats per minute.
    pub heart_rate: f64,
    pub temperature_celsius: f64,
    /// Percent.
    pub oxygen_saturation: f64,
}

#[async_trait]
pub trait VitalSignsSource: Send + Sync {
    async fn current(&self, patient_id: &str) -> WardResult<VitalSigns>;
}

/// Returns the same sample figures for every patient.
#[derive(Debug, Clone, Copy)]
pub struct FixedVitalSigns {
    signs: VitalSigns,
}

impl FixedVitalSigns {
    pub fn new(signs: VitalSigns) -> Self {
        Self { signs }
    }
}

impl Default for FixedVitalSigns {
    fn default() -> Self {
        Self::new(VitalSigns {
            heart_rate: SAMPLE_HEART_RATE,
            temperature_celsius: SAMPLE_TEMPERATURE_CELSIUS,
            oxygen_saturation: SAMPLE_OXYGEN_SATURATION,
        })
    }
}

#[async_trait]
impl VitalSignsSource for FixedVitalSigns {
    async fn current(&self, _patient_id: &str) -> WardResult<VitalSigns> {
        Ok(self.signs)
    }
}

/// Reads the latest stored heart-rate, temperature and oxygen-saturation readings.
#[derive(Clone)]
pub struct StoredVitalSigns {
    vitals: VitalService,
}

impl StoredVitalSigns {
    pub fn new(vitals: VitalService) -> Self {
        Self { vitals }
    }
}

#[async_trait]
impl VitalSignsSource for StoredVitalSigns {
    async fn current(&self, patient_id: &str) -> WardResult<VitalSigns> {
        let latest = self.vitals.latest(patient_id).await?;
        let reading = |kind: VitalType| {
            latest.get(&kind).map(|vital| vital.value).ok_or_else(|| {
                WardError::VitalSigns(format!("no {} reading for patient {}", kind, patient_id))
            })
        };

        Ok(VitalSigns {
            heart_rate: reading(VitalType::HeartRate)?,
            temperature_celsius: reading(VitalType::Temperature)?,
            oxygen_saturation: reading(VitalType::OxygenSaturation)?,
        })
    }
}
