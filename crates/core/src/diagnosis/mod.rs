//! Diagnosis suggestions.
//!
//! The flow is a single schema-constrained model call:
//!
//! 1. fetch the patient's current vitals from a [`VitalSignsSource`]
//! 2. render the prompt with the patient id and the three figures
//! 3. ask the [`GenerationService`] for an object with one string field, `suggestedDiagnoses`
//! 4. hand that field back unchanged
//!
//! There are no retries and nothing is cached. The suggestion is advisory text for a clinician
//! and is never persisted.

mod generation;
mod prompt;
mod vital_signs;

pub use generation::{GeminiGenerator, GenerationError, GenerationService};
pub use prompt::{output_schema, render};
pub use vital_signs::{FixedVitalSigns, StoredVitalSigns, VitalSigns, VitalSignsSource};

use api_shared::SuggestDiagnosesRes;
use std::sync::Arc;
use ward_types::NonEmptyText;

use crate::error::WardResult;

#[derive(Clone)]
pub struct DiagnosisService {
    vital_signs: Arc<dyn VitalSignsSource>,
    generator: Arc<dyn GenerationService>,
}

impl DiagnosisService {
    pub fn new(
        vital_signs: Arc<dyn VitalSignsSource>,
        generator: Arc<dyn GenerationService>,
    ) -> Self {
        Self {
            vital_signs,
            generator,
        }
    }

    pub async fn suggest(&self, patient_id: &NonEmptyText) -> WardResult<SuggestDiagnosesRes> {
        let signs = self.vital_signs.current(patient_id.as_str()).await?;
        let prompt = render(patient_id.as_str(), &signs);

        tracing::debug!(
            patient_id = %patient_id,
            generator = self.generator.name(),
            "requesting diagnosis suggestion"
        );
        let output = self.generator.generate(&prompt, &output_schema()).await?;
        let suggestion: SuggestDiagnosesRes = serde_json::from_value(output)
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        Ok(suggestion)
    }
}
