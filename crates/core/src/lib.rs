//! # Ward Core
//!
//! Core business logic for the Ward patient dashboard.
//!
//! This crate contains validation, data access and the diagnosis-suggestion flow:
//! - [`validation`]: request body checks producing typed `New*` records
//! - [`store`]: the [`DocumentStore`] abstraction with in-memory and file-backed stores
//! - [`repositories`]: one service per collection (patients, centers, visits, vitals)
//! - [`diagnosis`]: vitals → prompt → hosted model → `suggestedDiagnoses`
//!
//! **No API concerns**: HTTP routing, status codes and OpenAPI belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod diagnosis;
pub mod error;
pub mod repositories;
pub mod store;
pub mod validation;

pub use config::{CoreConfig, GenerationConfig, StoreBackend, VitalSignsMode};
pub use diagnosis::{DiagnosisService, GeminiGenerator, GenerationError, GenerationService};
pub use error::{RecordKind, WardError, WardResult};
pub use repositories::{CenterService, PatientService, VisitService, VitalQuery, VitalService};
pub use store::{DocumentStore, FileStore, MemoryStore, StoreError};
pub use validation::ValidationError;

use diagnosis::{FixedVitalSigns, StoredVitalSigns, VitalSignsSource};
use std::sync::Arc;

/// Every core service, wired to one shared store.
#[derive(Clone)]
pub struct Services {
    pub patients: PatientService,
    pub centers: CenterService,
    pub visits: VisitService,
    pub vitals: VitalService,
    pub diagnosis: DiagnosisService,
}

impl Services {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        vital_signs: VitalSignsMode,
        generator: Arc<dyn GenerationService>,
    ) -> Self {
        let vitals = VitalService::new(store.clone());
        let source: Arc<dyn VitalSignsSource> = match vital_signs {
            VitalSignsMode::Fixed => Arc::new(FixedVitalSigns::default()),
            VitalSignsMode::Stored => Arc::new(StoredVitalSigns::new(vitals.clone())),
        };

        Self {
            patients: PatientService::new(store.clone()),
            centers: CenterService::new(store.clone()),
            visits: VisitService::new(store),
            vitals,
            diagnosis: DiagnosisService::new(source, generator),
        }
    }

    /// Opens the configured store and builds the Gemini client.
    ///
    /// # Errors
    ///
    /// Returns [`WardError::Store`] if the file store's directories cannot be created.
    pub fn from_config(config: &CoreConfig) -> WardResult<Self> {
        let store: Arc<dyn DocumentStore> = match config.store() {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::File(root) => Arc::new(FileStore::open(root)?),
        };
        let generation = config.generation();
        let generator = Arc::new(GeminiGenerator::new(
            generation.api_key(),
            generation.model(),
            generation.base_url(),
        ));

        Ok(Self::new(store, config.vital_signs(), generator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate_patient, validate_visit, validate_vital};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    struct EchoGenerator;

    #[async_trait]
    impl GenerationService for EchoGenerator {
        async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Value, GenerationError> {
            Ok(json!({ "suggestedDiagnoses": prompt.lines().find(|l| l.contains("Heart rate")) }))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_services_share_one_store() {
        let services = Services::new(
            Arc::new(MemoryStore::new()),
            VitalSignsMode::Stored,
            Arc::new(EchoGenerator),
        );

        let patient = services
            .patients
            .create(
                validate_patient(&json!({
                    "fullName": "Juan Pérez",
                    "birthYear": 1980,
                    "documentType": "DNI",
                    "documentNumber": "12345678A",
                    "status": "En espera"
                }))
                .unwrap(),
            )
            .await
            .expect("create should succeed");
        let id = patient.patient_id.to_string();

        services
            .visits
            .create(validate_visit(&json!({ "patientId": id, "centerId": "c1" })).unwrap())
            .await
            .expect("visit should succeed");
        for (kind, value) in [("heart-rate", 80), ("temperature", 37), ("oxygen-saturation", 96)] {
            services
                .vitals
                .create(
                    validate_vital(&json!({
                        "patientId": id,
                        "type": kind,
                        "value": value,
                        "timestamp": 1_700_000_000_000i64
                    }))
                    .unwrap(),
                )
                .await
                .unwrap();
        }

        let with_visits = services.patients.get_with_visits(&id).await.unwrap();
        assert_eq!(with_visits.visits.len(), 1);

        let suggestion = services
            .diagnosis
            .suggest(&id.parse().unwrap())
            .await
            .expect("suggest should succeed");
        assert_eq!(
            suggestion.suggested_diagnoses,
            "Current Vital Signs: Heart rate: 80 bpm, Temperature: 37 °C, Oxygen saturation: 96 %"
        );
    }

    #[test]
    fn test_from_config_opens_file_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = CoreConfig::new(
            StoreBackend::File(temp_dir.path().join("data")),
            VitalSignsMode::Fixed,
            config::generation_config_from_env_values(Some("key".into()), None, None).unwrap(),
        );

        Services::from_config(&config).expect("services should build");
        assert!(temp_dir.path().join("data").join("patients").is_dir());
    }
}
