//! Patient records.
//!
//! Patients live in the `patients` collection keyed by a store-generated [`DocumentId`]. The
//! stored document is the [`Patient`] wire type itself, including its own `patientId`.

use api_shared::{Patient, PatientStatus, PatientWithVisits, Visit};
use chrono::{DateTime, Utc};
use serde_json::Map;
use std::sync::Arc;
use ward_uuid::DocumentId;

use super::shared::{load, load_all, next_update_time, save, timestamp_value};
use crate::error::{RecordKind, WardError, WardResult};
use crate::store::{Collection, DocumentStore, Filter, StoreError};
use crate::validation::NewPatient;

#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn DocumentStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persists a validated patient under a fresh id, with `createdAt == updatedAt`.
    pub async fn create(&self, new: NewPatient) -> WardResult<Patient> {
        let now = Utc::now();
        let patient = Patient {
            patient_id: self.store.generate_id(),
            full_name: new.full_name,
            birth_year: new.birth_year,
            document_type: new.document_type,
            document_number: new.document_number,
            medical_history: new.medical_history,
            contact: new.contact,
            status: new.status,
            created_at: now,
            updated_at: now,
        };

        let id = patient.patient_id.to_string();
        save(self.store.as_ref(), Collection::Patients, &id, &patient).await?;
        tracing::info!(patient_id = %id, "patient created");

        Ok(patient)
    }

    /// # Errors
    ///
    /// Returns [`WardError::NotFound`] if no patient has this id.
    pub async fn get(&self, patient_id: &str) -> WardResult<Patient> {
        load(self.store.as_ref(), Collection::Patients, patient_id)
            .await?
            .ok_or_else(|| WardError::not_found(RecordKind::Patient, patient_id))
    }

    pub async fn list(&self) -> WardResult<Vec<Patient>> {
        load_all(self.store.as_ref(), Collection::Patients, &[]).await
    }

    /// Returns the patient together with every visit that references it.
    ///
    /// # Errors
    ///
    /// - [`WardError::InvalidId`] if `patient_id` is not a canonical document id
    /// - [`WardError::NotFound`] if no patient has this id
    pub async fn get_with_visits(&self, patient_id: &str) -> WardResult<PatientWithVisits> {
        let id = DocumentId::parse(patient_id).map_err(|source| WardError::InvalidId {
            kind: RecordKind::Patient,
            source,
        })?;
        let patient = self.get(&id.to_string()).await?;
        let visits: Vec<Visit> = load_all(
            self.store.as_ref(),
            Collection::Visits,
            &[Filter::eq("patientId", id.to_string())],
        )
        .await?;

        Ok(PatientWithVisits { patient, visits })
    }

    /// Replaces every submitted field of an existing patient.
    ///
    /// The id and `createdAt` are kept; `updatedAt` moves forward.
    pub async fn replace(&self, patient_id: &str, new: NewPatient) -> WardResult<Patient> {
        let existing = self.get(patient_id).await?;
        let patient = Patient {
            patient_id: existing.patient_id,
            full_name: new.full_name,
            birth_year: new.birth_year,
            document_type: new.document_type,
            document_number: new.document_number,
            medical_history: new.medical_history,
            contact: new.contact,
            status: new.status,
            created_at: existing.created_at,
            updated_at: next_update_time(existing.updated_at),
        };

        save(self.store.as_ref(), Collection::Patients, patient_id, &patient).await?;
        Ok(patient)
    }

    /// Partially updates `status` (and `updatedAt`) without rewriting the rest of the record.
    pub async fn update_status(
        &self,
        patient_id: &str,
        status: PatientStatus,
    ) -> WardResult<Patient> {
        let existing = self.get(patient_id).await?;
        let updated_at = next_update_time(existing.updated_at);

        let mut fields = Map::new();
        fields.insert(
            "status".into(),
            serde_json::to_value(status).map_err(StoreError::Serialization)?,
        );
        fields.insert("updatedAt".into(), timestamp_value(updated_at)?);
        self.update_fields(patient_id, fields).await?;

        tracing::info!(patient_id, %status, "patient status updated");
        Ok(Patient {
            status,
            updated_at,
            ..existing
        })
    }

    /// Moves the patient's `updatedAt` forward. Used as the side effect of recording a visit.
    pub(crate) async fn touch(&self, patient: &Patient) -> WardResult<DateTime<Utc>> {
        let updated_at = next_update_time(patient.updated_at);
        let mut fields = Map::new();
        fields.insert("updatedAt".into(), timestamp_value(updated_at)?);
        self.update_fields(&patient.patient_id.to_string(), fields)
            .await?;
        Ok(updated_at)
    }

    async fn update_fields(
        &self,
        patient_id: &str,
        fields: Map<String, serde_json::Value>,
    ) -> WardResult<()> {
        match self
            .store
            .update(Collection::Patients, patient_id, fields)
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                Err(WardError::not_found(RecordKind::Patient, patient_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
