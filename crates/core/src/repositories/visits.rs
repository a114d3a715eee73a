//! Visit records.
//!
//! Recording a visit has a side effect: the referenced patient's `updatedAt` moves forward. The
//! store has no multi-document transactions, so the two writes are ordered and compensated:
//!
//! 1. the patient is read (a missing patient aborts before anything is written)
//! 2. the visit document is written
//! 3. the patient's `updatedAt` is merged
//! 4. if step 3 fails, the visit written in step 2 is deleted again
//!
//! If the compensating delete also fails the caller gets [`WardError::CompensationFailed`],
//! which names the orphaned visit.

use api_shared::Visit;
use std::sync::Arc;

use super::patients::PatientService;
use super::shared::{load, load_all, save};
use crate::error::{RecordKind, WardError, WardResult};
use crate::store::{Collection, DocumentStore, Filter};
use crate::validation::NewVisit;

#[derive(Clone)]
pub struct VisitService {
    store: Arc<dyn DocumentStore>,
    patients: PatientService,
}

impl VisitService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let patients = PatientService::new(store.clone());
        Self { store, patients }
    }

    /// Records a visit and touches the referenced patient.
    ///
    /// # Errors
    ///
    /// - [`WardError::NotFound`] if the referenced patient does not exist (nothing is written)
    /// - [`WardError::CompensationFailed`] if the touch failed and the visit could not be removed
    /// - any store error from writing the visit or touching the patient
    pub async fn create(&self, new: NewVisit) -> WardResult<Visit> {
        let patient = self.patients.get(new.patient_id.as_str()).await?;

        let visit = Visit {
            visit_id: self.store.generate_id(),
            patient_id: new.patient_id,
            center_id: new.center_id,
        };
        let visit_id = visit.visit_id.to_string();
        save(self.store.as_ref(), Collection::Visits, &visit_id, &visit).await?;

        if let Err(touch_error) = self.patients.touch(&patient).await {
            tracing::warn!(
                visit_id = %visit_id,
                "touching patient failed, removing visit: {}",
                touch_error
            );
            return match self.store.delete(Collection::Visits, &visit_id).await {
                Ok(()) => Err(touch_error),
                Err(cleanup_error) => Err(WardError::CompensationFailed {
                    visit_id,
                    touch_error: Box::new(touch_error),
                    cleanup_error,
                }),
            };
        }

        tracing::info!(
            visit_id = %visit_id,
            patient_id = %visit.patient_id,
            center_id = %visit.center_id,
            "visit recorded"
        );
        Ok(visit)
    }

    pub async fn get(&self, visit_id: &str) -> WardResult<Visit> {
        load(self.store.as_ref(), Collection::Visits, visit_id)
            .await?
            .ok_or_else(|| WardError::not_found(RecordKind::Visit, visit_id))
    }

    pub async fn list(&self) -> WardResult<Vec<Visit>> {
        load_all(self.store.as_ref(), Collection::Visits, &[]).await
    }

    /// Visits referencing `patient_id`. An unknown patient simply has none.
    pub async fn list_for_patient(&self, patient_id: &str) -> WardResult<Vec<Visit>> {
        load_all(
            self.store.as_ref(),
            Collection::Visits,
            &[Filter::eq("patientId", patient_id)],
        )
        .await
    }

    /// Re-points an existing visit. Does not touch either patient.
    pub async fn replace(&self, visit_id: &str, new: NewVisit) -> WardResult<Visit> {
        let existing = self.get(visit_id).await?;
        let visit = Visit {
            visit_id: existing.visit_id,
            patient_id: new.patient_id,
            center_id: new.center_id,
        };
        save(self.store.as_ref(), Collection::Visits, visit_id, &visit).await?;
        Ok(visit)
    }
}
