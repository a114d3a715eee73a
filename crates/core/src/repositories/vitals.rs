//! Vital-sign records.
//!
//! Vitals reference a patient by id only; the reference is never checked, so readings can be
//! ingested for a patient before (or without) a patient record existing.

use api_shared::{Vital, VitalType};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use super::shared::{load, load_all, next_update_time, save, timestamp_value};
use crate::error::{RecordKind, WardError, WardResult};
use crate::store::{Collection, DocumentStore, Filter};
use crate::validation::NewVital;

/// Filters for [`VitalService::query`].
///
/// Every field is optional and all present fields must match. `from` and `to` are inclusive
/// bounds on the measurement `timestamp` and may be given independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitalQuery {
    pub patient_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl VitalQuery {
    pub fn for_patient(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            ..Self::default()
        }
    }

    fn filters(&self) -> WardResult<Vec<Filter>> {
        let mut filters = Vec::new();
        if let Some(patient_id) = &self.patient_id {
            filters.push(Filter::eq("patientId", patient_id.as_str()));
        }
        if let Some(from) = self.from {
            filters.push(Filter::gte("timestamp", timestamp_value(from)?));
        }
        if let Some(to) = self.to {
            filters.push(Filter::lte("timestamp", timestamp_value(to)?));
        }
        Ok(filters)
    }
}

#[derive(Clone)]
pub struct VitalService {
    store: Arc<dyn DocumentStore>,
}

impl VitalService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewVital) -> WardResult<Vital> {
        let now = Utc::now();
        let vital = Vital {
            id: self.store.generate_id(),
            patient_id: new.patient_id,
            kind: new.kind,
            value: new.value,
            timestamp: new.timestamp,
            created_at: now,
            updated_at: now,
        };

        let id = vital.id.to_string();
        save(self.store.as_ref(), Collection::Vitals, &id, &vital).await?;
        tracing::debug!(vital_id = %id, kind = %vital.kind, "vital recorded");

        Ok(vital)
    }

    pub async fn get(&self, vital_id: &str) -> WardResult<Vital> {
        load(self.store.as_ref(), Collection::Vitals, vital_id)
            .await?
            .ok_or_else(|| WardError::not_found(RecordKind::Vital, vital_id))
    }

    /// Returns matching vitals ordered by measurement time, oldest first.
    pub async fn query(&self, query: &VitalQuery) -> WardResult<Vec<Vital>> {
        let mut vitals: Vec<Vital> =
            load_all(self.store.as_ref(), Collection::Vitals, &query.filters()?).await?;
        vitals.sort_by_key(|vital| vital.timestamp);
        Ok(vitals)
    }

    /// The most recent reading of each kind recorded for a patient.
    pub async fn latest(&self, patient_id: &str) -> WardResult<HashMap<VitalType, Vital>> {
        let mut latest: HashMap<VitalType, Vital> = HashMap::new();
        for vital in self.query(&VitalQuery::for_patient(patient_id)).await? {
            // query() is sorted ascending, so later entries win.
            latest.insert(vital.kind, vital);
        }
        Ok(latest)
    }

    pub async fn replace(&self, vital_id: &str, new: NewVital) -> WardResult<Vital> {
        let existing = self.get(vital_id).await?;
        let vital = Vital {
            id: existing.id,
            patient_id: new.patient_id,
            kind: new.kind,
            value: new.value,
            timestamp: new.timestamp,
            created_at: existing.created_at,
            updated_at: next_update_time(existing.updated_at),
        };
        save(self.store.as_ref(), Collection::Vitals, vital_id, &vital).await?;
        Ok(vital)
    }
}
