use api_shared::MedicalCenter;
use chrono::Utc;
use std::sync::Arc;

use super::shared::{load, load_all, next_update_time, save};
use crate::error::{RecordKind, WardError, WardResult};
use crate::store::{Collection, DocumentStore};
use crate::validation::NewMedicalCenter;

/// Medical centres, stored in the `centers` collection.
#[derive(Clone)]
pub struct CenterService {
    store: Arc<dyn DocumentStore>,
}

impl CenterService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewMedicalCenter) -> WardResult<MedicalCenter> {
        let now = Utc::now();
        let center = MedicalCenter {
            center_id: self.store.generate_id(),
            name: new.name,
            address: new.address,
            contact: new.contact,
            created_at: now,
            updated_at: now,
        };

        let id = center.center_id.to_string();
        save(self.store.as_ref(), Collection::Centers, &id, &center).await?;
        tracing::info!(center_id = %id, name = %center.name, "medical center created");

        Ok(center)
    }

    pub async fn get(&self, center_id: &str) -> WardResult<MedicalCenter> {
        load(self.store.as_ref(), Collection::Centers, center_id)
            .await?
            .ok_or_else(|| WardError::not_found(RecordKind::MedicalCenter, center_id))
    }

    pub async fn list(&self) -> WardResult<Vec<MedicalCenter>> {
        load_all(self.store.as_ref(), Collection::Centers, &[]).await
    }

    pub async fn replace(
        &self,
        center_id: &str,
        new: NewMedicalCenter,
    ) -> WardResult<MedicalCenter> {
        let existing = self.get(center_id).await?;
        let center = MedicalCenter {
            center_id: existing.center_id,
            name: new.name,
            address: new.address,
            contact: new.contact,
            created_at: existing.created_at,
            updated_at: next_update_time(existing.updated_at),
        };
        save(self.store.as_ref(), Collection::Centers, center_id, &center).await?;
        Ok(center)
    }
}
