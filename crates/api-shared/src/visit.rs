use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use ward_types::NonEmptyText;
use ward_uuid::DocumentId;

/// Join record linking a patient to a medical centre for one encounter.
///
/// Neither reference is enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[schema(value_type = String)]
    pub visit_id: DocumentId,
    #[schema(value_type = String)]
    pub patient_id: NonEmptyText,
    #[schema(value_type = String)]
    pub center_id: NonEmptyText,
}
