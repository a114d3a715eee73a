//! Data access layer.
//!
//! One service per collection. Every service wraps a shared `Arc<dyn DocumentStore>` and offers
//! create, get-by-id, list/query and whole-record update; patients additionally support the
//! status merge and the `updatedAt` touch performed when a visit is recorded.

pub mod centers;
pub mod patients;
pub(crate) mod shared;
pub mod visits;
pub mod vitals;

pub use centers::CenterService;
pub use patients::PatientService;
pub use visits::VisitService;
pub use vitals::{VitalQuery, VitalService};
