//! # API Shared
//!
//! Shared wire types and services for the Ward APIs.
//!
//! Contains:
//! - The JSON document/response types for patients, medical centres, visits and vitals
//! - Diagnosis request/response bodies
//! - Shared services like `HealthService`
//!
//! The same types are what `ward-core` persists in the document store, so a stored document and
//! the body returned by the REST API are always the same shape. Field names are camelCase on the
//! wire.

pub mod center;
pub mod diagnosis;
pub mod health;
pub mod patient;
pub mod responses;
pub mod visit;
pub mod vital;

pub use center::MedicalCenter;
pub use diagnosis::{SuggestDiagnosesReq, SuggestDiagnosesRes};
pub use health::HealthService;
pub use patient::{Contact, Patient, PatientStatus, PatientWithVisits, UnknownStatus};
pub use responses::{ErrorRes, HealthRes};
pub use visit::Visit;
pub use vital::{UnknownVitalType, Vital, VitalType};
