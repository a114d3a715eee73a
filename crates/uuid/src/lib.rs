//! Document identifiers and sharded-path utilities.
//!
//! Every document Ward writes (patients, medical centres, visits, vitals) is addressed by a
//! store-generated identifier. To keep identifiers and file locations consistent across the
//! codebase, Ward uses a *canonical* UUID representation: **32 lowercase hexadecimal
//! characters** (no hyphens).
//!
//! This crate provides:
//! - A small wrapper type ([`DocumentId`]) that *guarantees* the canonical format once
//!   constructed.
//! - Sharding logic used by the file-backed document store to derive a document's location.
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! ## Sharded layout
//! For a canonical id `u`, the file store keeps the document at
//! `collection_dir/<u[0..2]>/<u[2..4]>/<u>.json`
//!
//! Example:
//! `patient_data/patients/55/0e/550e8400e29b41d4a716446655440000.json`

mod document_id;

pub use document_id::{DocumentId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
