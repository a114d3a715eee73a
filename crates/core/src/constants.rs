//! Constants used throughout the Ward core crate.

/// Default root directory for the file-backed document store.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// File extension of documents written by the file store.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Extension of the temporary file a document is written to before being renamed into place.
pub const PARTIAL_EXTENSION: &str = "partial";

/// Earliest birth year accepted for a patient.
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// Model used for diagnosis suggestions when `WARD_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Base URL of the generative language API when `WARD_GENERATION_URL` is unset.
pub const DEFAULT_GENERATION_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sample readings returned by the fixed vital-signs source.
pub const SAMPLE_HEART_RATE: f64 = 72.0;
pub const SAMPLE_TEMPERATURE_CELSIUS: f64 = 36.8;
pub const SAMPLE_OXYGEN_SATURATION: f64 = 98.0;
