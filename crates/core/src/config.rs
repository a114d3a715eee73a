//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables. The parsing helpers take
//! already-read `Option<String>` values, which keeps them testable without touching the
//! environment.

use crate::constants::{DEFAULT_GENERATION_URL, DEFAULT_MODEL, DEFAULT_PATIENT_DATA_DIR};
use crate::{WardError, WardResult};
use std::fmt;
use std::path::PathBuf;

/// Which [`DocumentStore`](crate::store::DocumentStore) backs the services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    /// File store rooted at the given directory.
    File(PathBuf),
}

/// Where the diagnosis flow reads vitals from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VitalSignsMode {
    /// Fixed sample figures for every patient.
    Fixed,
    /// Latest readings from the `vitals` collection.
    Stored,
}

/// Settings for the hosted generation service.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    api_key: String,
    model: String,
    base_url: String,
}

impl GenerationConfig {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    store: StoreBackend,
    vital_signs: VitalSignsMode,
    generation: GenerationConfig,
}

impl CoreConfig {
    pub fn new(
        store: StoreBackend,
        vital_signs: VitalSignsMode,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            store,
            vital_signs,
            generation,
        }
    }

    pub fn store(&self) -> &StoreBackend {
        &self.store
    }

    pub fn vital_signs(&self) -> VitalSignsMode {
        self.vital_signs
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the store backend from `WARD_STORE` and `PATIENT_DATA_DIR` values.
///
/// Defaults to the file store under [`DEFAULT_PATIENT_DATA_DIR`].
pub fn store_backend_from_env_values(
    backend: Option<String>,
    data_dir: Option<String>,
) -> WardResult<StoreBackend> {
    let data_dir = non_empty(data_dir).unwrap_or_else(|| DEFAULT_PATIENT_DATA_DIR.to_string());

    match non_empty(backend).as_deref() {
        None | Some("file") => Ok(StoreBackend::File(PathBuf::from(data_dir))),
        Some("memory") => Ok(StoreBackend::Memory),
        Some(other) => Err(WardError::InvalidInput(format!(
            "unknown store backend '{}' (expected 'memory' or 'file')",
            other
        ))),
    }
}

/// Parse `WARD_VITALS_SOURCE`. Defaults to [`VitalSignsMode::Stored`].
pub fn vital_signs_mode_from_env_value(value: Option<String>) -> WardResult<VitalSignsMode> {
    match non_empty(value).as_deref() {
        None | Some("stored") => Ok(VitalSignsMode::Stored),
        Some("fixed") => Ok(VitalSignsMode::Fixed),
        Some(other) => Err(WardError::InvalidInput(format!(
            "unknown vitals source '{}' (expected 'fixed' or 'stored')",
            other
        ))),
    }
}

/// Build the generation settings. The API key is required; model and URL have defaults.
pub fn generation_config_from_env_values(
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
) -> WardResult<GenerationConfig> {
    let api_key = non_empty(api_key)
        .ok_or_else(|| WardError::InvalidInput("GEMINI_API_KEY must be set".into()))?;

    Ok(GenerationConfig {
        api_key,
        model: non_empty(model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        base_url: non_empty(base_url).unwrap_or_else(|| DEFAULT_GENERATION_URL.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_defaults_to_file_store() {
        assert_eq!(
            store_backend_from_env_values(None, None).unwrap(),
            StoreBackend::File(PathBuf::from("patient_data"))
        );
        assert_eq!(
            store_backend_from_env_values(Some(" file ".into()), Some("/srv/ward".into())).unwrap(),
            StoreBackend::File(PathBuf::from("/srv/ward"))
        );
    }

    #[test]
    fn test_store_backend_memory() {
        assert_eq!(
            store_backend_from_env_values(Some("memory".into()), Some("ignored".into())).unwrap(),
            StoreBackend::Memory
        );
    }

    #[test]
    fn test_store_backend_rejects_unknown_name() {
        let err = store_backend_from_env_values(Some("firestore".into()), None)
            .expect_err("unknown backend should be rejected");
        assert!(matches!(err, WardError::InvalidInput(_)));
    }

    #[test]
    fn test_vital_signs_mode_parsing() {
        assert_eq!(
            vital_signs_mode_from_env_value(None).unwrap(),
            VitalSignsMode::Stored
        );
        assert_eq!(
            vital_signs_mode_from_env_value(Some("fixed".into())).unwrap(),
            VitalSignsMode::Fixed
        );
        assert!(vital_signs_mode_from_env_value(Some("iot".into())).is_err());
    }

    #[test]
    fn test_generation_config_requires_api_key() {
        assert!(generation_config_from_env_values(None, None, None).is_err());
        assert!(generation_config_from_env_values(Some("  ".into()), None, None).is_err());
    }

    #[test]
    fn test_generation_config_defaults_and_redaction() {
        let config = generation_config_from_env_values(Some("secret".into()), None, None)
            .expect("config should build");
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.base_url(), DEFAULT_GENERATION_URL);
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
