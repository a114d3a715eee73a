//! Hosted language-model client.

use async_trait::async_trait;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service '{0}' unavailable")]
    Unavailable(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("model returned no structured output")]
    MissingOutput,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Http(e.to_string())
    }
}

/// A model that turns a prompt into a JSON value conforming to `output_schema`.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str, output_schema: &Value) -> Result<Value, GenerationError>;

    fn name(&self) -> &str;
}

/// Google Gemini `generateContent` with a JSON response schema.
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(prompt: &str, output_schema: &Value) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": output_schema,
            }
        })
    }

    /// Extracts the first candidate's text and parses it as JSON.
    pub fn parse_response(&self, response: &Value) -> Result<Value, GenerationError> {
        let text = response
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::MissingOutput)?;
        serde_json::from_str(text).map_err(|e| GenerationError::Parse(e.to_string()))
    }
}

#[async_trait]
impl GenerationService for GeminiGenerator {
    async fn generate(&self, prompt: &str, output_schema: &Value) -> Result<Value, GenerationError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(prompt, output_schema))
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable(format!("gemini: {}", e)))?
            .error_for_status()?;

        let json: Value = response.json().await?;
        self.parse_response(&json)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
