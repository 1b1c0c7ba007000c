//! Generation provider: model catalogue + text generation.
//!
//! [`GenerationProvider`] is the seam between the pipeline and the LLM
//! service. The production implementation, [`GeminiClient`], speaks the
//! Gemini `v1beta` REST API; tests and embedders can inject their own via
//! [`crate::config::ServiceConfigBuilder::provider`].
//!
//! Neither call is retried. A failed listing or generation ends the request.

use crate::config::ServiceConfig;
use crate::error::StratosError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Capability a model must advertise to be selected.
pub const GENERATE_CONTENT: &str = "generateContent";

/// One entry of the provider's model catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Resource name, e.g. `models/gemini-1.5-flash`.
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelDescriptor {
    pub fn supports(&self, method: &str) -> bool {
        self.supported_generation_methods.iter().any(|m| m == method)
    }

    /// Contains the family marker and can generate content.
    pub fn is_viable(&self, family: &str) -> bool {
        self.name.contains(family) && self.supports(GENERATE_CONTENT)
    }
}

/// Text-completion service used by the strategy requester.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// List the models the credential can use.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, StratosError>;

    /// Run one prompt against `model` and return the first text part of the
    /// first candidate.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, StratosError>;
}

// ── Wire types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

// ── Gemini client ─────────────────────────────────────────────────────────

/// Gemini REST client authenticated with an API key header.
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &ServiceConfig) -> Self {
        Self::new(client, config.api_base.clone(), config.api_key.clone())
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, StratosError> {
        let url = format!("{}/models", self.api_base);
        let unavailable = |detail: String| StratosError::ProviderUnavailable { detail };

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {} listing models", response.status())));
        }

        let listing: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| unavailable(format!("model listing is not valid JSON: {e}")))?;
        debug!("Provider lists {} models", listing.models.len());
        Ok(listing.models)
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, StratosError> {
        let url = format!("{}/{}:generateContent", self.api_base, model);
        let failed = |detail: String| StratosError::GenerationFailed {
            model: model.to_string(),
            detail,
        };

        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(failed(format!("HTTP {status}: {detail}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| failed(format!("response is not valid JSON: {e}")))?;

        parsed
            .first_text()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| StratosError::EmptyCompletion {
                model: model.to_string(),
            })
    }
}

/// Pick the first viable model from the catalogue.
pub async fn discover_model(
    provider: &dyn GenerationProvider,
    family: &str,
) -> Result<ModelDescriptor, StratosError> {
    let models = provider.list_models().await?;
    models
        .into_iter()
        .find(|m| m.is_viable(family))
        .ok_or_else(|| StratosError::NoViableModel {
            family: family.to_string(),
        })
}
