//! Analysis entry points: request in, strategy out.
//!
//! [`analyze`] is the one-shot API: it builds its own HTTP client and
//! provider from the config. The server calls [`analyze_with`] so one client
//! and one provider are shared across requests.

use crate::config::ServiceConfig;
use crate::error::StratosError;
use crate::guard;
use crate::output::AnalysisOutput;
use crate::pipeline::{extract, fetch, llm, provider::GeminiClient, provider::GenerationProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// What the caller asked for. Every field is optional; blank strings count
/// as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl StrategyRequest {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn from_context(context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// The URL, if a non-blank one was supplied.
    pub fn target_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Generate a brand strategy for `request`.
///
/// # Errors
/// - 400-class: [`StratosError::MissingInput`], [`StratosError::InvalidUrl`]
/// - 403-class: [`StratosError::RestrictedUrl`]
/// - 500-class: provider, generation and parse failures
///
/// A page that cannot be fetched is **not** an error; see
/// [`crate::pipeline::Ingestion::Degraded`].
pub async fn analyze(
    request: &StrategyRequest,
    config: &ServiceConfig,
) -> Result<AnalysisOutput, StratosError> {
    let client = fetch::build_client(&config.guard)
        .map_err(|e| StratosError::Internal(format!("HTTP client: {e}")))?;
    let provider = resolve_provider(&client, config);
    analyze_with(&client, provider.as_ref(), request, config).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    request: &StrategyRequest,
    config: &ServiceConfig,
) -> Result<AnalysisOutput, StratosError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| StratosError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(analyze(request, config))
}

/// Run the pipeline with a caller-supplied client and provider.
pub async fn analyze_with(
    client: &reqwest::Client,
    provider: &dyn GenerationProvider,
    request: &StrategyRequest,
    config: &ServiceConfig,
) -> Result<AnalysisOutput, StratosError> {
    let start = Instant::now();
    let url = request.target_url();
    let notes = guard::sanitize_notes(request.context.as_deref(), config.notes_char_limit);

    info!(
        "Processing: {} | Strategy: {}",
        if url.is_some() { "URL Mode" } else { "Context Mode" },
        request.mode.as_deref().unwrap_or(config.default_mode.as_str())
    );

    // ── Step 1: Validate input ───────────────────────────────────────────
    if url.is_none() && notes.is_none() {
        debug!("Rejected: no URL and no context");
        return Err(StratosError::MissingInput);
    }
    let target = match url {
        Some(raw) => match guard::validate_url(raw, &config.guard) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Rejected URL '{}': {:?}", raw, e);
                return Err(e.into_error(raw));
            }
        },
        None => None,
    };

    // ── Step 2: Ingest ───────────────────────────────────────────────────
    let (material, ingestion) = extract::ingest(client, target.as_ref(), notes, config).await;

    // ── Step 3: Compose prompt ───────────────────────────────────────────
    let prompt = llm::compose_prompt(
        request.mode.as_deref(),
        &material.to_source_material(),
        config,
    );

    // ── Step 4: Discover model, generate, parse ──────────────────────────
    let response = llm::request_strategy(provider, &prompt, config).await?;

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Strategy ready: model={}, {} prompt chars, {}ms",
        response.model, response.prompt_chars, duration_ms
    );

    Ok(AnalysisOutput {
        strategy: response.strategy,
        model: response.model,
        ingestion,
        prompt_chars: response.prompt_chars,
        duration_ms,
    })
}

/// Pick the provider: an injected one wins, else Gemini from the config.
pub fn resolve_provider(
    client: &reqwest::Client,
    config: &ServiceConfig,
) -> Arc<dyn GenerationProvider> {
    match config.provider {
        Some(ref provider) => Arc::clone(provider),
        None => Arc::new(GeminiClient::from_config(client.clone(), config)),
    }
}
