//! Strategy request: discover a model, prompt it, parse the completion.
//!
//! Prompt wording lives in [`crate::prompts`] and wire details in
//! [`crate::pipeline::provider`]. This module sequences the calls and parses
//! the completion into a [`StrategyResult`].
//!
//! Two sequential provider calls are made (listing, then generation). There is
//! no retry: the first failure ends the request.

use crate::config::ServiceConfig;
use crate::error::StratosError;
use crate::output::StrategyResult;
use crate::pipeline::postprocess::strip_code_fences;
use crate::pipeline::provider::{discover_model, GenerationProvider};
use crate::prompts::{build_strategy_prompt, render_prompt};
use tracing::{debug, info};

/// A parsed strategy plus what it took to get it.
#[derive(Debug, Clone)]
pub struct StrategyResponse {
    pub strategy: StrategyResult,
    pub model: String,
    pub prompt_chars: usize,
}

/// Compose the prompt for `source` under the campaign objective `mode`.
pub fn compose_prompt(mode: Option<&str>, source: &str, config: &ServiceConfig) -> String {
    let mode = mode
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(config.default_mode.as_str());
    match config.prompt_template {
        Some(ref template) => render_prompt(template, mode, source),
        None => build_strategy_prompt(mode, source),
    }
}

/// Parse a raw completion into a [`StrategyResult`].
///
/// Fence markers are stripped first, so a fenced and an unfenced completion
/// of the same object parse to equal results.
pub fn parse_strategy(raw: &str) -> Result<StrategyResult, StratosError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| StratosError::MalformedStrategy {
        detail: e.to_string(),
    })
}

/// Run discovery and generation for an already-composed prompt.
pub async fn request_strategy(
    provider: &dyn GenerationProvider,
    prompt: &str,
    config: &ServiceConfig,
) -> Result<StrategyResponse, StratosError> {
    let model = discover_model(provider, &config.model_family).await?;
    info!("Using model {} via {}", model.name, provider.name());

    let prompt_chars = prompt.chars().count();
    debug!("Prompt: {} chars", prompt_chars);

    let raw = provider.generate(&model.name, prompt).await?;
    debug!("Completion: {} chars", raw.len());

    let strategy = parse_strategy(&raw)?;
    Ok(StrategyResponse {
        strategy,
        model: model.name,
        prompt_chars,
    })
}
