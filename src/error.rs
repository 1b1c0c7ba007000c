//! Error types for the stratos library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`StratosError`] is **fatal**: the request cannot produce a strategy at
//!   all (bad or restricted URL, no input, provider down, unparseable
//!   completion). Returned as `Err(StratosError)` from [`crate::analyze`] and
//!   mapped onto an HTTP status by the server.
//!
//! * [`IngestError`] is **non-fatal**: the page could not be fetched (non-2xx,
//!   timeout, transport failure). The pipeline downgrades to notes-only
//!   processing and keeps the cause inside [`crate::pipeline::Ingestion`] for
//!   diagnostics.
//!
//! Client-facing text comes from [`StratosError::public_message`], never from
//! `Display`: upstream detail stays in the server log.

use std::path::PathBuf;
use thiserror::Error;

/// Message returned to callers for every upstream-provider failure.
pub const GENERATION_FAILED_MESSAGE: &str = "Strategy generation failed.";

/// All fatal errors returned by the stratos library.
#[derive(Debug, Error)]
pub enum StratosError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Neither a URL nor context notes were supplied.
    #[error("Input required: provide a source URL or context notes")]
    MissingInput,

    /// The URL did not parse as an absolute http(s) URL.
    #[error("Invalid URL format: '{url}'")]
    InvalidUrl { url: String },

    /// The request body was not valid JSON of the expected shape.
    #[error("Invalid request body: {detail}")]
    InvalidRequest { detail: String },

    /// The URL points at a host the SSRF guard refuses to contact.
    #[error("Restricted URL '{url}': host '{host}' is blocked")]
    RestrictedUrl { url: String, host: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// `GEMINI_API_KEY` is not set.
    #[error("Missing API key.\nSet GEMINI_API_KEY to a Google AI Studio key.")]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Provider errors ───────────────────────────────────────────────────
    /// The model catalogue could not be listed.
    #[error("AI service unavailable: {detail}")]
    ProviderUnavailable { detail: String },

    /// The catalogue contained no model of the wanted family that can
    /// generate content.
    #[error("No AI capacity available: no '{family}' model supports generateContent")]
    NoViableModel { family: String },

    /// The generation endpoint returned an error.
    #[error("AI processing failed for model '{model}': {detail}")]
    GenerationFailed { model: String, detail: String },

    /// The generation call succeeded but carried no text part.
    #[error("Model '{model}' returned an empty completion")]
    EmptyCompletion { model: String },

    /// The completion text was not a valid strategy object.
    #[error("Completion is not a valid strategy: {detail}")]
    MalformedStrategy { detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// PNG encoding of the poster failed.
    #[error("Poster rendering failed: {0}")]
    RenderFailed(String),

    /// Could not create or write the poster file.
    #[error("Failed to write poster '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StratosError {
    /// HTTP status code for this error.
    ///
    /// Validation failures get distinct 4xx codes so callers can tell "bad
    /// input" (400) from "blocked for security" (403). Everything else is 500.
    pub fn status_code(&self) -> u16 {
        match self {
            StratosError::MissingInput
            | StratosError::InvalidRequest { .. }
            | StratosError::InvalidUrl { .. } => 400,
            StratosError::RestrictedUrl { .. } => 403,
            _ => 500,
        }
    }

    /// Text safe to show an end user.
    pub fn public_message(&self) -> &'static str {
        match self {
            StratosError::MissingInput => "Input required: provide a source URL or context",
            StratosError::InvalidRequest { .. } => "Invalid request body",
            StratosError::InvalidUrl { .. } => "Invalid URL format",
            StratosError::RestrictedUrl { .. } => "Security Alert: Restricted URL",
            StratosError::MissingApiKey => "Server Configuration Error: Missing API Key",
            StratosError::InvalidConfig(_) => "Server Configuration Error",
            StratosError::RenderFailed(_) | StratosError::OutputWriteFailed { .. } => {
                "Poster rendering failed."
            }
            StratosError::ProviderUnavailable { .. }
            | StratosError::NoViableModel { .. }
            | StratosError::GenerationFailed { .. }
            | StratosError::EmptyCompletion { .. }
            | StratosError::MalformedStrategy { .. }
            | StratosError::Internal(_) => GENERATION_FAILED_MESSAGE,
        }
    }

    /// True for errors caused by the caller's input rather than a fault.
    pub fn is_validation(&self) -> bool {
        self.status_code() < 500
    }
}

/// A non-fatal failure while fetching the source page.
///
/// Stored in [`crate::pipeline::Ingestion::Degraded`]. The request continues
/// with the user's notes only.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum IngestError {
    /// The page answered with a non-2xx status.
    #[error("page returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// The fetch did not complete within the configured bound.
    #[error("page fetch timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection, TLS or body-decoding failure.
    #[error("page fetch failed: {detail}")]
    Network { detail: String },
}

impl IngestError {
    /// Placeholder text handed to the model in place of page content.
    pub fn placeholder(&self, url: &str) -> String {
        match self {
            IngestError::HttpStatus { status } => {
                format!("URL: {url} (Access Denied: {status}). Using Context Only.")
            }
            IngestError::Timeout { .. } | IngestError::Network { .. } => {
                format!("URL: {url} (Network/Timeout Error). Using Context Only.")
            }
        }
    }
}
