//! # stratos
//!
//! Turn a web page, or a few lines of campaign notes, into a brand strategy
//! and a ready-to-post 1080×1350 poster.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL and/or notes
//!  │
//!  ├─ 1. Guard    reject malformed, loopback, private and metadata hosts
//!  ├─ 2. Fetch    one browser-like GET, raced against a timeout
//!  ├─ 3. Extract  metadata + main content, bounded; degrades to notes only
//!  ├─ 4. Prompt   campaign objective + source material
//!  ├─ 5. Generate discover a Gemini model, one generateContent call
//!  ├─ 6. Parse    strip code fences, strict six-field JSON
//!  └─ 7. Poster   draw list → RGBA canvas → PNG
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stratos::{analyze, render_poster, encode_png, PosterStyle, ServiceConfig, StrategyRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY
//!     let config = ServiceConfig::from_env()?;
//!     let request = StrategyRequest::from_url("https://example.com/launch")
//!         .with_mode("Product Launch");
//!     let output = analyze(&request, &config).await?;
//!     println!("{}", output.strategy.headline);
//!
//!     let png = encode_png(&render_poster(&output.strategy, PosterStyle::Dark))?;
//!     std::fs::write("poster.png", png)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `stratos` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when embedding the library or the router:
//! ```toml
//! stratos = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod guard;
pub mod output;
pub mod pipeline;
pub mod poster;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_sync, analyze_with, StrategyRequest};
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{IngestError, StratosError};
pub use guard::{is_safe_url, is_valid_url, GuardPolicy};
pub use output::{AnalysisOutput, BrandColor, StrategyResult};
pub use pipeline::provider::{GeminiClient, GenerationProvider, ModelDescriptor};
pub use pipeline::{ExtractedMaterial, Ingestion};
pub use poster::{encode_png, poster_filename, render_poster, to_data_url, write_poster, PosterStyle};
pub use server::{router, serve, AppState};
