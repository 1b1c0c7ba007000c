//! Pipeline stages for strategy generation.
//!
//! Each submodule implements exactly one step, so each can be tested alone
//! and swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! guard ──▶ fetch ──▶ html/extract ──▶ llm (provider) ──▶ postprocess
//! (SSRF)   (bounded)  (prune, pick)    (discover, gen)    (fences, JSON)
//! ```
//!
//! 1. [`crate::guard`]  reject malformed and internal URLs before any I/O
//! 2. [`fetch`]     one GET raced against the fetch timeout
//! 3. [`html`]      `HtmlDocument` capability over `scraper`
//! 4. [`extract`]   metadata + main content, bounded; degrades on failure
//! 5. [`provider`]  model catalogue and generation over HTTP
//! 6. [`llm`]       compose prompt, discover model, generate, parse
//! 7. [`postprocess`]  whitespace, truncation, code-fence stripping

pub mod extract;
pub mod fetch;
pub mod html;
pub mod llm;
pub mod postprocess;
pub mod provider;

pub use extract::{ExtractedMaterial, Ingestion};
