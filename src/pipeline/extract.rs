//! Content extraction: page HTML → bounded [`ExtractedMaterial`].
//!
//! ## Priority order
//!
//! 1. Prune noise (`script`, `style`, navigation chrome, ads, cookie
//!    banners, embedded frames) before reading any text.
//! 2. Metadata: social-preview tags first (`og:title`, `og:description`,
//!    `og:site_name`), then the plain `<title>` and `meta[name=description]`.
//! 3. Main content: the first non-empty of `article`, `main`, `#content`,
//!    `.post-content`. Client-rendered pages often ship these containers
//!    empty or nearly so; if the text is shorter than
//!    [`ServiceConfig::min_content_chars`] the whole body is used instead.
//!
//! All text is whitespace-collapsed and cut to the configured budget.

use crate::config::ServiceConfig;
use crate::error::IngestError;
use crate::pipeline::fetch::fetch_page;
use crate::pipeline::html::{HtmlDocument, ScrapedPage};
use crate::pipeline::postprocess::{clean_page_text, collapse_whitespace, truncate_chars};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

/// Elements removed before any text is read.
pub const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "nav",
    "footer",
    "header",
    "svg",
    "iframe",
    "noscript",
    ".cookie-banner",
    ".ads",
];

/// Content containers, most specific first.
pub const CONTENT_SELECTORS: &[&str] = &["article", "main", "#content", ".post-content"];

/// Cap on each metadata field.
const META_CHAR_LIMIT: usize = 300;

/// Everything the prompt gets to see about the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMaterial {
    pub source_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_name: Option<String>,
    /// Main page text, at most `body_char_limit` characters.
    pub body_text: String,
    /// User notes, at most `notes_char_limit` characters.
    pub notes: Option<String>,
    /// Placeholder recorded when the fetch failed.
    pub fetch_note: Option<String>,
}

impl ExtractedMaterial {
    /// Material built from notes alone.
    pub fn notes_only(notes: Option<String>) -> Self {
        Self {
            notes,
            ..Self::default()
        }
    }

    /// True when there is page content to show the model.
    pub fn has_page_content(&self) -> bool {
        !self.body_text.is_empty() || self.title.is_some() || self.description.is_some()
    }

    /// Render the source-data block embedded in the prompt.
    pub fn to_source_material(&self) -> String {
        let mut out = String::new();

        if let Some(ref note) = self.fetch_note {
            out.push_str(note);
            out.push_str(" \n\n");
        } else if self.has_page_content() {
            out.push_str("--- METADATA ---\n");
            out.push_str(&format!(
                "Title: {}\n",
                self.title.as_deref().unwrap_or("N/A")
            ));
            out.push_str(&format!(
                "Description: {}\n",
                self.description.as_deref().unwrap_or("N/A")
            ));
            if let Some(ref site) = self.site_name {
                out.push_str(&format!("Site: {site}\n"));
            }
            out.push('\n');
            out.push_str("--- MAIN CONTENT ---\n");
            out.push_str(&self.body_text);
        }

        if let Some(ref notes) = self.notes {
            out.push_str("\n\n--- STRATEGIC NOTES ---\n");
            out.push_str(notes);
        }

        out.trim().to_string()
    }
}

/// Outcome of the ingestion step, kept for logs and callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ingestion {
    /// No URL was supplied; nothing was fetched.
    Skipped,
    /// The page was fetched and `chars` characters of body text kept.
    Extracted { chars: usize },
    /// The fetch failed; the request continued with notes only.
    Degraded { reason: IngestError },
}

fn clean_meta(value: Option<String>) -> Option<String> {
    let cleaned = truncate_chars(&collapse_whitespace(&value?), META_CHAR_LIMIT);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// First non-blank value among `candidates`.
fn first_present(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .map(clean_meta)
        .find(Option::is_some)
        .flatten()
}

/// Extract metadata and main content from a parsed document.
///
/// The document is pruned in place.
pub fn extract_from_document<D: HtmlDocument>(
    doc: &mut D,
    config: &ServiceConfig,
) -> ExtractedMaterial {
    doc.remove_all(NOISE_SELECTORS);

    let title = first_present([
        doc.select_attr(r#"meta[property="og:title"]"#, "content"),
        doc.select_first("title"),
    ]);
    let description = first_present([
        doc.select_attr(r#"meta[property="og:description"]"#, "content"),
        doc.select_attr(r#"meta[name="description"]"#, "content"),
    ]);
    let site_name = first_present([doc.select_attr(r#"meta[property="og:site_name"]"#, "content")]);

    let mut main = CONTENT_SELECTORS
        .iter()
        .map(|sel| (sel, collapse_whitespace(&doc.select_all_text(sel))))
        .find(|(_, text)| !text.is_empty())
        .map(|(sel, text)| {
            debug!("Main content from '{}' ({} chars)", sel, text.chars().count());
            text
        })
        .unwrap_or_default();

    if main.chars().count() < config.min_content_chars {
        debug!(
            "Main content below {} chars; falling back to body text",
            config.min_content_chars
        );
        main = doc.body_text();
    }

    ExtractedMaterial {
        title,
        description,
        site_name,
        body_text: clean_page_text(&main, config.body_char_limit),
        ..ExtractedMaterial::default()
    }
}

/// Parse `html` and extract material from it.
pub fn extract_material(html: &str, config: &ServiceConfig) -> ExtractedMaterial {
    let mut page = ScrapedPage::parse(html);
    extract_from_document(&mut page, config)
}

/// Fetch (when a URL is given) and extract. Never fails.
///
/// `target` must already have passed the guard. On any fetch failure the
/// returned material carries a placeholder instead of page content and the
/// cause is reported through [`Ingestion::Degraded`].
pub async fn ingest(
    client: &reqwest::Client,
    target: Option<&Url>,
    notes: Option<String>,
    config: &ServiceConfig,
) -> (ExtractedMaterial, Ingestion) {
    let Some(url) = target else {
        debug!("No URL supplied; using notes only");
        return (ExtractedMaterial::notes_only(notes), Ingestion::Skipped);
    };

    match fetch_page(client, url, config).await {
        Ok(html) => {
            let mut material = extract_material(&html, config);
            material.source_url = Some(url.to_string());
            material.notes = notes;
            let chars = material.body_text.chars().count();
            info!("Extracted {} chars from {}", chars, url);
            (material, Ingestion::Extracted { chars })
        }
        Err(reason) => {
            warn!("Ingestion degraded for {}: {}", url, reason);
            let material = ExtractedMaterial {
                source_url: Some(url.to_string()),
                fetch_note: Some(reason.placeholder(url.as_str())),
                ..ExtractedMaterial::notes_only(notes)
            };
            (material, Ingestion::Degraded { reason })
        }
    }
}
