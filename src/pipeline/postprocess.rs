//! Post-processing: deterministic cleanup of scraped text and model output.
//!
//! Two kinds of input pass through here:
//!
//! - **Scraped page text**, which arrives with runs of indentation, newlines
//!   and invisible Unicode left over from the markup. It is flattened to
//!   single spaces and cut to a character budget before reaching the prompt.
//! - **Model completions**, which often wrap the requested JSON in
//!   ` ```json ... ``` ` fences even though the prompt asks for bare JSON.
//!
//! Every rule is a pure `&str → String` function so each can be tested alone.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prepare scraped text for the prompt.
///
/// Rules (applied in order):
/// 1. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 2. Collapse every whitespace run to a single space and trim
/// 3. Truncate to `limit` characters
pub fn clean_page_text(input: &str, limit: usize) -> String {
    let s = remove_invisible_chars(input);
    let s = collapse_whitespace(&s);
    truncate_chars(&s, limit)
}

// ── Rule 1: Remove invisible Unicode characters ─────────────────────────────

pub fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 2: Collapse whitespace ──────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").trim().to_string()
}

// ── Rule 3: Truncate on a character boundary ─────────────────────────────────

/// Keep at most `limit` characters. Never splits a multi-byte character.
pub fn truncate_chars(input: &str, limit: usize) -> String {
    match input.char_indices().nth(limit) {
        Some((byte_idx, _)) => input[..byte_idx].to_string(),
        None => input.to_string(),
    }
}

// ── Completion cleanup: strip code fences ────────────────────────────────────

static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json|JSON)?").unwrap());

/// Remove every Markdown code-fence marker and trim.
///
/// Markers are removed wherever they appear, not only at the ends. Text
/// outside the fences is left alone and will fail JSON parsing downstream.
pub fn strip_code_fences(input: &str) -> String {
    RE_FENCE.replace_all(input, "").trim().to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
