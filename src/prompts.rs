//! Prompt text for strategy generation.
//!
//! Every prompt lives here so a wording change touches one file and unit
//! tests can check the output contract without calling a model.
//!
//! Callers can override the template via
//! [`crate::config::ServiceConfig::prompt_template`]; the constant below is
//! used only when no override is provided.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Default strategy prompt. `{mode}` and `{source}` are substituted.
pub const STRATEGY_PROMPT: &str = r#"Act as a Senior Brand Strategist.
CAMPAIGN OBJECTIVE: {mode}
SOURCE DATA:
{source}

OUTPUT FORMAT (JSON Only):
{
  "headline": "Short, punchy poster headline (max 7 words). Focus on value.",
  "tweet_body": "Professional LinkedIn/X post (max 280 chars).",
  "stats": "A key metric found in text (e.g., '$5M Funding'). If none, infer a strong label.",
  "stat_label": "Label for the stat (e.g. 'Status', 'Metric').",
  "hashtags": "3 relevant tags space separated.",
  "brand_color": "Pick ONE Tailwind class: 'bg-blue-600', 'bg-emerald-500', 'bg-orange-500', 'bg-purple-600', 'bg-rose-500', 'bg-zinc-100'"
}"#;

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(mode|source)\}").unwrap());

/// Fill a template with the campaign objective and source material.
///
/// Both placeholders are substituted in a single pass over the template, so
/// placeholder-like text inside `mode` or `source` is never expanded.
pub fn render_prompt(template: &str, mode: &str, source: &str) -> String {
    RE_PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "mode" => mode,
            _ => source,
        })
        .into_owned()
}

/// Build the default strategy prompt.
pub fn build_strategy_prompt(mode: &str, source: &str) -> String {
    render_prompt(STRATEGY_PROMPT, mode, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_mode_and_source() {
        let p = build_strategy_prompt("Product Launch", "--- STRATEGIC NOTES ---\nAcme");
        assert!(p.contains("CAMPAIGN OBJECTIVE: Product Launch"));
        assert!(p.contains("SOURCE DATA:\n--- STRATEGIC NOTES ---\nAcme"));
    }

    #[test]
    fn prompt_lists_all_six_fields() {
        for field in ["headline", "tweet_body", "stats", "stat_label", "hashtags", "brand_color"] {
            assert!(STRATEGY_PROMPT.contains(&format!("\"{field}\"")), "{field}");
        }
    }

    #[test]
    fn source_braces_are_left_alone() {
        let p = render_prompt("{mode}|{source}", "M", "literal {mode} in page");
        assert_eq!(p, "M|literal {mode} in page");
    }

    #[test]
    fn mode_braces_are_left_alone() {
        let p = render_prompt("{mode}|{source}", "Launch {source}", "PAGE");
        assert_eq!(p, "Launch {source}|PAGE");
        assert_eq!(p.matches("PAGE").count(), 1);
    }
}
