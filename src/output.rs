//! Result types: the strategy payload and the per-request summary.

use crate::pipeline::Ingestion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accent used when the model names a swatch outside the palette.
pub const DEFAULT_ACCENT: &str = "#3b82f6";

/// Brand strategy produced by the model.
///
/// All six fields are required. A completion missing any of them is rejected
/// as [`crate::error::StratosError::MalformedStrategy`] rather than rendered
/// with holes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyResult {
    /// Poster headline, about seven words.
    pub headline: String,
    /// Social post copy, about 280 characters.
    pub tweet_body: String,
    /// Headline metric, e.g. `$5M`.
    pub stats: String,
    /// Label for the metric, e.g. `Funding`.
    pub stat_label: String,
    /// Space-separated hashtags.
    pub hashtags: String,
    pub brand_color: BrandColor,
}

impl StrategyResult {
    /// Hashtags as individual tokens.
    pub fn hashtag_list(&self) -> Vec<&str> {
        self.hashtags.split_whitespace().collect()
    }
}

/// Palette swatch named by the model (Tailwind class names).
///
/// Unknown names are kept verbatim in [`BrandColor::Other`] and resolve to
/// [`DEFAULT_ACCENT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BrandColor {
    Blue,
    Emerald,
    Orange,
    Purple,
    Rose,
    Zinc,
    Slate,
    Other(String),
}

impl BrandColor {
    /// Tailwind class name for this swatch.
    pub fn class_name(&self) -> &str {
        match self {
            BrandColor::Blue => "bg-blue-600",
            BrandColor::Emerald => "bg-emerald-500",
            BrandColor::Orange => "bg-orange-500",
            BrandColor::Purple => "bg-purple-600",
            BrandColor::Rose => "bg-rose-500",
            BrandColor::Zinc => "bg-zinc-100",
            BrandColor::Slate => "bg-slate-900",
            BrandColor::Other(s) => s,
        }
    }

    /// Accent colour as `#rrggbb`.
    pub fn accent_hex(&self) -> &'static str {
        match self {
            BrandColor::Blue => "#3b82f6",
            BrandColor::Emerald => "#10b981",
            BrandColor::Orange => "#f97316",
            BrandColor::Purple => "#a855f7",
            BrandColor::Rose => "#f43f5e",
            BrandColor::Zinc => "#a1a1aa",
            BrandColor::Slate => "#64748b",
            BrandColor::Other(_) => DEFAULT_ACCENT,
        }
    }

    /// Accent colour as RGB bytes.
    pub fn accent_rgb(&self) -> [u8; 3] {
        parse_hex(self.accent_hex()).unwrap_or([0x3b, 0x82, 0xf6])
    }
}

impl From<String> for BrandColor {
    fn from(s: String) -> Self {
        match s.trim() {
            "bg-blue-600" => BrandColor::Blue,
            "bg-emerald-500" => BrandColor::Emerald,
            "bg-orange-500" => BrandColor::Orange,
            "bg-purple-600" => BrandColor::Purple,
            "bg-rose-500" => BrandColor::Rose,
            "bg-zinc-100" => BrandColor::Zinc,
            "bg-slate-900" => BrandColor::Slate,
            _ => BrandColor::Other(s),
        }
    }
}

impl From<BrandColor> for String {
    fn from(c: BrandColor) -> Self {
        c.class_name().to_string()
    }
}

impl fmt::Display for BrandColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Parse `#rrggbb`.
pub fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let h = hex.strip_prefix('#')?;
    if h.len() != 6 || !h.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).ok();
    Some([byte(0)?, byte(2)?, byte(4)?])
}

/// Everything one analysis produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub strategy: StrategyResult,
    /// Resource name of the model that generated the strategy.
    pub model: String,
    pub ingestion: Ingestion,
    /// Characters in the prompt sent to the model.
    pub prompt_chars: usize,
    pub duration_ms: u64,
}
