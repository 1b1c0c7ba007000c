//! Asset renderer: strategy → 1080×1350 poster PNG.
//!
//! ```text
//! StrategyResult + PosterStyle ──▶ layout (Vec<DrawCommand>) ──▶ canvas (RgbaImage) ──▶ PNG
//! ```
//!
//! Rendering is deterministic: the same strategy and style always produce
//! the same pixels. It is CPU-bound, so async callers should wrap
//! [`render_poster`] in `tokio::task::spawn_blocking`.

pub mod canvas;
pub mod font;
pub mod layout;

pub use layout::{wrap_text, DrawCommand, Paint, PosterLayout};

use crate::error::StratosError;
use crate::output::StrategyResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub const WIDTH: u32 = 1080;
pub const HEIGHT: u32 = 1350;

/// Colour scheme of the poster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterStyle {
    #[default]
    Dark,
    Light,
}

impl PosterStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosterStyle::Dark => "dark",
            PosterStyle::Light => "light",
        }
    }
}

impl fmt::Display for PosterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PosterStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(PosterStyle::Dark),
            "light" => Ok(PosterStyle::Light),
            other => Err(format!("unknown poster style '{other}' (expected dark or light)")),
        }
    }
}

/// Draw the poster for `strategy`.
pub fn render_poster(strategy: &StrategyResult, style: PosterStyle) -> RgbaImage {
    let commands = PosterLayout::new(strategy, style).commands();
    debug!("Rendering {} poster: {} draw commands", style, commands.len());
    let mut canvas = canvas::Canvas::new(WIDTH, HEIGHT);
    canvas.run(&commands);
    canvas.into_image()
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, StratosError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| StratosError::RenderFailed(format!("PNG encode: {e}")))?;
    debug!("Encoded poster → {} bytes", buf.len());
    Ok(buf)
}

/// Wrap PNG bytes in a `data:` URL.
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Timestamped download name, e.g. `stratos_dark_1700000000000.png`.
pub fn poster_filename(style: PosterStyle, now: DateTime<Utc>) -> String {
    format!("stratos_{}_{}.png", style.as_str(), now.timestamp_millis())
}

/// Render, encode and write a poster into `dir`.
///
/// Uses atomic write (temp file + rename) so a crash never leaves a
/// truncated PNG behind. Returns the final path.
pub async fn write_poster(
    dir: impl AsRef<Path>,
    strategy: &StrategyResult,
    style: PosterStyle,
) -> Result<PathBuf, StratosError> {
    let strategy = strategy.clone();
    let png = tokio::task::spawn_blocking(move || encode_png(&render_poster(&strategy, style)))
        .await
        .map_err(|e| StratosError::Internal(format!("Render task panicked: {e}")))??;

    let dir = dir.as_ref();
    let path = dir.join(poster_filename(style, Utc::now()));
    let write_err = |source| StratosError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(write_err)?;
    let tmp_path = path.with_extension("png.tmp");
    tokio::fs::write(&tmp_path, &png).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, &path).await.map_err(write_err)?;

    Ok(path)
}
