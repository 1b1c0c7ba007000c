//! Monospace bitmap text on top of `font8x8`.
//!
//! Every glyph occupies a cell `ADVANCE × size` wide and `size` tall, so a
//! string's width depends only on its character count. The 8×8 bitmap is
//! nearest-neighbour scaled into that cell.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

/// Horizontal advance as a fraction of the font size.
pub const ADVANCE: f32 = 0.6;

/// Fraction of the cell height that sits above the baseline.
const ASCENT: f32 = 0.875;

/// Width of `text` set at `size` px.
pub fn measure_text(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * ADVANCE * size
}

/// 8×8 bitmap for `c`; unknown characters fall back to `?`.
fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Whether glyph pixel (col, row) is set. Bit 0 is the leftmost column.
fn bit(rows: &[u8; 8], col: i32, row: i32) -> bool {
    if !(0..8).contains(&col) || !(0..8).contains(&row) {
        return false;
    }
    rows[row as usize] & (1 << col) != 0
}

/// Visit every pixel covered by `text` with its baseline at `(x, baseline)`.
///
/// Only glyph cells that intersect `0..clip.0 × 0..clip.1` are visited, so the
/// cost is bounded by the clip area rather than the text length. Bold thickens
/// each stroke by one glyph column to the right.
pub fn for_each_pixel(
    text: &str,
    x: f32,
    baseline: f32,
    size: f32,
    bold: bool,
    clip: (u32, u32),
    mut plot: impl FnMut(i32, i32),
) {
    if size <= 0.0 {
        return;
    }
    let cell_w = ADVANCE * size;
    let top = baseline - ASCENT * size;
    let (clip_w, clip_h) = (clip.0 as f32, clip.1 as f32);
    if top >= clip_h || top + size <= 0.0 {
        return;
    }
    let (px_w, px_h) = (cell_w.ceil() as i32, size.ceil() as i32);
    let first = if x < 0.0 {
        (-x / cell_w).floor() as usize
    } else {
        0
    };

    for (i, c) in text.chars().enumerate().skip(first) {
        let left = x + i as f32 * cell_w;
        if left >= clip_w {
            break;
        }
        if c == ' ' {
            continue;
        }
        let rows = glyph(c);
        for dy in 0..px_h {
            let row = (dy as f32 * 8.0 / size) as i32;
            for dx in 0..px_w {
                let col = (dx as f32 * 8.0 / cell_w) as i32;
                let on = bit(&rows, col, row) || (bold && bit(&rows, col - 1, row));
                if on {
                    plot((left + dx as f32) as i32, (top + dy as f32) as i32);
                }
            }
        }
    }
}
