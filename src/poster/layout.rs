//! Poster layout: a strategy and a style become an ordered draw list.
//!
//! Nothing here touches pixels. The command list is the whole visual
//! contract; [`super::canvas::Canvas`] only interprets it.

use super::font::measure_text;
use super::{PosterStyle, HEIGHT, WIDTH};
use crate::output::StrategyResult;

// ── Fixed geometry ───────────────────────────────────────────────────────

pub const MARGIN_X: f32 = 80.0;
pub const GRID_SPACING: u32 = 60;
pub const PANEL_HEIGHT: f32 = 600.0;

pub const LABEL_SIZE: f32 = 32.0;
pub const PILL_Y: f32 = 140.0;
pub const PILL_HEIGHT: f32 = 80.0;
pub const PILL_RADIUS: f32 = 40.0;
pub const PILL_PADDING: f32 = 60.0;

pub const STAT_BASELINE: f32 = 500.0;
pub const STAT_SIZE_LONG: f32 = 180.0;
pub const STAT_SIZE_SHORT: f32 = 250.0;
pub const STAT_GLOW_BLUR: f32 = 40.0;

pub const HEADLINE_SIZE: f32 = 64.0;
pub const HEADLINE_MAX_WIDTH: f32 = 900.0;
pub const HEADLINE_LINE_HEIGHT: f32 = 80.0;
pub const HEADLINE_BASELINE: f32 = 950.0;

pub const FOOTER_TEXT: &str = "STRATOS INTELLIGENCE // GEN_V3";
pub const FOOTER_SIZE: f32 = 30.0;

/// An RGB colour with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub rgb: [u8; 3],
    pub alpha: f32,
}

impl Paint {
    pub const fn opaque(rgb: [u8; 3]) -> Self {
        Self { rgb, alpha: 1.0 }
    }

    pub const fn with_alpha(rgb: [u8; 3], alpha: f32) -> Self {
        Self { rgb, alpha }
    }
}

/// A gradient stop: offset in `0.0..=1.0` and the paint at that offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub offset: f32,
    pub paint: Paint,
}

/// One drawing step. Coordinates are canvas pixels; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Flood the whole canvas.
    Background(Paint),
    /// Radial fade from `paint` at the centre to transparent at `radius`.
    RadialGlow {
        cx: f32,
        cy: f32,
        radius: f32,
        paint: Paint,
    },
    /// 1 px lines every `spacing` px in both directions.
    Grid { spacing: u32, paint: Paint },
    /// Circle outline.
    Ring {
        cx: f32,
        cy: f32,
        radius: f32,
        width: f32,
        paint: Paint,
    },
    /// Full-width vertical gradient from `y` over `height` px.
    VerticalGradient { y: f32, height: f32, stops: Vec<Stop> },
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        paint: Paint,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width: f32,
        paint: Paint,
    },
    RoundedRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        paint: Paint,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        paint: Paint,
        /// Blurred halo drawn beneath the glyphs: (colour, blur radius).
        glow: Option<(Paint, f32)>,
    },
}

/// Style-dependent colours. The accent always comes from the strategy.
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: [u8; 3],
    lower_glow: Paint,
    grid: Paint,
    stat: [u8; 3],
    headline: [u8; 3],
    footer: [u8; 3],
}

impl Palette {
    fn for_style(style: PosterStyle) -> Self {
        match style {
            PosterStyle::Dark => Self {
                background: [0x05, 0x05, 0x05],
                lower_glow: Paint::with_alpha([0x1e, 0x29, 0x3b], 0.5),
                grid: Paint::with_alpha([0xff, 0xff, 0xff], 0.03),
                stat: [0xff, 0xff, 0xff],
                headline: [0xe4, 0xe4, 0xe7],
                footer: [0x52, 0x52, 0x5b],
            },
            PosterStyle::Light => Self {
                background: [0xf4, 0xf4, 0xf5],
                lower_glow: Paint::with_alpha([0xcb, 0xd5, 0xe1], 0.35),
                grid: Paint::with_alpha([0x00, 0x00, 0x00], 0.05),
                stat: [0x18, 0x18, 0x1b],
                headline: [0x18, 0x18, 0x1b],
                footer: [0x52, 0x52, 0x5b],
            },
        }
    }
}

/// Greedy word wrap.
///
/// Words are appended while `line + word + " "` measures within
/// `max_width`. A word that alone exceeds the budget gets its own line and is
/// never split. Returned lines carry no trailing space.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = format!("{line}{word} ");
        if measure(&candidate) > max_width && !line.is_empty() {
            lines.push(line.trim_end().to_string());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// Layout for one poster.
#[derive(Debug, Clone, Copy)]
pub struct PosterLayout<'a> {
    strategy: &'a StrategyResult,
    style: PosterStyle,
}

impl<'a> PosterLayout<'a> {
    pub fn new(strategy: &'a StrategyResult, style: PosterStyle) -> Self {
        Self { strategy, style }
    }

    /// Upper-cased pill label.
    pub fn label(&self) -> String {
        self.strategy.stat_label.to_uppercase()
    }

    /// Stat font size: long stats get the smaller size.
    pub fn stat_size(&self) -> f32 {
        if self.strategy.stats.chars().count() > 6 {
            STAT_SIZE_LONG
        } else {
            STAT_SIZE_SHORT
        }
    }

    pub fn headline_lines(&self) -> Vec<String> {
        wrap_text(&self.strategy.headline, HEADLINE_MAX_WIDTH, |s| {
            measure_text(s, HEADLINE_SIZE)
        })
    }

    /// The full draw list, in paint order.
    pub fn commands(&self) -> Vec<DrawCommand> {
        let (w, h) = (WIDTH as f32, HEIGHT as f32);
        let palette = Palette::for_style(self.style);
        let accent = self.strategy.brand_color.accent_rgb();
        let mut cmds = Vec::with_capacity(16);

        // Base and atmosphere
        cmds.push(DrawCommand::Background(Paint::opaque(palette.background)));
        cmds.push(DrawCommand::RadialGlow {
            cx: w,
            cy: 0.0,
            radius: 900.0,
            paint: Paint::with_alpha(accent, 0.3),
        });
        cmds.push(DrawCommand::RadialGlow {
            cx: 0.0,
            cy: h,
            radius: 1000.0,
            paint: palette.lower_glow,
        });
        cmds.push(DrawCommand::Grid {
            spacing: GRID_SPACING,
            paint: palette.grid,
        });
        cmds.push(DrawCommand::Ring {
            cx: w - 100.0,
            cy: 200.0,
            radius: 300.0,
            width: 2.0,
            paint: Paint::with_alpha(accent, 0.2),
        });

        // Content panel
        let panel_y = h - PANEL_HEIGHT;
        match self.style {
            PosterStyle::Dark => cmds.push(DrawCommand::VerticalGradient {
                y: panel_y,
                height: PANEL_HEIGHT,
                stops: vec![
                    Stop {
                        offset: 0.0,
                        paint: Paint::with_alpha([20, 20, 25], 0.0),
                    },
                    Stop {
                        offset: 0.3,
                        paint: Paint::with_alpha([20, 20, 25], 0.8),
                    },
                    Stop {
                        offset: 1.0,
                        paint: Paint::opaque([0, 0, 0]),
                    },
                ],
            }),
            PosterStyle::Light => {
                cmds.push(DrawCommand::FillRect {
                    x: 0.0,
                    y: panel_y,
                    w,
                    h: PANEL_HEIGHT,
                    paint: Paint::opaque([0xff, 0xff, 0xff]),
                });
                cmds.push(DrawCommand::StrokeRect {
                    x: 0.0,
                    y: panel_y,
                    w,
                    h: PANEL_HEIGHT,
                    width: 2.0,
                    paint: Paint::opaque([0xe4, 0xe4, 0xe7]),
                });
            }
        }

        // Pill label
        let label = self.label();
        let label_width = measure_text(&label, LABEL_SIZE);
        cmds.push(DrawCommand::RoundedRect {
            x: MARGIN_X,
            y: PILL_Y,
            w: label_width + PILL_PADDING,
            h: PILL_HEIGHT,
            radius: PILL_RADIUS,
            paint: Paint::opaque(accent),
        });
        cmds.push(DrawCommand::Text {
            text: label,
            x: 110.0,
            y: 192.0,
            size: LABEL_SIZE,
            bold: true,
            paint: Paint::opaque([0xff, 0xff, 0xff]),
            glow: None,
        });

        // Stat
        let glow = match self.style {
            PosterStyle::Dark => Some((Paint::opaque(accent), STAT_GLOW_BLUR)),
            PosterStyle::Light => None,
        };
        cmds.push(DrawCommand::Text {
            text: self.strategy.stats.clone(),
            x: MARGIN_X,
            y: STAT_BASELINE,
            size: self.stat_size(),
            bold: true,
            paint: Paint::opaque(palette.stat),
            glow,
        });

        // Headline + underline bar
        let mut y = HEADLINE_BASELINE;
        let lines = self.headline_lines();
        let count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            // Lines past the bottom edge still advance the bar but draw nothing.
            if y - HEADLINE_SIZE < h {
                cmds.push(DrawCommand::Text {
                    text: line,
                    x: MARGIN_X,
                    y,
                    size: HEADLINE_SIZE,
                    bold: false,
                    paint: Paint::opaque(palette.headline),
                    glow: None,
                });
            }
            if i + 1 < count {
                y += HEADLINE_LINE_HEIGHT;
            }
        }
        cmds.push(DrawCommand::FillRect {
            x: MARGIN_X,
            y: y + 60.0,
            w: 120.0,
            h: 8.0,
            paint: Paint::opaque(accent),
        });

        // Watermark
        cmds.push(DrawCommand::Text {
            text: FOOTER_TEXT.to_string(),
            x: MARGIN_X,
            y: h - 80.0,
            size: FOOTER_SIZE,
            bold: true,
            paint: Paint::opaque(palette.footer),
            glow: None,
        });

        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BrandColor;

    fn strategy(headline: &str, stats: &str) -> StrategyResult {
        StrategyResult {
            headline: headline.into(),
            tweet_body: "body".into(),
            stats: stats.into(),
            stat_label: "Funding".into(),
            hashtags: "#a #b #c".into(),
            brand_color: BrandColor::Emerald,
        }
    }

    fn per_char(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn wrap_is_greedy() {
        // Budget 10 "chars" including the trailing space of the candidate.
        let lines = wrap_text("aaa bbb ccc ddd", 10.0, per_char);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn overlong_word_sits_alone() {
        let lines = wrap_text("hi supercalifragilistic yo", 10.0, per_char);
        assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
        let lines = wrap_text("supercalifragilistic", 10.0, per_char);
        assert_eq!(lines, vec!["supercalifragilistic"]);
    }

    #[test]
    fn wrap_of_empty_text_is_empty() {
        assert!(wrap_text("   ", 10.0, per_char).is_empty());
    }

    #[test]
    fn stat_size_switches_on_length() {
        let s = strategy("h", "$5M");
        assert_eq!(PosterLayout::new(&s, PosterStyle::Dark).stat_size(), 250.0);
        let s = strategy("h", "$120.5M");
        assert_eq!(PosterLayout::new(&s, PosterStyle::Dark).stat_size(), 180.0);
    }

    #[test]
    fn dark_command_order() {
        let s = strategy("Ship faster", "$5M");
        let cmds = PosterLayout::new(&s, PosterStyle::Dark).commands();
        let kinds: Vec<&str> = cmds
            .iter()
            .map(|c| match c {
                DrawCommand::Background(_) => "bg",
                DrawCommand::RadialGlow { .. } => "glow",
                DrawCommand::Grid { .. } => "grid",
                DrawCommand::Ring { .. } => "ring",
                DrawCommand::VerticalGradient { .. } => "panel",
                DrawCommand::FillRect { .. } => "rect",
                DrawCommand::StrokeRect { .. } => "stroke",
                DrawCommand::RoundedRect { .. } => "pill",
                DrawCommand::Text { .. } => "text",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "bg", "glow", "glow", "grid", "ring", "panel", "pill", "text", "text", "text",
                "rect", "text"
            ]
        );
    }

    #[test]
    fn pill_width_follows_label() {
        let s = strategy("h", "$5M");
        let cmds = PosterLayout::new(&s, PosterStyle::Dark).commands();
        let pill = cmds
            .iter()
            .find_map(|c| match c {
                DrawCommand::RoundedRect { w, .. } => Some(*w),
                _ => None,
            })
            .unwrap();
        assert!((pill - (measure_text("FUNDING", LABEL_SIZE) + 60.0)).abs() < 1e-3);
    }

    #[test]
    fn underline_follows_last_headline_line() {
        // 64 px * 0.6 = 38.4 px per char; 900 px fits 23 chars.
        let s = strategy(
            "Autonomous agents now draft every single launch plan for you",
            "10x",
        );
        let layout = PosterLayout::new(&s, PosterStyle::Dark);
        let lines = layout.headline_lines();
        assert!(lines.len() >= 3);
        for line in &lines {
            assert!(measure_text(&format!("{line} "), HEADLINE_SIZE) <= HEADLINE_MAX_WIDTH);
        }
        let bar_y = layout
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::FillRect { w, y, .. } if *w == 120.0 => Some(*y),
                _ => None,
            })
            .unwrap();
        let last = HEADLINE_BASELINE + (lines.len() - 1) as f32 * HEADLINE_LINE_HEIGHT;
        assert_eq!(bar_y, last + 60.0);
    }

    #[test]
    fn headline_lines_below_the_canvas_are_dropped() {
        let long = "word ".repeat(20_000);
        let cmds = PosterLayout::new(&strategy(&long, "1"), PosterStyle::Dark).commands();
        let headline_texts = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { size, .. } if *size == HEADLINE_SIZE))
            .count();
        // Baselines 950, 1030, ... up to the first one whose top passes 1350.
        assert_eq!(headline_texts, 6);
    }

    #[test]
    fn light_style_uses_panel_and_no_glow() {
        let s = strategy("h", "$5M");
        let cmds = PosterLayout::new(&s, PosterStyle::Light).commands();
        assert_eq!(
            cmds[0],
            DrawCommand::Background(Paint::opaque([0xf4, 0xf4, 0xf5]))
        );
        assert!(cmds
            .iter()
            .any(|c| matches!(c, DrawCommand::StrokeRect { width, .. } if *width == 2.0)));
        assert!(!cmds
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { glow: Some(_), .. })));
    }

    #[test]
    fn accent_comes_from_brand_colour() {
        let s = strategy("h", "$5M");
        let cmds = PosterLayout::new(&s, PosterStyle::Dark).commands();
        match &cmds[1] {
            DrawCommand::RadialGlow { paint, .. } => {
                assert_eq!(paint.rgb, [0x10, 0xb9, 0x81]);
                assert_eq!(paint.alpha, 0.3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
