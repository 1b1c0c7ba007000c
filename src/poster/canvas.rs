//! Raster backend: interprets [`DrawCommand`]s onto an `RgbaImage`.
//!
//! Compositing is straight-alpha source-over. Shapes are not antialiased;
//! a pixel is covered when its centre falls inside the shape.

use super::font;
use super::layout::{DrawCommand, Paint, Stop};
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

/// Downscale factor for glow masks. Blurring at quarter resolution keeps a
/// 40 px shadow cheap; the halo is soft enough that the upsample is invisible.
const GLOW_SCALE: f32 = 4.0;

pub struct Canvas {
    img: RgbaImage,
}

impl Canvas {
    /// A fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    /// Execute a whole command list in order.
    pub fn run(&mut self, commands: &[DrawCommand]) {
        for cmd in commands {
            self.execute(cmd);
        }
    }

    pub fn execute(&mut self, cmd: &DrawCommand) {
        match cmd {
            DrawCommand::Background(paint) => {
                let (w, h) = (self.width() as f32, self.height() as f32);
                self.fill_rect(0.0, 0.0, w, h, *paint);
            }
            DrawCommand::RadialGlow {
                cx,
                cy,
                radius,
                paint,
            } => self.radial_glow(*cx, *cy, *radius, *paint),
            DrawCommand::Grid { spacing, paint } => self.grid(*spacing, *paint),
            DrawCommand::Ring {
                cx,
                cy,
                radius,
                width,
                paint,
            } => self.ring(*cx, *cy, *radius, *width, *paint),
            DrawCommand::VerticalGradient { y, height, stops } => {
                self.vertical_gradient(*y, *height, stops)
            }
            DrawCommand::FillRect { x, y, w, h, paint } => self.fill_rect(*x, *y, *w, *h, *paint),
            DrawCommand::StrokeRect {
                x,
                y,
                w,
                h,
                width,
                paint,
            } => self.stroke_rect(*x, *y, *w, *h, *width, *paint),
            DrawCommand::RoundedRect {
                x,
                y,
                w,
                h,
                radius,
                paint,
            } => self.rounded_rect(*x, *y, *w, *h, *radius, *paint),
            DrawCommand::Text {
                text,
                x,
                y,
                size,
                bold,
                paint,
                glow,
            } => {
                if let Some((glow_paint, blur)) = glow {
                    self.glow_text(text, *x, *y, *size, *bold, *glow_paint, *blur);
                }
                self.text(text, *x, *y, *size, *bold, *paint);
            }
        }
    }

    // ── Primitives ───────────────────────────────────────────────────────

    fn blend(&mut self, x: i32, y: i32, rgb: [u8; 3], alpha: f32) {
        if x < 0 || y < 0 || alpha <= 0.0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width() || y >= self.height() {
            return;
        }
        let a = alpha.min(1.0);
        let dst = self.img.get_pixel_mut(x, y);
        let da = dst[3] as f32 / 255.0;
        let out_a = a + da * (1.0 - a);
        if out_a <= 0.0 {
            return;
        }
        for i in 0..3 {
            let c = (rgb[i] as f32 * a + dst[i] as f32 * da * (1.0 - a)) / out_a;
            dst[i] = c.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Integer pixel span covering `[start, start + len)` clipped to `0..limit`.
    fn span(start: f32, len: f32, limit: u32) -> std::ops::Range<i32> {
        let lo = start.round().max(0.0) as i32;
        let hi = (start + len).round().min(limit as f32) as i32;
        lo..hi.max(lo)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        for py in Self::span(y, h, self.height()) {
            for px in Self::span(x, w, self.width()) {
                self.blend(px, py, paint.rgb, paint.alpha);
            }
        }
    }

    /// Outline centred on the rectangle's edges.
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, width: f32, paint: Paint) {
        let half = width / 2.0;
        self.fill_rect(x - half, y - half, w + width, width, paint);
        self.fill_rect(x - half, y + h - half, w + width, width, paint);
        self.fill_rect(x - half, y + half, width, h - width, paint);
        self.fill_rect(x + w - half, y + half, width, h - width, paint);
    }

    fn radial_glow(&mut self, cx: f32, cy: f32, radius: f32, paint: Paint) {
        if radius <= 0.0 {
            return;
        }
        let ys = Self::span(cy - radius, 2.0 * radius, self.height());
        let xs = Self::span(cx - radius, 2.0 * radius, self.width());
        for py in ys {
            for px in xs.clone() {
                let d = dist(px, py, cx, cy);
                if d < radius {
                    self.blend(px, py, paint.rgb, paint.alpha * (1.0 - d / radius));
                }
            }
        }
    }

    fn grid(&mut self, spacing: u32, paint: Paint) {
        if spacing == 0 {
            return;
        }
        let (w, h) = (self.width() as i32, self.height() as i32);
        for x in (0..w).step_by(spacing as usize) {
            for y in 0..h {
                self.blend(x, y, paint.rgb, paint.alpha);
            }
        }
        for y in (0..h).step_by(spacing as usize) {
            for x in 0..w {
                self.blend(x, y, paint.rgb, paint.alpha);
            }
        }
    }

    fn ring(&mut self, cx: f32, cy: f32, radius: f32, width: f32, paint: Paint) {
        let outer = radius + width;
        let ys = Self::span(cy - outer, 2.0 * outer, self.height());
        let xs = Self::span(cx - outer, 2.0 * outer, self.width());
        for py in ys {
            for px in xs.clone() {
                if (dist(px, py, cx, cy) - radius).abs() <= width / 2.0 {
                    self.blend(px, py, paint.rgb, paint.alpha);
                }
            }
        }
    }

    fn vertical_gradient(&mut self, y: f32, height: f32, stops: &[Stop]) {
        if height <= 0.0 || stops.is_empty() {
            return;
        }
        let width = self.width() as i32;
        for py in Self::span(y, height, self.height()) {
            let t = ((py as f32 + 0.5 - y) / height).clamp(0.0, 1.0);
            let paint = sample_stops(stops, t);
            for px in 0..width {
                self.blend(px, py, paint.rgb, paint.alpha);
            }
        }
    }

    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, paint: Paint) {
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        for py in Self::span(y, h, self.height()) {
            for px in Self::span(x, w, self.width()) {
                let (fx, fy) = (px as f32 + 0.5, py as f32 + 0.5);
                let qx = fx.clamp(x + r, x + w - r);
                let qy = fy.clamp(y + r, y + h - r);
                if (fx - qx).hypot(fy - qy) <= r {
                    self.blend(px, py, paint.rgb, paint.alpha);
                }
            }
        }
    }

    fn text(&mut self, text: &str, x: f32, baseline: f32, size: f32, bold: bool, paint: Paint) {
        let clip = (self.width(), self.height());
        font::for_each_pixel(text, x, baseline, size, bold, clip, |px, py| {
            self.blend(px, py, paint.rgb, paint.alpha)
        });
    }

    /// Blurred halo under `text`, the raster counterpart of a canvas shadow.
    #[allow(clippy::too_many_arguments)]
    fn glow_text(
        &mut self,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        bold: bool,
        paint: Paint,
        blur: f32,
    ) {
        let sigma = (blur / 2.0).max(1.0);
        let margin = 3.0 * sigma;
        let (w, h) = (self.width() as f32, self.height() as f32);

        // Text box plus margin, clipped to the canvas plus margin so glyphs
        // just off the edge still bleed in.
        let left = (x - margin).max(-margin);
        let right = (x + font::measure_text(text, size) + margin).min(w + margin);
        let top = (baseline - size - margin).max(-margin);
        let bottom = (baseline + size * 0.25 + margin).min(h + margin);
        if right <= left || bottom <= top {
            return;
        }
        let (region_w, region_h) = (right - left, bottom - top);

        let mask_w = (region_w / GLOW_SCALE).ceil().max(1.0) as u32;
        let mask_h = (region_h / GLOW_SCALE).ceil().max(1.0) as u32;
        let mut mask = GrayImage::new(mask_w, mask_h);
        font::for_each_pixel(
            text,
            (x - left) / GLOW_SCALE,
            (baseline - top) / GLOW_SCALE,
            size / GLOW_SCALE,
            bold,
            (mask_w, mask_h),
            |px, py| {
                if px >= 0 && py >= 0 && (px as u32) < mask_w && (py as u32) < mask_h {
                    mask.put_pixel(px as u32, py as u32, Luma([255]));
                }
            },
        );
        let mask = imageops::blur(&mask, sigma / GLOW_SCALE);

        for py in Self::span(top, region_h, self.height()) {
            for px in Self::span(left, region_w, self.width()) {
                let mx = ((px as f32 - left) / GLOW_SCALE) as u32;
                let my = ((py as f32 - top) / GLOW_SCALE) as u32;
                if mx < mask_w && my < mask_h {
                    let coverage = mask.get_pixel(mx, my)[0] as f32 / 255.0;
                    self.blend(px, py, paint.rgb, paint.alpha * coverage);
                }
            }
        }
    }
}

fn dist(px: i32, py: i32, cx: f32, cy: f32) -> f32 {
    (px as f32 + 0.5 - cx).hypot(py as f32 + 0.5 - cy)
}

/// Linearly interpolate colour and alpha between the stops around `t`.
fn sample_stops(stops: &[Stop], t: f32) -> Paint {
    let first = stops[0];
    if t <= first.offset {
        return first.paint;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let k = (t - a.offset) / span;
            let lerp = |p: u8, q: u8| (p as f32 + (q as f32 - p as f32) * k).round() as u8;
            return Paint {
                rgb: [
                    lerp(a.paint.rgb[0], b.paint.rgb[0]),
                    lerp(a.paint.rgb[1], b.paint.rgb[1]),
                    lerp(a.paint.rgb[2], b.paint.rgb[2]),
                ],
                alpha: a.paint.alpha + (b.paint.alpha - a.paint.alpha) * k,
            };
        }
    }
    stops[stops.len() - 1].paint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_canvas(rgb: [u8; 3]) -> Canvas {
        let mut c = Canvas::new(100, 100);
        c.execute(&DrawCommand::Background(Paint::opaque(rgb)));
        c
    }

    fn pixel(c: &Canvas, x: u32, y: u32) -> [u8; 4] {
        c.img.get_pixel(x, y).0
    }

    #[test]
    fn background_is_opaque() {
        let c = opaque_canvas([5, 5, 5]);
        assert_eq!(pixel(&c, 0, 0), [5, 5, 5, 255]);
        assert_eq!(pixel(&c, 99, 99), [5, 5, 5, 255]);
    }

    #[test]
    fn half_alpha_blends_halfway() {
        let mut c = opaque_canvas([0, 0, 0]);
        c.execute(&DrawCommand::FillRect {
            x: 10.0,
            y: 10.0,
            w: 5.0,
            h: 5.0,
            paint: Paint::with_alpha([200, 100, 50], 0.5),
        });
        assert_eq!(pixel(&c, 12, 12), [100, 50, 25, 255]);
        assert_eq!(pixel(&c, 9, 9), [0, 0, 0, 255]);
        assert_eq!(pixel(&c, 15, 15), [0, 0, 0, 255]);
    }

    #[test]
    fn radial_glow_fades_with_distance() {
        let mut c = opaque_canvas([0, 0, 0]);
        c.execute(&DrawCommand::RadialGlow {
            cx: 0.0,
            cy: 0.0,
            radius: 80.0,
            paint: Paint::opaque([255, 0, 0]),
        });
        let near = pixel(&c, 1, 1)[0];
        let mid = pixel(&c, 30, 30)[0];
        let far = pixel(&c, 90, 90)[0];
        assert!(near > mid && mid > far);
        assert_eq!(far, 0);
    }

    #[test]
    fn pill_corners_stay_clear() {
        let mut c = opaque_canvas([0, 0, 0]);
        c.execute(&DrawCommand::RoundedRect {
            x: 10.0,
            y: 10.0,
            w: 60.0,
            h: 20.0,
            radius: 10.0,
            paint: Paint::opaque([0, 255, 0]),
        });
        assert_eq!(pixel(&c, 10, 10), [0, 0, 0, 255]);
        assert_eq!(pixel(&c, 40, 20), [0, 255, 0, 255]);
        assert_eq!(pixel(&c, 11, 20), [0, 255, 0, 255]);
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = [
            Stop {
                offset: 0.0,
                paint: Paint::with_alpha([0, 0, 0], 0.0),
            },
            Stop {
                offset: 0.5,
                paint: Paint::with_alpha([100, 100, 100], 1.0),
            },
        ];
        let p = sample_stops(&stops, 0.25);
        assert_eq!(p.rgb, [50, 50, 50]);
        assert!((p.alpha - 0.5).abs() < 1e-4);
        assert_eq!(sample_stops(&stops, 0.9), stops[1].paint);
    }

    #[test]
    fn glow_spills_outside_the_glyphs() {
        let mut plain = opaque_canvas([0, 0, 0]);
        let mut glowing = opaque_canvas([0, 0, 0]);
        let text = |glow| DrawCommand::Text {
            text: "8".into(),
            x: 40.0,
            y: 60.0,
            size: 30.0,
            bold: true,
            paint: Paint::opaque([255, 255, 255]),
            glow,
        };
        plain.execute(&text(None));
        glowing.execute(&text(Some((Paint::opaque([0, 0, 255]), 20.0))));
        // Left of the glyph cell: untouched without glow, tinted with it.
        assert_eq!(pixel(&plain, 36, 45), [0, 0, 0, 255]);
        assert!(pixel(&glowing, 36, 45)[2] > 0);
    }

    #[test]
    fn glow_mask_is_bounded_by_the_canvas() {
        let (w, h) = (200u32, 100u32);
        let mut c = Canvas::new(w, h);
        c.execute(&DrawCommand::Background(Paint::opaque([0, 0, 0])));
        let started = std::time::Instant::now();
        c.execute(&DrawCommand::Text {
            text: "9".repeat(100_000),
            x: 10.0,
            y: 80.0,
            size: 60.0,
            bold: true,
            paint: Paint::opaque([255, 255, 255]),
            glow: Some((Paint::opaque([0, 0, 255]), 40.0)),
        });
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        // Last column is covered by glyphs or their halo.
        assert_ne!(pixel(&c, w - 1, 60), [0, 0, 0, 255]);
    }
}
