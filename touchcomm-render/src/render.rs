use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tiny_skia::{
    Color, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};
use touchcomm_surface::{vas, ButtonPanel, VasScale};

const TEXT_RGBA: [u8; 4] = [0, 0, 0, 255];

// mid-gray background, black text, blue buttons
fn background() -> Color {
    Color::from_rgba8(128, 128, 128, 255)
}

fn button_fill() -> Color {
    Color::from_rgba8(127, 159, 242, 255)
}

/// Everything one window shows on a given frame. The sequencer owns the
/// state; this is just a view of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceView<'a> {
    pub message: &'a str,
    /// Ceiling-rounded countdown readout for the lower-right corner.
    pub timer_text: Option<&'a str>,
    pub panel: Option<&'a ButtonPanel>,
    pub vas: Option<&'a VasScale>,
}

/// Rasterizes a window's view onto a pixel canvas. Text pixmaps are cached
/// per (string, size) so the per-frame cost is a handful of blits.
pub struct SurfaceRenderer {
    width: u32,
    height: u32,
    font: FontVec,
    text_cache: HashMap<(String, u32), Pixmap>,
}

impl SurfaceRenderer {
    pub fn new(width: u32, height: u32, font_path: &Path) -> Result<Self> {
        let bytes = std::fs::read(font_path)
            .with_context(|| format!("reading font {}", font_path.display()))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|_| anyhow!("font {} is not parseable", font_path.display()))?;
        Ok(Self {
            width,
            height,
            font,
            text_cache: HashMap::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Draws one full frame. These screens are mostly static text, so a
    /// whole-canvas redraw per frame is cheap enough.
    pub fn render(&mut self, canvas: &mut Pixmap, view: &SurfaceView) -> Result<()> {
        canvas.fill(background());

        if !view.message.is_empty() {
            self.draw_multiline(canvas, view.message, (0.5, 0.5), self.px(0.06));
        }
        if let Some(timer) = view.timer_text {
            self.draw_text(canvas, timer, (0.9, 0.9), self.px(0.06));
        }
        if let Some(panel) = view.panel {
            if panel.is_visible() {
                self.draw_panel(canvas, panel);
            }
        }
        if let Some(scale) = view.vas {
            if scale.is_visible() {
                self.draw_vas(canvas, scale);
            }
        }
        Ok(())
    }

    fn px(&self, fraction: f32) -> f32 {
        (fraction * self.height as f32).max(8.0)
    }

    fn draw_panel(&mut self, canvas: &mut Pixmap, panel: &ButtonPanel) {
        let label_px = self.px(0.033);
        let (w, h) = (self.width as f32, self.height as f32);

        let mut outline = Paint::default();
        outline.set_color(Color::from_rgba8(0, 0, 0, 255));
        outline.anti_alias = true;
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };

        for (i, region) in panel.regions().iter().enumerate() {
            let rect = Rect::from_xywh(
                (region.center.0 - region.width / 2.0) * w,
                (region.center.1 - region.height / 2.0) * h,
                region.width * w,
                region.height * h,
            );
            let Some(rect) = rect else { continue };

            let mut fill = Paint::default();
            let mut color = button_fill();
            // hover/selection highlight drops the fill opacity
            if panel.is_highlighted(i) {
                color.set_alpha(0.3);
            }
            fill.set_color(color);
            canvas.fill_rect(rect, &fill, Transform::identity(), None);

            let path = PathBuilder::from_rect(rect);
            canvas.stroke_path(&path, &outline, &stroke, Transform::identity(), None);

            let label = &panel.labels()[i];
            if !label.is_empty() {
                self.draw_text(canvas, label, region.center, label_px);
            }
        }
    }

    fn draw_vas(&mut self, canvas: &mut Pixmap, scale: &VasScale) {
        let (w, h) = (self.width as f32, self.height as f32);
        let mut ink = Paint::default();
        ink.set_color(Color::from_rgba8(0, 0, 0, 255));
        ink.anti_alias = true;

        // question above the line
        self.draw_text(canvas, &scale.question, (0.5, 0.3), self.px(0.05));

        // the line itself plus end ticks
        let y = vas::LINE_Y * h;
        if let Some(line) = Rect::from_xywh(vas::LINE_X0 * w, y - 1.5, (vas::LINE_X1 - vas::LINE_X0) * w, 3.0) {
            canvas.fill_rect(line, &ink, Transform::identity(), None);
        }
        for x in [vas::LINE_X0, vas::LINE_X1] {
            if let Some(tick) = Rect::from_xywh(x * w - 1.5, y - 0.02 * h, 3.0, 0.04 * h) {
                canvas.fill_rect(tick, &ink, Transform::identity(), None);
            }
        }

        // endpoint labels under the ticks
        let label_px = self.px(0.04);
        self.draw_text(canvas, &scale.min_label, (vas::LINE_X0, vas::LINE_Y + 0.08), label_px);
        self.draw_text(canvas, &scale.max_label, (vas::LINE_X1, vas::LINE_Y + 0.08), label_px);

        // marker
        if let Some(m) = scale.marker() {
            let x = (vas::LINE_X0 + m * (vas::LINE_X1 - vas::LINE_X0)) * w;
            if let Some(marker) = Rect::from_xywh(x - 2.0, y - 0.035 * h, 4.0, 0.07 * h) {
                canvas.fill_rect(marker, &ink, Transform::identity(), None);
            }
        }

        // accept box; pre text until a marker exists
        let (ax, ay) = vas::ACCEPT_CENTER;
        if let Some(rect) = Rect::from_xywh(
            (ax - vas::ACCEPT_HALF_WIDTH) * w,
            (ay - vas::ACCEPT_HALF_HEIGHT) * h,
            vas::ACCEPT_HALF_WIDTH * 2.0 * w,
            vas::ACCEPT_HALF_HEIGHT * 2.0 * h,
        ) {
            let mut fill = Paint::default();
            let mut color = button_fill();
            if scale.marker().is_none() {
                color.set_alpha(0.4);
            }
            fill.set_color(color);
            canvas.fill_rect(rect, &fill, Transform::identity(), None);
        }
        let accept_label = if scale.marker().is_none() {
            &scale.accept_pre_text
        } else {
            &scale.accept_text
        };
        self.draw_text(canvas, accept_label, (ax, ay), self.px(0.03));
    }

    fn draw_multiline(&mut self, canvas: &mut Pixmap, text: &str, center: (f32, f32), size_px: f32) {
        let lines: Vec<&str> = text.lines().collect();
        let step = size_px * 1.3 / self.height as f32;
        let top = center.1 - step * (lines.len().saturating_sub(1)) as f32 / 2.0;
        for (i, line) in lines.iter().enumerate() {
            if !line.trim().is_empty() {
                self.draw_text(canvas, line, (center.0, top + i as f32 * step), size_px);
            }
        }
    }

    /// Blits one cached text pixmap centered at a normalized position.
    fn draw_text(&mut self, canvas: &mut Pixmap, text: &str, center: (f32, f32), size_px: f32) {
        let (width, height) = (self.width, self.height);
        let pixmap = self.text_pixmap(text, size_px);
        let x = center.0 * width as f32 - pixmap.width() as f32 / 2.0;
        let y = center.1 * height as f32 - pixmap.height() as f32 / 2.0;
        canvas.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn text_pixmap(&mut self, text: &str, size_px: f32) -> &Pixmap {
        let key = (text.to_string(), size_px.round() as u32);
        if !self.text_cache.contains_key(&key) {
            let pm = rasterize_text(&self.font, text, size_px, TEXT_RGBA);
            self.text_cache.insert(key.clone(), pm);
        }
        &self.text_cache[&key]
    }
}

/// Rasterizes one line of text into a tightly bounded premultiplied pixmap.
fn rasterize_text(font: &FontVec, text: &str, size_px: f32, rgba: [u8; 4]) -> Pixmap {
    let scale = PxScale::from(size_px);
    let scaled = font.as_scaled(scale);

    // layout with the baseline at the ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += scaled.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, scaled.ascent()),
        });
        pen_x += scaled.h_advance(id);
    }

    // union of the outlined pixel bounds
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for glyph in &glyphs {
        if let Some(outlined) = font.outline_glyph(glyph.clone()) {
            let b = outlined.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }
    }
    if min_x == f32::INFINITY {
        return Pixmap::new(1, 1).expect("pixmap");
    }

    let width = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let height = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height).expect("pixmap");

    let stride = width as usize;
    let data = pixmap.pixels_mut();
    for glyph in &glyphs {
        if let Some(outlined) = font.outline_glyph(glyph.clone()) {
            let b = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                if coverage <= f32::EPSILON {
                    return;
                }
                let px = (gx as f32 + b.min.x - min_x).floor() as i32;
                let py = (gy as f32 + b.min.y - min_y).floor() as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }
                let alpha = (coverage * rgba[3] as f32).clamp(0.0, 255.0);
                // premultiplied; overlapping outlines keep the stronger
                // coverage
                let idx = py as usize * stride + px as usize;
                let existing = data[idx].alpha();
                if alpha as u8 > existing {
                    let premul = |c: u8| (c as f32 * alpha / 255.0) as u8;
                    if let Some(c) = tiny_skia::PremultipliedColorU8::from_rgba(
                        premul(rgba[0]),
                        premul(rgba[1]),
                        premul(rgba[2]),
                        alpha as u8,
                    ) {
                        data[idx] = c;
                    }
                }
            });
        }
    }
    pixmap
}
