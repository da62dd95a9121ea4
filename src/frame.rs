// Frame renderer
//
// Deterministic, time-driven drawing: the output depends only on the
// animation state, the canvas size and the mode label.

use skia_safe::{Color, Font, FontMgr, FontStyle, Paint, Rect};

use crate::canvas::CanvasSpec;
use crate::mode::Mode;

/// Elapsed-time accumulator advanced once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    elapsed: f64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(elapsed: f64) -> Self {
        Self {
            elapsed: elapsed.max(0.0),
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Negative or non-finite deltas are ignored so time never runs backwards.
    pub fn advance(&mut self, delta: f64) {
        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }
    }
}

/// Width of the progress bar: `width * (0.5 + 0.5 * sin(2t))`, always in `[0, width]`.
pub fn progress_width(width: f32, elapsed: f64) -> f32 {
    let fraction = 0.5 + 0.5 * (2.0 * elapsed).sin();
    (f64::from(width) * fraction.clamp(0.0, 1.0)) as f32
}

pub const TITLE: &str = "Skia on the host Vulkan device";

/// Paints and fonts created once and reused every frame.
pub struct FrameRenderer {
    background: Color,
    bar_paint: Paint,
    text_paint: Paint,
    title_font: Font,
    label_font: Font,
}

impl FrameRenderer {
    pub fn new(background: Color) -> Self {
        let mut bar_paint = Paint::default();
        bar_paint.set_anti_alias(true);
        bar_paint.set_color(Color::from_argb(255, 72, 190, 120));

        let mut text_paint = Paint::default();
        text_paint.set_anti_alias(true);
        text_paint.set_color(Color::from_argb(255, 236, 238, 242));

        Self {
            background,
            bar_paint,
            text_paint,
            title_font: load_font(22.0),
            label_font: load_font(16.0),
        }
    }

    pub fn draw(&self, canvas: &skia_safe::Canvas, spec: CanvasSpec, state: &AnimationState, mode: Mode) {
        let width = spec.width as f32;
        let height = spec.height as f32;

        canvas.clear(self.background);

        let bar_height = (height * 0.15).max(4.0);
        let bar = Rect::from_xywh(0.0, height * 0.45, progress_width(width, state.elapsed()), bar_height);
        let radius = bar_height / 2.0;
        canvas.draw_round_rect(bar, radius, radius, &self.bar_paint);

        canvas.draw_str(TITLE, (16.0, 32.0), &self.title_font, &self.text_paint);
        canvas.draw_str(
            format!("t = {:.2}s", state.elapsed()),
            (16.0, height - 44.0),
            &self.label_font,
            &self.text_paint,
        );
        canvas.draw_str(
            format!("mode: {}", mode.label()),
            (16.0, height - 18.0),
            &self.label_font,
            &self.text_paint,
        );
    }
}

fn load_font(size: f32) -> Font {
    match FontMgr::new().legacy_make_typeface(None::<&str>, FontStyle::normal()) {
        Some(typeface) => Font::from_typeface(typeface, size),
        None => {
            log::warn!("No system typeface available; labels will not render");
            let mut font = Font::default();
            font.set_size(size);
            font
        }
    }
}
