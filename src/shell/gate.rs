use std::f64::consts::TAU;

use kurbo::BezPath;

use crate::config::color::Color;
use crate::foundation::core::{Affine, Rect, Size};
use crate::host::Positioning;
use crate::render::display::{Layer, LayerKind};

/// Blur applied to the background behind a closed gate.
pub const GATE_BLUR_PX: f64 = 24.0;
/// Period of the enter glyph pulse.
pub const PULSE_PERIOD_MS: f64 = 2000.0;
const GLYPH_SIZE: f64 = 48.0;

/// Where the page is being shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ViewMode {
    /// Public profile URL.
    #[default]
    Public,
    /// Editor live preview.
    Preview,
}

/// "Click to enter" consent gate.
///
/// The preview never gates. On the public page the gate is closed while `click_to_enter` is set
/// and nobody has clicked yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryGate {
    mode: ViewMode,
    click_to_enter: bool,
    open: bool,
}

impl EntryGate {
    /// Gate for `mode`, armed when `click_to_enter` is set.
    pub fn new(mode: ViewMode, click_to_enter: bool) -> Self {
        Self {
            mode,
            click_to_enter,
            open: Self::opens_immediately(mode, click_to_enter),
        }
    }

    fn opens_immediately(mode: ViewMode, click_to_enter: bool) -> bool {
        mode == ViewMode::Preview || !click_to_enter
    }

    /// Whether the page content is showing.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The visitor clicked. Returns `true` when this opened the gate.
    pub fn enter(&mut self) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        tracing::debug!("entry gate opened");
        true
    }

    /// Apply a changed `click_to_enter` flag; re-arms the gate when the flag changes.
    pub fn set_click_to_enter(&mut self, click_to_enter: bool) {
        if click_to_enter == self.click_to_enter {
            return;
        }
        self.click_to_enter = click_to_enter;
        self.open = Self::opens_immediately(self.mode, click_to_enter);
        tracing::debug!(click_to_enter, open = self.open, "entry gate re-armed");
    }

    /// Dimmed overlay with a pulsing enter glyph; blurs the background below it.
    pub fn paint(&self, size: Size, now_ms: f64, z: i32, positioning: Positioning) -> Layer {
        let mut layer = Layer::new(LayerKind::Gate, z, positioning).with_backdrop_blur(GATE_BLUR_PX, None);
        layer.fill(&Rect::from_origin_size((0.0, 0.0), size), Affine::IDENTITY, Color::BLACK.with_alpha(0.5));

        let pulse = 0.75 + 0.25 * (TAU * now_ms / PULSE_PERIOD_MS).cos();
        let center = Rect::from_origin_size((0.0, 0.0), size).center();
        let placement = Affine::translate(center.to_vec2()) * Affine::scale(GLYPH_SIZE / 24.0);
        layer.fill(&pointer_glyph(), placement, Color::WHITE.fade(pulse));
        layer
    }
}

/// Arrow pointer on a 24 px grid centered on the origin.
fn pointer_glyph() -> BezPath {
    let mut p = BezPath::new();
    p.move_to((-6.0, -10.0));
    p.line_to((8.0, 2.0));
    p.line_to((1.5, 3.0));
    p.line_to((5.0, 10.0));
    p.line_to((2.0, 11.5));
    p.line_to((-1.5, 4.5));
    p.line_to((-6.0, 9.0));
    p.close_path();
    p
}

#[cfg(test)]
#[path = "../../tests/unit/shell/gate.rs"]
mod tests;
