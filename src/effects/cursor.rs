use std::cell::Cell;

use kurbo::Circle;

use crate::config::model::{ConfigModel, CursorKind, CursorParams};
use crate::effects::{Effect, EffectCtx, PaintCtx, Reconfigure, Resources};
use crate::foundation::core::{Affine, EffectKind, Point, Size};
use crate::host::{EventKind, HostEvent};
use crate::render::display::Layer;

/// Outer ring diameter, border included.
pub const RING_DIAMETER: f64 = 32.0;
/// Outer ring border width.
pub const RING_BORDER: f64 = 2.0;
/// Inner dot diameter.
pub const DOT_DIAMETER: f64 = 8.0;
/// Custom cursor images are drawn at this size, centered on the pointer.
pub const IMAGE_SIZE: f64 = 32.0;

/// Replacement for the native pointer.
///
/// `custom` draws a ring and dot (or the configured image) at the pointer; `hidden` draws
/// nothing. Both suppress the native cursor on the host element for as long as they are mounted.
#[derive(Debug)]
pub struct CursorOverlay {
    params: CursorParams,
    position: Option<Point>,
    pending: Option<Point>,
    visible: bool,
    res: Resources,
    image_fallback_logged: Cell<bool>,
}

impl CursorOverlay {
    pub(crate) fn new(params: CursorParams) -> Self {
        Self {
            params,
            position: None,
            pending: None,
            visible: false,
            res: Resources::new(EffectKind::Cursor),
            image_fallback_logged: Cell::new(false),
        }
    }

    /// Drawn position, if the overlay is showing.
    pub fn visible_at(&self) -> Option<Point> {
        if self.visible && self.params.kind == CursorKind::Custom {
            self.position
        } else {
            None
        }
    }

    fn draws(&self) -> bool {
        self.params.kind == CursorKind::Custom
    }
}

impl Effect for CursorOverlay {
    fn kind(&self) -> EffectKind {
        EffectKind::Cursor
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn mount(&mut self, ctx: &mut EffectCtx<'_>) {
        ctx.host.suppress_cursor(EffectKind::Cursor);
        if self.draws() {
            self.res.listen(
                ctx.host,
                &[
                    EventKind::PointerMove,
                    EventKind::PointerEnter,
                    EventKind::PointerLeave,
                ],
            );
        }
    }

    fn unmount(&mut self, ctx: &mut EffectCtx<'_>) {
        self.res.release(ctx.host, ctx.scheduler);
        ctx.host.restore_cursor(EffectKind::Cursor);
        self.position = None;
        self.pending = None;
        self.visible = false;
    }

    fn reconfigure(&mut self, config: &ConfigModel, _ctx: &mut EffectCtx<'_>) -> Reconfigure {
        let next = &config.cursor;
        if next.kind != self.params.kind {
            return Reconfigure::Remount;
        }
        if next.image_ref != self.params.image_ref {
            self.image_fallback_logged.set(false);
        }
        self.params = next.clone();
        Reconfigure::Applied
    }

    fn on_event(&mut self, event: &HostEvent, ctx: &mut EffectCtx<'_>) {
        match (event.kind, event.local) {
            (EventKind::PointerMove, Some(local)) => {
                self.pending = Some(local);
                self.res.request_frame(ctx.scheduler);
            }
            (EventKind::PointerEnter, _) => {
                // The stale exit position stays hidden until the entry move commits.
                self.visible = false;
            }
            (EventKind::PointerLeave, _) => {
                self.visible = false;
                self.pending = None;
                self.res.cancel_frame(ctx.scheduler);
            }
            _ => {}
        }
    }

    fn on_frame(&mut self, _now_ms: f64, _ctx: &mut EffectCtx<'_>) {
        if let Some(p) = self.pending.take() {
            self.position = Some(p);
            self.visible = true;
        }
    }

    fn paint(&self, ctx: &PaintCtx<'_>) -> Option<Layer> {
        let at = self.visible_at()?;
        let mut layer = ctx.layer(EffectKind::Cursor);

        if let Some(url) = &self.params.image_ref {
            match ctx.assets.resolve(url) {
                Some(id) => {
                    layer.image_centered(id, at, Size::new(IMAGE_SIZE, IMAGE_SIZE), 0.0, 1.0);
                    return Some(layer);
                }
                None => {
                    if !self.image_fallback_logged.replace(true) {
                        tracing::debug!(url = %url, "cursor image unavailable; drawing ring");
                    }
                }
            }
        }

        let color = self.params.color;
        let ring_radius = (RING_DIAMETER - RING_BORDER) / 2.0;
        layer.stroke(&Circle::new(at, ring_radius), Affine::IDENTITY, RING_BORDER, color);
        layer.fill(&Circle::new(at, DOT_DIAMETER / 2.0), Affine::IDENTITY, color);
        Some(layer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/cursor.rs"]
mod tests;
