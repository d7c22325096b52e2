use std::collections::VecDeque;

use kurbo::Circle;

use crate::config::color::Color;
use crate::config::model::{ConfigModel, TrailParams};
use crate::effects::{Effect, EffectCtx, PaintCtx, Reconfigure, Resources};
use crate::foundation::core::{EffectKind, Point};
use crate::host::{EventKind, HostEvent};
use crate::render::display::Layer;
use crate::runtime::scheduler::{FiredTimer, TimerId};

/// Decay check cadence.
pub const DECAY_INTERVAL_MS: f64 = 30.0;
/// Idle time after which the trail starts melting.
pub const IDLE_THRESHOLD_MS: f64 = 50.0;
/// Points removed per decay tick.
pub const DECAY_BATCH: usize = 3;
/// Hue advance per recorded point, degrees.
pub const RAINBOW_STEP_DEG: f64 = 12.0;

/// Smallest rendered dot, as a fraction of the configured size, when fading.
const MIN_FADE_SCALE: f64 = 0.3;

/// One recorded pointer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    /// Host-local position.
    pub position: Point,
    /// Virtual time the sample was recorded.
    pub at_ms: f64,
    /// Hue captured at creation, degrees.
    pub hue: f64,
}

/// Decaying sequence of recent pointer positions, oldest first.
#[derive(Debug)]
pub struct PointerTrail {
    params: TrailParams,
    points: VecDeque<TrailPoint>,
    pending: Option<(Point, f64)>,
    last_move_ms: f64,
    hue: f64,
    decay: Option<TimerId>,
    res: Resources,
}

impl PointerTrail {
    pub(crate) fn new(params: TrailParams) -> Self {
        Self {
            params,
            points: VecDeque::new(),
            pending: None,
            last_move_ms: f64::NEG_INFINITY,
            hue: 0.0,
            decay: None,
            res: Resources::new(EffectKind::Trail),
        }
    }

    /// Points currently alive, oldest first.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &TrailPoint> {
        self.points.iter()
    }

    /// Number of live points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn record(&mut self, position: Point, at_ms: f64) {
        self.points.push_back(TrailPoint {
            position,
            at_ms,
            hue: self.hue,
        });
        if self.params.rainbow {
            self.hue = (self.hue + RAINBOW_STEP_DEG) % 360.0;
        }
        self.evict_to_capacity();
    }

    fn evict_to_capacity(&mut self) {
        let cap = self.params.length as usize;
        while self.points.len() > cap {
            self.points.pop_front();
        }
    }

    fn color_of(&self, point: &TrailPoint) -> Color {
        if self.params.rainbow {
            Color::from_hsl(point.hue, 1.0, 0.5, 1.0)
        } else {
            self.params.color
        }
    }
}

impl Effect for PointerTrail {
    fn kind(&self) -> EffectKind {
        EffectKind::Trail
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn mount(&mut self, ctx: &mut EffectCtx<'_>) {
        self.res
            .listen(ctx.host, &[EventKind::PointerMove, EventKind::PointerLeave]);
        self.decay = Some(self.res.interval(ctx.scheduler, DECAY_INTERVAL_MS, 0));
    }

    fn unmount(&mut self, ctx: &mut EffectCtx<'_>) {
        self.res.release(ctx.host, ctx.scheduler);
        self.decay = None;
        self.points.clear();
        self.pending = None;
    }

    fn reconfigure(&mut self, config: &ConfigModel, _ctx: &mut EffectCtx<'_>) -> Reconfigure {
        self.params = config.trail.clone();
        self.evict_to_capacity();
        Reconfigure::Applied
    }

    fn on_event(&mut self, event: &HostEvent, ctx: &mut EffectCtx<'_>) {
        match (event.kind, event.local) {
            (EventKind::PointerMove, Some(local)) => {
                self.last_move_ms = event.at_ms;
                // Samples coalesce until the next animation frame.
                self.pending = Some((local, event.at_ms));
                self.res.request_frame(ctx.scheduler);
            }
            (EventKind::PointerLeave, _) => {
                self.points.clear();
                self.pending = None;
                self.res.cancel_frame(ctx.scheduler);
            }
            _ => {}
        }
    }

    fn on_timer(&mut self, timer: &FiredTimer, _ctx: &mut EffectCtx<'_>) {
        if Some(timer.id) != self.decay {
            return;
        }
        if timer.at_ms - self.last_move_ms > IDLE_THRESHOLD_MS {
            let n = DECAY_BATCH.min(self.points.len());
            self.points.drain(..n);
        }
    }

    fn on_frame(&mut self, _now_ms: f64, _ctx: &mut EffectCtx<'_>) {
        if let Some((position, at_ms)) = self.pending.take() {
            self.record(position, at_ms);
        }
    }

    fn paint(&self, ctx: &PaintCtx<'_>) -> Option<Layer> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let mut layer = ctx.layer(EffectKind::Trail);
        for (i, point) in self.points.iter().enumerate() {
            let rank = (i as f64 + 1.0) / n;
            let (alpha, scale) = if self.params.fade {
                (rank, MIN_FADE_SCALE + (1.0 - MIN_FADE_SCALE) * rank)
            } else {
                (1.0, 1.0)
            };
            let radius = self.params.dot_size * scale / 2.0;
            layer.fill(
                &Circle::new(point.position, radius),
                kurbo::Affine::IDENTITY,
                self.color_of(point).fade(alpha),
            );
        }
        Some(layer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/trail.rs"]
mod tests;
