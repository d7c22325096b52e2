pub(crate) mod card;
pub(crate) mod click;
pub(crate) mod click_variants;
pub(crate) mod cursor;
pub(crate) mod particles;
pub(crate) mod trail;

use crate::assets::store::AssetStore;
use crate::config::model::{CardPosition, ConfigModel};
use crate::foundation::core::{EffectKind, Size};
use crate::foundation::math::RandomSource;
use crate::host::{EventKind, Host, HostEvent, ListenerId, Positioning};
use crate::render::display::Layer;
use crate::runtime::scheduler::{FiredTimer, Scheduler, TimerId};

/// Device-dependent fidelity limits resolved once per renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Fidelity {
    /// Upper bound on simulated particles, when degraded.
    pub(crate) particle_cap: Option<u32>,
    /// Draw every Nth particle frame.
    pub(crate) frame_skip: u32,
}

impl Default for Fidelity {
    fn default() -> Self {
        Self {
            particle_cap: None,
            frame_skip: 1,
        }
    }
}

/// Something an effect reports back to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum EffectOutput {
    /// A card drag was released at this position.
    CardPositionCommitted(CardPosition),
}

/// Mutable services handed to an effect while it reacts to input, timers or frames.
pub(crate) struct EffectCtx<'a> {
    pub(crate) host: &'a mut Host,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) rng: &'a mut dyn RandomSource,
    pub(crate) fidelity: Fidelity,
    pub(crate) outbox: &'a mut Vec<EffectOutput>,
}

/// Read-only view used when building the display list.
pub(crate) struct PaintCtx<'a> {
    pub(crate) size: Size,
    pub(crate) positioning: Positioning,
    pub(crate) now_ms: f64,
    pub(crate) assets: &'a AssetStore,
}

impl PaintCtx<'_> {
    pub(crate) fn layer(&self, kind: EffectKind) -> Layer {
        Layer::new(
            crate::render::display::LayerKind::Effect(kind),
            layer_z(kind),
            self.positioning,
        )
    }
}

/// Outcome of pushing a new config into a mounted effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reconfigure {
    /// Change absorbed in place.
    Applied,
    /// The effect must be torn down and mounted again.
    Remount,
}

/// One independently mounted visual effect.
///
/// An effect owns every listener, frame request and timer it registers, always through its
/// [`Resources`], so that `unmount` can release them synchronously.
pub(crate) trait Effect: std::fmt::Debug {
    fn kind(&self) -> EffectKind;

    fn as_any(&self) -> &dyn std::any::Any;

    fn mount(&mut self, ctx: &mut EffectCtx<'_>);

    fn unmount(&mut self, ctx: &mut EffectCtx<'_>);

    fn reconfigure(&mut self, config: &ConfigModel, ctx: &mut EffectCtx<'_>) -> Reconfigure;

    fn on_event(&mut self, event: &HostEvent, ctx: &mut EffectCtx<'_>);

    fn on_timer(&mut self, _timer: &FiredTimer, _ctx: &mut EffectCtx<'_>) {}

    fn on_frame(&mut self, _now_ms: f64, _ctx: &mut EffectCtx<'_>) {}

    fn paint(&self, ctx: &PaintCtx<'_>) -> Option<Layer>;
}

/// Stacking order of effect layers inside the host.
pub(crate) fn layer_z(kind: EffectKind) -> i32 {
    match kind {
        EffectKind::Particles => 10,
        EffectKind::Card => 20,
        EffectKind::Trail => 30,
        EffectKind::Click => 40,
        EffectKind::Cursor => 50,
    }
}

/// Registrations held by one effect.
#[derive(Debug)]
pub(crate) struct Resources {
    owner: EffectKind,
    listeners: Vec<ListenerId>,
    timers: Vec<TimerId>,
}

impl Resources {
    pub(crate) fn new(owner: EffectKind) -> Self {
        Self {
            owner,
            listeners: Vec::new(),
            timers: Vec::new(),
        }
    }

    pub(crate) fn listen(&mut self, host: &mut Host, kinds: &[EventKind]) {
        for &kind in kinds {
            self.listeners.push(host.subscribe(self.owner, kind));
        }
    }

    pub(crate) fn request_frame(&self, scheduler: &mut Scheduler) {
        scheduler.request_frame(self.owner);
    }

    pub(crate) fn cancel_frame(&self, scheduler: &mut Scheduler) {
        scheduler.cancel_frame(self.owner);
    }

    pub(crate) fn timeout(&mut self, scheduler: &mut Scheduler, delay_ms: f64, tag: u64) -> TimerId {
        let id = scheduler.set_timeout(self.owner, delay_ms, tag);
        self.timers.push(id);
        id
    }

    pub(crate) fn interval(&mut self, scheduler: &mut Scheduler, period_ms: f64, tag: u64) -> TimerId {
        let id = scheduler.set_interval(self.owner, period_ms, tag);
        self.timers.push(id);
        id
    }

    /// Forget a one-shot timer the scheduler already released.
    pub(crate) fn settle(&mut self, id: TimerId) {
        self.timers.retain(|&t| t != id);
    }

    /// Drop every listener, timer and frame request.
    pub(crate) fn release(&mut self, host: &mut Host, scheduler: &mut Scheduler) {
        for id in self.listeners.drain(..) {
            host.unsubscribe(id);
        }
        for id in self.timers.drain(..) {
            scheduler.clear_timer(id);
        }
        scheduler.release_owner(self.owner);
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn timer_count(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/resources.rs"]
mod tests;

#[cfg(test)]
#[path = "../../tests/unit/effects/harness.rs"]
pub(crate) mod harness;
