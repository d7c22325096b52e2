use std::collections::BTreeMap;

use crate::assets::store::AssetStore;
use crate::config::device::RendererOptions;
use crate::config::model::{CardPosition, ClickEffectKind, ConfigModel, CursorKind};
use crate::effects::card::{CardTransform, Tilt};
use crate::effects::click::{ClickBurst, ClickToken};
use crate::effects::cursor::CursorOverlay;
use crate::effects::particles::{Particle, ParticleField};
use crate::effects::trail::{PointerTrail, TrailPoint};
use crate::effects::{Effect, EffectCtx, EffectOutput, Fidelity, PaintCtx, Reconfigure};
use crate::engine::stats::{EffectStats, ResourceStats};
use crate::foundation::core::{EffectKind, Point, Rect, Size};
use crate::foundation::error::FxResult;
use crate::foundation::math::Rng64;
use crate::host::{CursorStyle, Host, HostMode, HostSpec, Positioning, RawInput};
use crate::render::display::{DisplayList, Layer};
use crate::render::{FrameRGBA, RenderBackend};
use crate::runtime::scheduler::{FRAME_INTERVAL_MS, Scheduler};

type PositionCallback = Box<dyn FnMut(CardPosition)>;

/// Services shared by every mounted effect.
#[derive(Debug)]
struct Runtime {
    host: Host,
    scheduler: Scheduler,
    rng: Rng64,
    fidelity: Fidelity,
    outbox: Vec<EffectOutput>,
}

impl Runtime {
    fn ctx(&mut self) -> EffectCtx<'_> {
        EffectCtx {
            host: &mut self.host,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            fidelity: self.fidelity,
            outbox: &mut self.outbox,
        }
    }
}

/// Card geometry as currently laid out.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CardState {
    /// Untilted bounds in host-local pixels.
    pub rect: Rect,
    /// Current tilt.
    pub tilt: Tilt,
    /// Center position, percent of the host.
    pub position: CardPosition,
    /// Whether a drag is in progress.
    pub dragging: bool,
}

/// Handle over every effect of one host region.
///
/// Effects mount, reconfigure and unmount as [`EffectRenderer::update`] pushes new configs; each
/// owns its listeners, frame requests and timers and releases them synchronously on unmount.
/// Time is virtual and only moves through [`EffectRenderer::advance`].
pub struct EffectRenderer {
    config: ConfigModel,
    options: RendererOptions,
    runtime: Runtime,
    effects: BTreeMap<EffectKind, Box<dyn Effect>>,
    lifecycle: BTreeMap<EffectKind, (u64, u64)>,
    assets: AssetStore,
    on_position_change: Option<PositionCallback>,
    disposed: bool,
}

impl std::fmt::Debug for EffectRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRenderer")
            .field("mode", &self.runtime.host.mode())
            .field("mounted", &self.effects.keys().collect::<Vec<_>>())
            .field("now_ms", &self.runtime.scheduler.now_ms())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

/// Build a renderer for `host` and mount the effects `config` enables.
pub fn create_effect_renderer(
    config: ConfigModel,
    host: HostSpec,
    options: RendererOptions,
) -> EffectRenderer {
    EffectRenderer::new(config, host, options)
}

impl EffectRenderer {
    /// See [`create_effect_renderer`].
    pub fn new(config: ConfigModel, host: HostSpec, options: RendererOptions) -> Self {
        let fidelity = resolve_fidelity(&options);
        let rng = options.seed.map_or_else(Rng64::from_entropy, Rng64::new);
        let host = Host::new(host);
        tracing::debug!(mode = ?host.mode(), editable = options.editable, "effect renderer created");

        let mut renderer = Self {
            config: config.clone(),
            options,
            runtime: Runtime {
                host,
                scheduler: Scheduler::new(),
                rng,
                fidelity,
                outbox: Vec::new(),
            },
            effects: BTreeMap::new(),
            lifecycle: BTreeMap::new(),
            assets: AssetStore::new(),
            on_position_change: None,
            disposed: false,
        };
        renderer.apply(config.sanitized());
        renderer
    }

    /// Push a new config. Effects whose predicate flips are mounted or unmounted; the rest
    /// absorb the change in place or remount. Ignored after [`EffectRenderer::dispose`].
    #[tracing::instrument(skip_all, fields(mode = ?self.runtime.host.mode()))]
    pub fn update(&mut self, config: ConfigModel) {
        if self.disposed {
            tracing::debug!("update after dispose ignored");
            return;
        }
        self.apply(config.sanitized());
    }

    fn apply(&mut self, config: ConfigModel) {
        for kind in EffectKind::ALL {
            let wanted = wants(kind, &config, &self.options);
            if !wanted {
                if self.effects.contains_key(&kind) {
                    self.unmount(kind);
                }
                continue;
            }
            let outcome = match self.effects.get_mut(&kind) {
                Some(effect) => effect.reconfigure(&config, &mut self.runtime.ctx()),
                None => {
                    self.mount(kind, &config);
                    continue;
                }
            };
            if outcome == Reconfigure::Remount {
                tracing::debug!(effect = ?kind, "remounting");
                self.unmount(kind);
                self.mount(kind, &config);
            }
        }
        self.config = config;
        self.drain_outbox();
    }

    fn mount(&mut self, kind: EffectKind, config: &ConfigModel) {
        let mut effect = build(kind, config, &self.options);
        effect.mount(&mut self.runtime.ctx());
        self.lifecycle.entry(kind).or_default().0 += 1;
        tracing::debug!(effect = ?kind, "effect mounted");
        self.effects.insert(kind, effect);
    }

    fn unmount(&mut self, kind: EffectKind) {
        if let Some(mut effect) = self.effects.remove(&kind) {
            effect.unmount(&mut self.runtime.ctx());
            self.lifecycle.entry(kind).or_default().1 += 1;
            tracing::debug!(effect = ?kind, "effect unmounted");
        }
    }

    /// Unmount everything. Safe to call any number of times.
    #[tracing::instrument(skip_all)]
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for kind in EffectKind::ALL.into_iter().rev() {
            self.unmount(kind);
        }
        self.runtime.outbox.clear();
        self.disposed = true;
        tracing::debug!("effect renderer disposed");
    }

    /// Whether [`EffectRenderer::dispose`] ran.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Register the callback invoked when a card drag is released.
    pub fn set_on_position_change(&mut self, callback: impl FnMut(CardPosition) + 'static) {
        self.on_position_change = Some(Box::new(callback));
    }

    /// Deliver raw window-space input at the current virtual time.
    pub fn input(&mut self, raw: RawInput) {
        if self.disposed {
            return;
        }
        let now = self.runtime.scheduler.now_ms();
        for event in self.runtime.host.translate(raw, now) {
            for kind in self.runtime.host.listeners().targets(event.kind) {
                if let Some(effect) = self.effects.get_mut(&kind) {
                    effect.on_event(&event, &mut self.runtime.ctx());
                }
            }
        }
        self.drain_outbox();
    }

    /// Pointer moved to a window-space point.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.input(RawInput::Move(Point::new(x, y)));
    }

    /// Pointer pressed at a window-space point.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.input(RawInput::Down(Point::new(x, y)));
    }

    /// Pointer released at a window-space point.
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.input(RawInput::Up(Point::new(x, y)));
    }

    /// Pointer left the host element.
    pub fn pointer_leave(&mut self) {
        self.input(RawInput::Leave);
    }

    /// Viewport resized.
    pub fn resize_window(&mut self, viewport: Size) {
        self.input(RawInput::WindowResize(viewport));
    }

    /// Container element laid out at `rect` (window space).
    pub fn resize_container(&mut self, rect: Rect) {
        self.input(RawInput::ContainerResize(rect));
    }

    /// Move virtual time forward by `dt_ms`: due timers fire in due order, then every pending
    /// frame request runs once.
    pub fn advance(&mut self, dt_ms: f64) {
        if self.disposed {
            return;
        }
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let target = self.runtime.scheduler.now_ms() + dt;

        while let Some(fired) = self.runtime.scheduler.pop_due(target) {
            if let Some(effect) = self.effects.get_mut(&fired.owner) {
                effect.on_timer(&fired, &mut self.runtime.ctx());
            }
        }
        self.runtime.scheduler.advance_clock_to(target);

        for kind in self.runtime.scheduler.take_frame_requests() {
            if let Some(effect) = self.effects.get_mut(&kind) {
                effect.on_frame(target, &mut self.runtime.ctx());
            }
        }
        self.drain_outbox();
    }

    /// Advance by one nominal animation frame.
    pub fn tick(&mut self) {
        self.advance(FRAME_INTERVAL_MS);
    }

    /// Advance by `n` nominal animation frames.
    pub fn run_frames(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    fn drain_outbox(&mut self) {
        for output in std::mem::take(&mut self.runtime.outbox) {
            match output {
                EffectOutput::CardPositionCommitted(position) => {
                    self.config.card.position = position;
                    if let Some(callback) = self.on_position_change.as_mut() {
                        callback(position);
                    }
                }
            }
        }
    }

    /// Current layers of every mounted effect.
    pub fn effect_layers(&self) -> Vec<Layer> {
        self.effect_layers_with(&self.assets)
    }

    /// Like [`EffectRenderer::effect_layers`], resolving images from `assets`.
    pub fn effect_layers_with(&self, assets: &AssetStore) -> Vec<Layer> {
        let ctx = PaintCtx {
            size: self.runtime.host.size(),
            positioning: self.runtime.host.positioning(),
            now_ms: self.runtime.scheduler.now_ms(),
            assets,
        };
        self.effects.values().filter_map(|e| e.paint(&ctx)).collect()
    }

    /// Display list of the effect layers alone.
    pub fn display_list(&self) -> DisplayList {
        let mut list = DisplayList::new(self.runtime.host.size());
        for layer in self.effect_layers() {
            list.push(layer);
        }
        list
    }

    /// Rasterize the effect layers at the effective device pixel ratio.
    pub fn render(&self, backend: &mut dyn RenderBackend) -> FxResult<FrameRGBA> {
        backend.render_display_list(&self.display_list(), &self.assets, self.pixel_ratio())
    }

    /// Device pixels per CSS pixel after degradation.
    pub fn pixel_ratio(&self) -> f64 {
        self.options.degradation.pixel_ratio(&self.options.device)
    }

    /// Native cursor style the host element should carry.
    pub fn cursor_style(&self) -> CursorStyle {
        self.runtime.host.cursor_style()
    }

    /// Setup and teardown accounting per effect.
    pub fn resource_stats(&self) -> ResourceStats {
        let mut stats = ResourceStats::default();
        for kind in EffectKind::ALL {
            let (mounts, unmounts) = self.lifecycle.get(&kind).copied().unwrap_or_default();
            let listeners = self.runtime.host.listeners();
            let scheduler = &self.runtime.scheduler;
            stats.effects.insert(
                kind,
                EffectStats {
                    mounts,
                    unmounts,
                    mounted: self.effects.contains_key(&kind),
                    listeners: listeners.counters(kind),
                    active_listeners: listeners.active(kind),
                    scheduler: scheduler.counters(kind),
                    active_timers: scheduler.active_timers(kind),
                    frame_pending: scheduler.has_frame_request(kind),
                },
            );
        }
        stats
    }

    /// Images available to effects.
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Mutable access for inserting fetched images.
    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }

    /// Config currently applied, including committed card drags.
    pub fn config(&self) -> &ConfigModel {
        &self.config
    }

    /// Construction options.
    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Virtual time.
    pub fn now_ms(&self) -> f64 {
        self.runtime.scheduler.now_ms()
    }

    /// Host region extent.
    pub fn host_size(&self) -> Size {
        self.runtime.host.size()
    }

    /// Window or container hosting.
    pub fn host_mode(&self) -> HostMode {
        self.runtime.host.mode()
    }

    /// Layer positioning implied by the host mode.
    pub fn positioning(&self) -> Positioning {
        self.runtime.host.positioning()
    }

    /// Whether `kind` is mounted.
    pub fn is_mounted(&self, kind: EffectKind) -> bool {
        self.effects.contains_key(&kind)
    }

    fn effect<T: 'static>(&self, kind: EffectKind) -> Option<&T> {
        self.effects.get(&kind)?.as_any().downcast_ref::<T>()
    }

    /// Live particles; empty when the field is not mounted.
    pub fn particles(&self) -> &[Particle] {
        self.effect::<ParticleField>(EffectKind::Particles)
            .map(ParticleField::particles)
            .unwrap_or_default()
    }

    /// Live trail points, oldest first.
    pub fn trail_points(&self) -> Vec<TrailPoint> {
        self.effect::<PointerTrail>(EffectKind::Trail)
            .map(|t| t.points().copied().collect())
            .unwrap_or_default()
    }

    /// Live click tokens, in creation order.
    pub fn click_tokens(&self) -> &[ClickToken] {
        self.effect::<ClickBurst>(EffectKind::Click)
            .map(ClickBurst::tokens)
            .unwrap_or_default()
    }

    /// Where the custom cursor is drawn, if it is showing.
    pub fn cursor_position(&self) -> Option<Point> {
        self.effect::<CursorOverlay>(EffectKind::Cursor)
            .and_then(CursorOverlay::visible_at)
    }

    /// Card geometry; an unmounted card transform reports the configured position, untilted.
    pub fn card_state(&self) -> CardState {
        let host = self.runtime.host.size();
        match self.effect::<CardTransform>(EffectKind::Card) {
            Some(card) => CardState {
                rect: card.rect_in(host),
                tilt: card.tilt(),
                position: card.position(),
                dragging: card.is_dragging(),
            },
            None => {
                let position = self.config.card.position;
                CardState {
                    rect: crate::effects::card::card_rect(position, host, self.options.card_size),
                    tilt: Tilt::FLAT,
                    position,
                    dragging: false,
                }
            }
        }
    }
}

impl Drop for EffectRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Whether `kind` should be mounted under `config`.
fn wants(kind: EffectKind, config: &ConfigModel, options: &RendererOptions) -> bool {
    match kind {
        EffectKind::Particles => config.particles.enabled,
        EffectKind::Trail => config.trail.enabled && config.cursor.kind != CursorKind::Hidden,
        EffectKind::Click => config.click.enabled && config.click.kind != ClickEffectKind::None,
        EffectKind::Cursor => config.cursor.kind != CursorKind::Default,
        EffectKind::Card => config.card.tilt_enabled || options.editable,
    }
}

fn build(kind: EffectKind, config: &ConfigModel, options: &RendererOptions) -> Box<dyn Effect> {
    match kind {
        EffectKind::Particles => Box::new(ParticleField::new(config.particles.clone())),
        EffectKind::Trail => Box::new(PointerTrail::new(config.trail.clone())),
        EffectKind::Click => Box::new(ClickBurst::new(config.click.clone())),
        EffectKind::Cursor => Box::new(CursorOverlay::new(config.cursor.clone())),
        EffectKind::Card => Box::new(CardTransform::new(
            config.card.clone(),
            options.editable,
            options.card_size,
        )),
    }
}

fn resolve_fidelity(options: &RendererOptions) -> Fidelity {
    let policy = &options.degradation;
    if !policy.is_low_end(&options.device) {
        return Fidelity::default();
    }
    let fidelity = Fidelity {
        particle_cap: Some(policy.low_end_particle_cap),
        frame_skip: policy.frame_skip(&options.device),
    };
    tracing::debug!(
        particle_cap = policy.low_end_particle_cap,
        frame_skip = fidelity.frame_skip,
        "low-end device; degrading particle field"
    );
    fidelity
}

#[cfg(test)]
#[path = "../../tests/unit/engine/renderer.rs"]
mod tests;
