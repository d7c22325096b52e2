use crate::assets::store::AssetStore;
use crate::effects::{Effect, EffectCtx, EffectOutput, Fidelity, PaintCtx};
use crate::foundation::core::{Rect, Size};
use crate::foundation::math::Rng64;
use crate::host::{ElementHandle, Host, HostSpec, RawInput};
use crate::render::display::Layer;
use crate::runtime::scheduler::Scheduler;

/// Drives one effect the way the renderer does, without the renderer.
pub(crate) struct Harness {
    pub(crate) host: Host,
    pub(crate) scheduler: Scheduler,
    pub(crate) rng: Rng64,
    pub(crate) fidelity: Fidelity,
    pub(crate) outbox: Vec<EffectOutput>,
    pub(crate) assets: AssetStore,
}

impl Harness {
    pub(crate) fn window(width: f64, height: f64) -> Self {
        Self::with_spec(HostSpec::Window {
            viewport: Size::new(width, height),
        })
    }

    pub(crate) fn container(rect: Rect) -> Self {
        Self::with_spec(HostSpec::Container {
            element: ElementHandle { id: 1, rect },
        })
    }

    fn with_spec(spec: HostSpec) -> Self {
        Self {
            host: Host::new(spec),
            scheduler: Scheduler::new(),
            rng: Rng64::new(7),
            fidelity: Fidelity::default(),
            outbox: Vec::new(),
            assets: AssetStore::new(),
        }
    }

    pub(crate) fn ctx(&mut self) -> EffectCtx<'_> {
        EffectCtx {
            host: &mut self.host,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            fidelity: self.fidelity,
            outbox: &mut self.outbox,
        }
    }

    pub(crate) fn mount(&mut self, effect: &mut dyn Effect) {
        let mut ctx = self.ctx();
        effect.mount(&mut ctx);
    }

    pub(crate) fn unmount(&mut self, effect: &mut dyn Effect) {
        let mut ctx = self.ctx();
        effect.unmount(&mut ctx);
    }

    /// Translate raw input and deliver it if the effect listens for it.
    pub(crate) fn input(&mut self, effect: &mut dyn Effect, raw: RawInput) {
        let now = self.scheduler.now_ms();
        for event in self.host.translate(raw, now) {
            if self.host.listeners().targets(event.kind).contains(&effect.kind()) {
                let mut ctx = self.ctx();
                effect.on_event(&event, &mut ctx);
            }
        }
    }

    /// Fire due timers, then run one frame if the effect requested one.
    pub(crate) fn advance(&mut self, effect: &mut dyn Effect, dt_ms: f64) {
        let target = self.scheduler.now_ms() + dt_ms;
        while let Some(fired) = self.scheduler.pop_due(target) {
            if fired.owner == effect.kind() {
                let mut ctx = self.ctx();
                effect.on_timer(&fired, &mut ctx);
            }
        }
        self.scheduler.advance_clock_to(target);
        let frames = self.scheduler.take_frame_requests();
        if frames.contains(&effect.kind()) {
            let mut ctx = self.ctx();
            effect.on_frame(target, &mut ctx);
        }
    }

    pub(crate) fn frames(&mut self, effect: &mut dyn Effect, n: usize) {
        for _ in 0..n {
            self.advance(effect, crate::runtime::scheduler::FRAME_INTERVAL_MS);
        }
    }

    pub(crate) fn paint(&self, effect: &dyn Effect) -> Option<Layer> {
        let ctx = PaintCtx {
            size: self.host.size(),
            positioning: self.host.positioning(),
            now_ms: self.scheduler.now_ms(),
            assets: &self.assets,
        };
        effect.paint(&ctx)
    }
}
