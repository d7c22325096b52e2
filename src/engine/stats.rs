use std::collections::BTreeMap;

use crate::foundation::core::EffectKind;
use crate::host::ListenerCounters;
use crate::runtime::scheduler::OwnerCounters;

/// Setup and teardown accounting for one effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EffectStats {
    /// Times the effect was mounted.
    pub mounts: u64,
    /// Times the effect was unmounted.
    pub unmounts: u64,
    /// Whether the effect is mounted right now.
    pub mounted: bool,
    /// Listener registrations over the renderer's lifetime.
    pub listeners: ListenerCounters,
    /// Listeners currently registered.
    pub active_listeners: usize,
    /// Frame and timer registrations over the renderer's lifetime.
    pub scheduler: OwnerCounters,
    /// Timers currently scheduled.
    pub active_timers: usize,
    /// Whether an animation frame is pending.
    pub frame_pending: bool,
}

impl EffectStats {
    /// `true` when the effect holds nothing: every listener, frame and timer it ever registered
    /// has been released.
    pub fn is_released(&self) -> bool {
        self.active_listeners == 0
            && self.active_timers == 0
            && !self.frame_pending
            && self.listeners.added == self.listeners.removed
            && self.scheduler.frames_requested == self.scheduler.frames_released
            && self.scheduler.timers_created == self.scheduler.timers_released
    }

    /// Mount/unmount pairs match the current state, and an unmounted effect holds nothing.
    pub fn is_balanced(&self) -> bool {
        let expected_unmounts = self.mounts - u64::from(self.mounted && self.mounts > 0);
        self.unmounts == expected_unmounts && (self.mounted || self.is_released())
    }
}

/// Snapshot of every effect's accounting.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResourceStats {
    /// Per-effect counters, keyed by effect.
    pub effects: BTreeMap<EffectKind, EffectStats>,
}

impl ResourceStats {
    /// Counters for `kind`; zeroed if it never registered anything.
    pub fn get(&self, kind: EffectKind) -> EffectStats {
        self.effects.get(&kind).copied().unwrap_or_default()
    }

    /// Every effect is balanced.
    pub fn is_balanced(&self) -> bool {
        self.effects.values().all(EffectStats::is_balanced)
    }

    /// Nothing is mounted and nothing is held.
    pub fn is_fully_released(&self) -> bool {
        self.effects
            .values()
            .all(|s| !s.mounted && s.is_released() && s.mounts == s.unmounts)
    }
}
