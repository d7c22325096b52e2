use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::EffectKind;

/// Nominal animation-frame interval in milliseconds.
pub const FRAME_INTERVAL_MS: f64 = 16.67;

/// Handle of a pending timeout or interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug)]
struct Timer {
    owner: EffectKind,
    due_ms: f64,
    period_ms: Option<f64>,
    tag: u64,
}

/// A timer that came due during [`Scheduler::pop_due`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FiredTimer {
    /// Timer handle; already released for one-shot timers.
    pub id: TimerId,
    /// Effect that registered the timer.
    pub owner: EffectKind,
    /// Caller-chosen payload.
    pub tag: u64,
    /// Virtual time at which it fired.
    pub at_ms: f64,
}

/// Setup/teardown counters for one owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct OwnerCounters {
    /// Frame requests registered.
    pub frames_requested: u64,
    /// Frame requests cancelled or consumed.
    pub frames_released: u64,
    /// Timeouts and intervals registered.
    pub timers_created: u64,
    /// Timers cleared or completed.
    pub timers_released: u64,
}

/// Single-threaded cooperative scheduler on a virtual millisecond clock.
///
/// Models the host's animation-frame and timer queues. Every registration is tagged with the
/// owning effect so that an unmount can release everything it holds, and so that tests can check
/// that setup and teardown counts balance.
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_id: u64,
    frames: BTreeSet<EffectKind>,
    timers: BTreeMap<TimerId, Timer>,
    counters: BTreeMap<EffectKind, OwnerCounters>,
}

impl Scheduler {
    /// Scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Request one animation frame for `owner`; repeated requests coalesce.
    pub fn request_frame(&mut self, owner: EffectKind) {
        if self.frames.insert(owner) {
            self.counters_mut(owner).frames_requested += 1;
        }
    }

    /// Drop a pending frame request. Returns `true` if one was pending.
    pub fn cancel_frame(&mut self, owner: EffectKind) -> bool {
        let had = self.frames.remove(&owner);
        if had {
            self.counters_mut(owner).frames_released += 1;
        }
        had
    }

    /// Whether `owner` has a pending frame request.
    pub fn has_frame_request(&self, owner: EffectKind) -> bool {
        self.frames.contains(&owner)
    }

    /// Consume every pending frame request, in owner order.
    pub fn take_frame_requests(&mut self) -> Vec<EffectKind> {
        let owners: Vec<EffectKind> = std::mem::take(&mut self.frames).into_iter().collect();
        for &owner in &owners {
            self.counters_mut(owner).frames_released += 1;
        }
        owners
    }

    /// Fire `tag` once after `delay_ms`.
    pub fn set_timeout(&mut self, owner: EffectKind, delay_ms: f64, tag: u64) -> TimerId {
        self.insert_timer(owner, delay_ms, None, tag)
    }

    /// Fire `tag` every `period_ms` until cleared.
    pub fn set_interval(&mut self, owner: EffectKind, period_ms: f64, tag: u64) -> TimerId {
        let period = sanitize_delay(period_ms).max(1.0);
        self.insert_timer(owner, period, Some(period), tag)
    }

    /// Release a timer. Returns `true` if it was still pending.
    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        match self.timers.remove(&id) {
            Some(timer) => {
                self.counters_mut(timer.owner).timers_released += 1;
                true
            }
            None => false,
        }
    }

    /// Release every frame request and timer held by `owner`.
    pub fn release_owner(&mut self, owner: EffectKind) {
        self.cancel_frame(owner);
        let ids: Vec<TimerId> = self
            .timers
            .iter()
            .filter(|(_, t)| t.owner == owner)
            .map(|(&id, _)| id)
            .collect();
        for id in ids {
            self.clear_timer(id);
        }
    }

    /// Pop the earliest timer due at or before `until_ms` and move the clock to its due time.
    ///
    /// Ties fire in registration order. Intervals are rescheduled one period later; one-shot
    /// timers are released.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<FiredTimer> {
        let (&id, timer) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by(|(ia, a), (ib, b)| a.due_ms.total_cmp(&b.due_ms).then(ia.cmp(ib)))?;
        let timer = *timer;

        self.now_ms = self.now_ms.max(timer.due_ms);
        match timer.period_ms {
            Some(period) => {
                if let Some(t) = self.timers.get_mut(&id) {
                    t.due_ms += period;
                }
            }
            None => {
                self.timers.remove(&id);
                self.counters_mut(timer.owner).timers_released += 1;
            }
        }

        Some(FiredTimer {
            id,
            owner: timer.owner,
            tag: timer.tag,
            at_ms: timer.due_ms,
        })
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock_to(&mut self, t_ms: f64) {
        if t_ms.is_finite() && t_ms > self.now_ms {
            self.now_ms = t_ms;
        }
    }

    /// Pending timers owned by `owner`.
    pub fn active_timers(&self, owner: EffectKind) -> usize {
        self.timers.values().filter(|t| t.owner == owner).count()
    }

    /// Lifetime counters for `owner`.
    pub fn counters(&self, owner: EffectKind) -> OwnerCounters {
        self.counters.get(&owner).copied().unwrap_or_default()
    }

    fn insert_timer(
        &mut self,
        owner: EffectKind,
        delay_ms: f64,
        period_ms: Option<f64>,
        tag: u64,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(
            id,
            Timer {
                owner,
                due_ms: self.now_ms + sanitize_delay(delay_ms),
                period_ms,
                tag,
            },
        );
        self.counters_mut(owner).timers_created += 1;
        id
    }

    fn counters_mut(&mut self, owner: EffectKind) -> &mut OwnerCounters {
        self.counters.entry(owner).or_default()
    }
}

fn sanitize_delay(ms: f64) -> f64 {
    if ms.is_finite() { ms.max(0.0) } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/scheduler.rs"]
mod tests;
