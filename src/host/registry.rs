use std::collections::BTreeMap;

use crate::foundation::core::{EffectKind, Point};

/// Event streams an effect can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum EventKind {
    /// Pointer moved inside the host.
    PointerMove,
    /// Pointer pressed inside the host.
    PointerDown,
    /// Pointer released.
    PointerUp,
    /// Pointer entered the host region.
    PointerEnter,
    /// Pointer left the host region.
    PointerLeave,
    /// Window viewport resized.
    WindowResize,
    /// Container element resized (resize observation).
    ContainerResize,
}

/// One event as seen by an effect, already in host-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostEvent {
    /// Stream the event belongs to.
    pub kind: EventKind,
    /// Host-local position for pointer events.
    pub local: Option<Point>,
    /// Virtual time of arrival.
    pub at_ms: f64,
}

/// Handle of one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Subscription counters for one owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ListenerCounters {
    /// Listeners added over the lifetime of the host.
    pub added: u64,
    /// Listeners removed over the lifetime of the host.
    pub removed: u64,
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(ListenerId, EffectKind, EventKind)>,
    counters: BTreeMap<EffectKind, ListenerCounters>,
}

impl ListenerRegistry {
    pub fn subscribe(&mut self, owner: EffectKind, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, owner, kind));
        self.counters.entry(owner).or_default().added += 1;
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let Some(pos) = self.entries.iter().position(|(lid, _, _)| *lid == id) else {
            return false;
        };
        let (_, owner, _) = self.entries.remove(pos);
        self.counters.entry(owner).or_default().removed += 1;
        true
    }

    /// Owners subscribed to `kind`, in registration order.
    pub fn targets(&self, kind: EventKind) -> Vec<EffectKind> {
        let mut out: Vec<EffectKind> = Vec::new();
        for &(_, owner, k) in &self.entries {
            if k == kind && !out.contains(&owner) {
                out.push(owner);
            }
        }
        out
    }

    pub fn active(&self, owner: EffectKind) -> usize {
        self.entries.iter().filter(|(_, o, _)| *o == owner).count()
    }

    pub fn counters(&self, owner: EffectKind) -> ListenerCounters {
        self.counters.get(&owner).copied().unwrap_or_default()
    }
}
