pub(crate) mod adapter;
pub(crate) mod registry;

use std::collections::BTreeSet;

use crate::foundation::core::{EffectKind, Point, Rect, Size};

pub use adapter::{ElementHandle, HostAdapter, HostMode, HostSpec, Positioning};
pub use registry::{EventKind, HostEvent, ListenerCounters, ListenerId, ListenerRegistry};

/// Native cursor style applied to the host element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum CursorStyle {
    /// Native pointer visible.
    #[default]
    Auto,
    /// `cursor: none` scoped to the host element.
    None,
}

/// Raw window-space input delivered by the embedder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawInput {
    /// Pointer moved to a window-space point.
    Move(Point),
    /// Pointer pressed at a window-space point.
    Down(Point),
    /// Pointer released at a window-space point.
    Up(Point),
    /// Pointer left the host element (or the document in window mode).
    Leave,
    /// Viewport resized.
    WindowResize(Size),
    /// Container element re-laid out.
    ContainerResize(Rect),
}

/// The host region shared by every effect of one renderer.
///
/// Owns the adapter, the listener registry and the scoped cursor style. Raw input is translated
/// here exactly once; container clipping and enter/leave synthesis happen before any effect sees
/// an event.
#[derive(Debug)]
pub struct Host {
    adapter: Box<dyn HostAdapter>,
    listeners: ListenerRegistry,
    pointer_inside: bool,
    cursor_suppressors: BTreeSet<EffectKind>,
}

impl Host {
    pub fn new(spec: HostSpec) -> Self {
        Self::with_adapter(spec.into_adapter())
    }

    pub fn with_adapter(adapter: Box<dyn HostAdapter>) -> Self {
        Self {
            adapter,
            listeners: ListenerRegistry::default(),
            pointer_inside: false,
            cursor_suppressors: BTreeSet::new(),
        }
    }

    pub fn adapter(&self) -> &dyn HostAdapter {
        self.adapter.as_ref()
    }

    pub fn mode(&self) -> HostMode {
        self.adapter.mode()
    }

    pub fn size(&self) -> Size {
        self.adapter.size()
    }

    pub fn positioning(&self) -> Positioning {
        self.adapter.positioning()
    }

    pub fn pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    /// Resize events this host emits; container hosts also observe the window.
    pub fn resize_kinds(&self) -> &'static [EventKind] {
        match self.adapter.mode() {
            HostMode::Window => &[EventKind::WindowResize],
            HostMode::Container => &[EventKind::WindowResize, EventKind::ContainerResize],
        }
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn subscribe(&mut self, owner: EffectKind, kind: EventKind) -> ListenerId {
        self.listeners.subscribe(owner, kind)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Translate one raw input into host events, in delivery order.
    pub fn translate(&mut self, input: RawInput, at_ms: f64) -> Vec<HostEvent> {
        let ev = |kind, local| HostEvent { kind, local, at_ms };
        let mut out = Vec::new();
        match input {
            RawInput::Move(global) => match self.adapter.to_local(global) {
                Some(local) => {
                    if !self.pointer_inside {
                        self.pointer_inside = true;
                        out.push(ev(EventKind::PointerEnter, Some(local)));
                    }
                    out.push(ev(EventKind::PointerMove, Some(local)));
                }
                None => {
                    if self.pointer_inside {
                        self.pointer_inside = false;
                        out.push(ev(EventKind::PointerLeave, None));
                    }
                }
            },
            RawInput::Down(global) => {
                if let Some(local) = self.adapter.to_local(global) {
                    out.push(ev(EventKind::PointerDown, Some(local)));
                }
            }
            RawInput::Up(global) => {
                out.push(ev(EventKind::PointerUp, self.adapter.to_local(global)));
            }
            RawInput::Leave => {
                if self.pointer_inside {
                    self.pointer_inside = false;
                    out.push(ev(EventKind::PointerLeave, None));
                }
            }
            RawInput::WindowResize(viewport) => {
                self.adapter.apply_window_resize(viewport);
                out.push(ev(EventKind::WindowResize, None));
            }
            RawInput::ContainerResize(rect) => {
                if self.adapter.mode() == HostMode::Container && self.adapter.apply_element_rect(rect)
                {
                    out.push(ev(EventKind::ContainerResize, None));
                }
            }
        }
        out
    }

    /// Apply `cursor: none` to the host element on behalf of `owner`.
    pub fn suppress_cursor(&mut self, owner: EffectKind) {
        self.cursor_suppressors.insert(owner);
    }

    pub fn restore_cursor(&mut self, owner: EffectKind) {
        self.cursor_suppressors.remove(&owner);
    }

    pub fn cursor_style(&self) -> CursorStyle {
        if self.cursor_suppressors.is_empty() {
            CursorStyle::Auto
        } else {
            CursorStyle::None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/host.rs"]
mod tests;
