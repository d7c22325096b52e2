use crate::foundation::core::{Point, Rect, Size};

/// Which hosting context an effect renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HostMode {
    /// Whole viewport; the public profile page.
    Window,
    /// One clipped element; the editor preview pane.
    Container,
}

/// How effect layers are positioned inside the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Positioning {
    /// Viewport-fixed overlay.
    Fixed,
    /// Absolutely positioned inside the container, clipped to its overflow.
    Absolute,
}

/// Opaque reference to a laid-out container element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementHandle {
    /// Embedder-chosen identity.
    pub id: u64,
    /// Bounding rectangle in window coordinates.
    pub rect: Rect,
}

/// Host selection passed at renderer construction.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum HostSpec {
    /// Bind to the window; `viewport` is the current inner size.
    Window {
        /// Viewport size in CSS pixels.
        viewport: Size,
    },
    /// Bind to `element`.
    Container {
        /// The hosting element.
        element: ElementHandle,
    },
}

impl HostSpec {
    /// Local extent of the host region.
    pub fn size(&self) -> Size {
        match self {
            Self::Window { viewport } => *viewport,
            Self::Container { element } => element.rect.abs().size(),
        }
    }

    /// Layer positioning for this mode.
    pub fn positioning(&self) -> Positioning {
        match self {
            Self::Window { .. } => Positioning::Fixed,
            Self::Container { .. } => Positioning::Absolute,
        }
    }

    pub(crate) fn into_adapter(self) -> Box<dyn HostAdapter> {
        match self {
            Self::Window { viewport } => Box::new(WindowHost::new(viewport)),
            Self::Container { element } => Box::new(ContainerHost::new(element)),
        }
    }
}

/// Coordinate space and bounds of one host region.
///
/// Effects never branch on the mode themselves: they receive host-local points and query the
/// local size through this trait.
pub trait HostAdapter: std::fmt::Debug {
    /// Hosting mode.
    fn mode(&self) -> HostMode;

    /// Bounds in window coordinates.
    fn bounds(&self) -> Rect;

    /// Local extent of the host region.
    fn size(&self) -> Size {
        self.bounds().size()
    }

    /// Translate a window-space point to host-local space.
    ///
    /// Returns `None` when the point lies outside a clipping host.
    fn to_local(&self, global: Point) -> Option<Point>;

    /// Layer positioning for this host.
    fn positioning(&self) -> Positioning;

    /// Apply a new viewport size. Returns `true` when the host bounds changed.
    fn apply_window_resize(&mut self, viewport: Size) -> bool;

    /// Apply a new element rectangle. Returns `true` when the host bounds changed.
    fn apply_element_rect(&mut self, rect: Rect) -> bool;
}

/// Full-window host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowHost {
    viewport: Size,
}

impl WindowHost {
    /// Host covering `viewport`.
    pub fn new(viewport: Size) -> Self {
        Self { viewport }
    }
}

impl HostAdapter for WindowHost {
    fn mode(&self) -> HostMode {
        HostMode::Window
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.viewport)
    }

    fn to_local(&self, global: Point) -> Option<Point> {
        Some(global)
    }

    fn positioning(&self) -> Positioning {
        Positioning::Fixed
    }

    fn apply_window_resize(&mut self, viewport: Size) -> bool {
        let changed = self.viewport != viewport;
        self.viewport = viewport;
        changed
    }

    fn apply_element_rect(&mut self, _rect: Rect) -> bool {
        false
    }
}

/// Host clipped to one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerHost {
    element: ElementHandle,
}

impl ContainerHost {
    /// Host bound to `element`.
    pub fn new(element: ElementHandle) -> Self {
        Self { element }
    }

    /// The bound element.
    pub fn element(&self) -> ElementHandle {
        self.element
    }
}

impl HostAdapter for ContainerHost {
    fn mode(&self) -> HostMode {
        HostMode::Container
    }

    fn bounds(&self) -> Rect {
        self.element.rect.abs()
    }

    fn to_local(&self, global: Point) -> Option<Point> {
        let r = self.bounds();
        let inside = global.x >= r.x0 && global.x <= r.x1 && global.y >= r.y0 && global.y <= r.y1;
        (inside && r.area() > 0.0).then(|| Point::new(global.x - r.x0, global.y - r.y0))
    }

    fn positioning(&self) -> Positioning {
        Positioning::Absolute
    }

    fn apply_window_resize(&mut self, _viewport: Size) -> bool {
        false
    }

    fn apply_element_rect(&mut self, rect: Rect) -> bool {
        let changed = self.element.rect != rect;
        self.element.rect = rect;
        changed
    }
}
