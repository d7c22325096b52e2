use kurbo::Vec2;

use crate::animation::ease::Ease;

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Eased interpolation between two values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub ease: Ease,
}

impl<T: Lerp + Copy> Tween<T> {
    pub fn new(from: T, to: T, ease: Ease) -> Self {
        Self { from, to, ease }
    }

    /// Constant value.
    pub fn hold(v: T) -> Self {
        Self::new(v, v, Ease::Linear)
    }

    pub fn at(&self, t: f64) -> T {
        T::lerp(&self.from, &self.to, self.ease.apply(t))
    }
}

/// Start delay and duration of one animated element, relative to its token's creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub delay_ms: f64,
    pub duration_ms: f64,
}

impl Timing {
    pub fn new(delay_ms: f64, duration_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            duration_ms: duration_ms.max(1.0),
        }
    }

    /// Normalized progress at `elapsed_ms`; `None` before the delay has passed or after the end.
    pub fn progress(&self, elapsed_ms: f64) -> Option<f64> {
        let local = elapsed_ms - self.delay_ms;
        if !(0.0..=self.duration_ms).contains(&local) {
            return None;
        }
        Some(local / self.duration_ms)
    }

    pub fn end_ms(&self) -> f64 {
        self.delay_ms + self.duration_ms
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
