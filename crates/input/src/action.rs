use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A high-level camera action produced from raw pointer input.
///
/// The orbit controller consumes actions, never windowing events, so the
/// desktop app and headless tools drive it the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerAction {
    /// Orbit around the target by a pointer delta in logical pixels.
    Rotate(Vec2),
    /// Translate the target in screen space by a pointer delta in logical pixels.
    Pan(Vec2),
    /// Dolly by a vertical drag delta in logical pixels (positive = toward).
    Dolly(f32),
    /// Zoom by wheel or pinch steps (positive = in).
    Zoom(f32),
}

impl PointerAction {
    /// True when the action carries no motion.
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Rotate(d) | Self::Pan(d) => *d == Vec2::ZERO,
            Self::Dolly(d) | Self::Zoom(d) => *d == 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_is_constructible() {
        let a = PointerAction::Rotate(Vec2::new(1.0, 0.0));
        assert!(matches!(a, PointerAction::Rotate(_)));
        assert!(!a.is_noop());
    }

    #[test]
    fn zero_deltas_are_noops() {
        assert!(PointerAction::Pan(Vec2::ZERO).is_noop());
        assert!(PointerAction::Zoom(0.0).is_noop());
        assert!(PointerAction::Dolly(0.0).is_noop());
    }
}
