use crate::action::PointerAction;
use glam::Vec2;
use std::collections::BTreeSet;

/// Pointer buttons the orbit controls care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Tracks held buttons and cursor position, turning raw pointer events into
/// [`PointerAction`]s.
///
/// Primary drag orbits, secondary drag pans, middle drag dollies. The first
/// held button decides the gesture until it is released.
#[derive(Debug, Default)]
pub struct PointerState {
    held: BTreeSet<PointerButton>,
    gesture: Option<PointerButton>,
    last_position: Option<Vec2>,
    pinch_distance: Option<f32>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        if pressed {
            self.held.insert(button);
            if self.gesture.is_none() {
                self.gesture = Some(button);
                tracing::trace!(?button, "drag started");
            }
        } else {
            self.held.remove(&button);
            if self.gesture == Some(button) {
                self.gesture = self.held.iter().next().copied();
                tracing::trace!(?button, "drag ended");
            }
        }
    }

    /// Cursor moved to `position` (logical pixels). Returns an action when a
    /// drag is in progress.
    pub fn moved(&mut self, position: Vec2) -> Option<PointerAction> {
        let previous = self.last_position.replace(position);
        let delta = position - previous?;
        let action = match self.gesture? {
            PointerButton::Primary => PointerAction::Rotate(delta),
            PointerButton::Secondary => PointerAction::Pan(delta),
            PointerButton::Middle => PointerAction::Dolly(-delta.y),
        };
        (!action.is_noop()).then_some(action)
    }

    /// Cursor left the surface: forget the anchor so re-entry does not jump.
    pub fn left(&mut self) {
        self.last_position = None;
    }

    /// Wheel scrolled by `lines` (positive = away from the user = zoom in).
    pub fn wheel(&mut self, lines: f32) -> Option<PointerAction> {
        let action = PointerAction::Zoom(lines);
        (!action.is_noop()).then_some(action)
    }

    /// Two-finger pinch with the current distance between touches.
    pub fn pinch(&mut self, distance: f32) -> Option<PointerAction> {
        let previous = self.pinch_distance.replace(distance)?;
        if previous <= f32::EPSILON {
            return None;
        }
        // One zoom step per 10% change in finger spread.
        let steps = (distance / previous).ln() / 1.1_f32.ln();
        let action = PointerAction::Zoom(steps);
        (!action.is_noop()).then_some(action)
    }

    pub fn pinch_ended(&mut self) {
        self.pinch_distance = None;
    }
}
