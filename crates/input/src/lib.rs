//! Pointer input mapped to orbit-camera actions.
//!
//! # Invariants
//! - Windowing events never reach the camera directly; they pass through
//!   [`PointerState`] and come out as [`PointerAction`]s.
//! - Mapping is stateless apart from which buttons are held and the last
//!   cursor position.

pub mod action;
pub mod pointer;

pub use action::PointerAction;
pub use pointer::{PointerButton, PointerState};
