//! Shared value types used across the steelcube crates.
//!
//! Everything here is plain data: no crate in the workspace owns these types,
//! they only describe the scene, the camera pose and the display surface.

mod types;
mod viewport;

pub use types::{Color, NodeId, Transform};
pub use viewport::Viewport;
