//! Camera state and the damped orbit controller that moves it.
//!
//! # Invariants
//! - The orbit controller buffers pointer input and only touches the camera
//!   inside [`OrbitControls::update`].
//! - The cached projection matrix is stale while
//!   [`PerspectiveCamera::needs_projection_update`] is true.

mod orbit;
mod perspective;

pub use orbit::{OrbitConfig, OrbitControls};
pub use perspective::{CameraConfig, PerspectiveCamera};
