//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene graph and camera; they never mutate them.
//! - The render surface is always sized `logical * pixel_ratio`.
//! - A fatal [`RenderError`] means the surface is gone for this session.

mod renderer;
mod settings;

pub use renderer::{DebugTextRenderer, RenderError, Renderer, SurfaceSize};
pub use settings::{PowerPreference, RenderSettings, ToneMapping};

pub fn crate_info() -> &'static str {
    "steelcube-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
