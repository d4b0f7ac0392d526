//! wgpu render backend for the steel cube scene.
//!
//! Draws every mesh node of a [`SceneGraph`](steelcube_scene::SceneGraph)
//! with a metallic-roughness shader lit by the scene's light rig, then tone
//! maps to an sRGB surface.
//!
//! # Invariants
//! - The renderer never mutates the scene graph.
//! - A lost device is reported as a fatal [`RenderError`](steelcube_render::RenderError)
//!   on the next frame; a lost or outdated surface is reconfigured first.
//! - Resizing to the same viewport does not reconfigure the surface.

mod gpu;
mod shaders;
mod uniforms;

pub use gpu::WgpuRenderer;
