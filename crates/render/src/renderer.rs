use std::fmt::Write as _;
use steelcube_camera::PerspectiveCamera;
use steelcube_common::Viewport;
use steelcube_scene::{Light, SceneGraph};

/// Backing pixel buffer size of a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn from_viewport(viewport: &Viewport) -> Self {
        let (width, height) = viewport.sanitized().buffer_size();
        Self { width, height }
    }
}

/// Errors a renderer can report for a frame.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("rendering device lost: {0}")]
    DeviceLost(String),
    #[error("render surface lost and could not be recovered")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("render backend error: {0}")]
    Backend(String),
}

impl RenderError {
    /// Whether the render surface is unusable for the rest of the session.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::DeviceLost(_) | Self::SurfaceLost | Self::OutOfMemory => true,
            Self::Backend(_) => false,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and camera, then draws one frame to its
/// surface. It never mutates the scene.
pub trait Renderer {
    /// Resize the surface and its backing pixel buffer. Calling this again
    /// with the same viewport is a no-op.
    fn set_size(&mut self, viewport: Viewport);

    /// Current backing pixel buffer size.
    fn surface_size(&self) -> SurfaceSize;

    /// Render one frame.
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera)
    -> Result<(), RenderError>;
}

/// Debug text renderer.
///
/// Produces a human-readable description of each frame instead of pixels.
/// Used by the CLI and by tests of the frame loop.
#[derive(Debug)]
pub struct DebugTextRenderer {
    viewport: Viewport,
    size: SurfaceSize,
    resizes: u64,
    frames: u64,
    last_frame: String,
}

impl DebugTextRenderer {
    pub fn new(viewport: Viewport) -> Self {
        let viewport = viewport.sanitized();
        Self {
            viewport,
            size: SurfaceSize::from_viewport(&viewport),
            resizes: 0,
            frames: 0,
            last_frame: String::new(),
        }
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Surface reconfigurations performed (no-op resizes are not counted).
    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }

    /// Describe the scene as seen from `camera`.
    pub fn describe(scene: &SceneGraph, camera: &PerspectiveCamera, size: SurfaceSize) -> String {
        let mut out = String::new();
        let p = camera.position;
        let _ = writeln!(
            out,
            "=== Frame ({}x{}) background=#{:06x} ===",
            size.width,
            size.height,
            scene.background.to_hex()
        );
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.4}",
            p.x,
            p.y,
            p.z,
            camera.fov(),
            camera.aspect()
        );
        let lights = scene.lights();
        let local = lights.iter().filter(|l| l.is_local()).count();
        let _ = writeln!(
            out,
            "Lights: {} ({} local, {} ambient)",
            lights.len(),
            local,
            lights
                .iter()
                .filter(|l| matches!(l, Light::Ambient { .. } | Light::Hemisphere { .. }))
                .count()
        );
        for drawable in scene.drawables() {
            let name = scene
                .get(drawable.id)
                .map(|n| n.name.as_str())
                .unwrap_or("?");
            let (_, rotation, translation) = drawable.world.to_scale_rotation_translation();
            let (rx, ry, rz) = rotation.to_euler(glam::EulerRot::XYZ);
            let _ = writeln!(
                out,
                "  [{}] {} tris={} pos=({:.2}, {:.2}, {:.2}) rot=({:.4}, {:.4}, {:.4})",
                drawable.id.short(),
                name,
                drawable.mesh.geometry.to_mesh().triangle_count(),
                translation.x,
                translation.y,
                translation.z,
                rx,
                ry,
                rz
            );
        }
        out
    }
}

impl Renderer for DebugTextRenderer {
    fn set_size(&mut self, viewport: Viewport) {
        let viewport = viewport.sanitized();
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.size = SurfaceSize::from_viewport(&viewport);
        self.resizes += 1;
        tracing::debug!(width = self.size.width, height = self.size.height, "surface resized");
    }

    fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn render(
        &mut self,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
    ) -> Result<(), RenderError> {
        self.last_frame = Self::describe(scene, camera, self.size);
        self.frames += 1;
        Ok(())
    }
}
