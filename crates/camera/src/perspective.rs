use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Initial camera placement and lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 6.0),
            target: Vec3::ZERO,
        }
    }
}

/// Perspective camera looking at a target point.
///
/// The projection matrix is cached. Lens changes mark it dirty and
/// [`update_projection_matrix`](Self::update_projection_matrix) recomputes it.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
    projection_dirty: bool,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            position: config.position,
            target: config.target,
            up: Vec3::Y,
            fov: config.fov,
            aspect,
            near: config.near,
            far: config.far,
            projection: Mat4::IDENTITY,
            projection_dirty: true,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Set the aspect ratio. Marks the projection dirty only if it changed.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect != self.aspect {
            self.aspect = aspect;
            self.projection_dirty = true;
        }
    }

    pub fn set_fov(&mut self, fov: f32) {
        if fov != self.fov {
            self.fov = fov;
            self.projection_dirty = true;
        }
    }

    pub fn needs_projection_update(&self) -> bool {
        self.projection_dirty
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
        self.projection_dirty = false;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Camera basis vectors `(right, up)` in world space.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize_or(Vec3::X);
        let up = right.cross(forward);
        (right, up)
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
