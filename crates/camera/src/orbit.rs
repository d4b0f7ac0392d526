use crate::perspective::PerspectiveCamera;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use steelcube_input::PointerAction;

const POLAR_EPSILON: f32 = 1e-6;

/// Orbit controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    /// Fraction of the buffered motion applied per update, `0.0..=1.0`.
    pub damping_factor: f32,
    pub enable_rotate: bool,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub enable_pan: bool,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits, radians from the +Y axis.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            enable_rotate: true,
            rotate_speed: 0.5,
            enable_zoom: true,
            zoom_speed: 1.0,
            enable_pan: true,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

/// Damped orbit controller.
///
/// Pointer actions accumulate into a spherical delta, a screen-space pan and
/// a zoom scale. [`update`](Self::update) applies them to the camera around
/// the target. With damping on, each update applies `damping_factor` of the
/// pending motion and keeps the rest, so motion eases out over later frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub config: OrbitConfig,
    target: Vec3,
    /// Pending (theta, phi) change, radians.
    spherical_delta: Vec2,
    /// Pending pan in logical pixels, converted to world units at update.
    pan_pixels: Vec2,
    /// Pending world-space pan being damped out.
    pan_offset: Vec3,
    scale: f32,
    viewport_height: f32,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig, target: Vec3, viewport_height: f32) -> Self {
        Self {
            config,
            target,
            spherical_delta: Vec2::ZERO,
            pan_pixels: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            viewport_height: viewport_height.max(1.0),
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Height of the input surface; rotation and pan are normalized by it.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(1.0);
    }

    /// True while buffered motion is still being applied.
    pub fn is_settling(&self) -> bool {
        self.spherical_delta.length_squared() > 1e-12
            || self.pan_offset.length_squared() > 1e-12
            || self.pan_pixels != Vec2::ZERO
            || self.scale != 1.0
    }

    /// Buffer a pointer action. Disabled gestures are ignored.
    pub fn handle(&mut self, action: PointerAction) {
        match action {
            PointerAction::Rotate(delta) if self.config.enable_rotate => {
                let angle = delta * TAU / self.viewport_height * self.config.rotate_speed;
                self.spherical_delta -= angle;
            }
            PointerAction::Pan(delta) if self.config.enable_pan => {
                self.pan_pixels += delta * self.config.pan_speed;
            }
            PointerAction::Dolly(amount) if self.config.enable_zoom => {
                if amount > 0.0 {
                    self.scale *= self.zoom_step();
                } else if amount < 0.0 {
                    self.scale /= self.zoom_step();
                }
            }
            PointerAction::Zoom(steps) if self.config.enable_zoom => {
                self.scale *= self.zoom_step().powf(steps);
            }
            _ => {
                tracing::trace!(?action, "gesture disabled, ignoring");
            }
        }
    }

    fn zoom_step(&self) -> f32 {
        0.95_f32.powf(self.config.zoom_speed)
    }

    /// Advance one step: apply buffered motion to `camera`, then decay it.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI * 0.5)
        };

        // Screen-space pan, scaled so the target tracks the pointer.
        if self.pan_pixels != Vec2::ZERO {
            let half_fov = (camera.fov().to_radians() * 0.5).tan();
            let units_per_pixel = 2.0 * radius * half_fov / self.viewport_height;
            let (right, up) = camera.basis();
            self.pan_offset += (-right * self.pan_pixels.x + up * self.pan_pixels.y)
                * units_per_pixel;
            self.pan_pixels = Vec2::ZERO;
        }

        let applied = if self.config.enable_damping {
            self.config.damping_factor.clamp(0.0, 1.0)
        } else {
            1.0
        };

        theta += self.spherical_delta.x * applied;
        phi += self.spherical_delta.y * applied;
        let min_phi = self.config.min_polar_angle.max(POLAR_EPSILON);
        let max_phi = self.config.max_polar_angle.min(PI - POLAR_EPSILON);
        phi = phi.clamp(min_phi, max_phi.max(min_phi));

        radius = (radius * self.scale).clamp(
            self.config.min_distance,
            self.config.max_distance.max(self.config.min_distance),
        );
        self.target += self.pan_offset * applied;

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = self.target + new_offset;
        camera.look_at(self.target);

        let keep = 1.0 - applied;
        self.spherical_delta *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;
    }
}
