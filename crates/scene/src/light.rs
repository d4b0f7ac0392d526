use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use steelcube_common::Color;

/// A light source in the scene.
///
/// Spot lights aim at the origin. Distance `0.0` means no range cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Light {
    Spot {
        color: Color,
        intensity: f32,
        position: Vec3,
        /// Half-angle of the cone, radians.
        angle: f32,
        /// Fraction of the cone that is attenuated, `0.0..=1.0`.
        penumbra: f32,
        #[serde(default)]
        distance: f32,
        #[serde(default = "default_decay")]
        decay: f32,
    },
    Point {
        color: Color,
        intensity: f32,
        position: Vec3,
        #[serde(default)]
        distance: f32,
        #[serde(default = "default_decay")]
        decay: f32,
    },
    Ambient {
        color: Color,
        intensity: f32,
    },
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
}

fn default_decay() -> f32 {
    2.0
}

impl Light {
    pub fn spot(color: u32, intensity: f32, position: Vec3) -> Self {
        Self::Spot {
            color: Color::from_hex(color),
            intensity,
            position,
            angle: PI / 6.0,
            penumbra: 0.1,
            distance: 0.0,
            decay: default_decay(),
        }
    }

    pub fn point(color: u32, intensity: f32, position: Vec3) -> Self {
        Self::Point {
            color: Color::from_hex(color),
            intensity,
            position,
            distance: 0.0,
            decay: default_decay(),
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Self::Spot { intensity, .. }
            | Self::Point { intensity, .. }
            | Self::Ambient { intensity, .. }
            | Self::Hemisphere { intensity, .. } => *intensity,
        }
    }

    /// Position for lights that have one.
    pub fn position(&self) -> Option<Vec3> {
        match self {
            Self::Spot { position, .. } | Self::Point { position, .. } => Some(*position),
            Self::Ambient { .. } | Self::Hemisphere { .. } => None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.position().is_some()
    }
}

/// The studio rig used around the cube: five spots on the axes, two rim
/// points behind, two warm fills in front, plus ambient and hemisphere.
pub fn default_light_rig() -> Vec<Light> {
    vec![
        // key from the front
        Light::spot(0xfff0e0, 2.5, Vec3::new(0.0, 0.0, 5.0)),
        Light::spot(0xffe5cc, 2.5, Vec3::new(0.0, 5.0, 0.0)),
        Light::spot(0xffe5cc, 2.5, Vec3::new(5.0, 0.0, 0.0)),
        Light::spot(0xffe5cc, 2.5, Vec3::new(-5.0, 0.0, 0.0)),
        Light::spot(0xffffff, 2.0, Vec3::new(0.0, 0.0, -5.0)),
        Light::point(0xffffff, 1.5, Vec3::new(3.0, 3.0, -3.0)),
        Light::point(0xffffff, 1.5, Vec3::new(-3.0, -3.0, -3.0)),
        Light::point(0xffe5cc, 0.8, Vec3::new(2.0, -2.0, 3.0)),
        Light::point(0xffe5cc, 0.8, Vec3::new(-2.0, 2.0, 3.0)),
        Light::Ambient {
            color: Color::WHITE,
            intensity: 2.5,
        },
        Light::Hemisphere {
            sky: Color::WHITE,
            ground: Color::from_hex(0xffffa7),
            intensity: 0.6,
        },
    ]
}
