use serde::{Deserialize, Serialize};
use steelcube_common::Color;

/// Metallic-roughness material with a clearcoat layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalMaterial {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub reflectivity: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub env_map_intensity: f32,
}

impl Default for PhysicalMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            reflectivity: 0.5,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            env_map_intensity: 1.0,
        }
    }
}

impl PhysicalMaterial {
    /// Polished stainless steel used for the cube.
    pub fn stainless_steel() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.9,
            roughness: 0.15,
            reflectivity: 1.0,
            clearcoat: 0.8,
            clearcoat_roughness: 0.1,
            env_map_intensity: 1.5,
        }
    }

    /// Darker brushed finish for lettering so it reads against the cube.
    pub fn engraved_text() -> Self {
        Self {
            color: Color::from_hex(0x1a1d20),
            metalness: 0.6,
            roughness: 0.35,
            reflectivity: 0.5,
            clearcoat: 0.3,
            clearcoat_roughness: 0.2,
            env_map_intensity: 1.0,
        }
    }

    /// Parameters clamped to their physical ranges.
    pub fn clamped(self) -> Self {
        Self {
            metalness: self.metalness.clamp(0.0, 1.0),
            roughness: self.roughness.clamp(0.0, 1.0),
            reflectivity: self.reflectivity.clamp(0.0, 1.0),
            clearcoat: self.clearcoat.clamp(0.0, 1.0),
            clearcoat_roughness: self.clearcoat_roughness.clamp(0.0, 1.0),
            env_map_intensity: self.env_map_intensity.max(0.0),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steel_is_shiny_metal() {
        let m = PhysicalMaterial::stainless_steel();
        assert!(m.metalness > 0.8);
        assert!(m.roughness < 0.2);
        assert_eq!(m.clamped(), m);
    }

    #[test]
    fn clamped_limits_ranges() {
        let m = PhysicalMaterial {
            metalness: 2.0,
            roughness: -1.0,
            env_map_intensity: -3.0,
            ..PhysicalMaterial::default()
        }
        .clamped();
        assert_eq!(m.metalness, 1.0);
        assert_eq!(m.roughness, 0.0);
        assert_eq!(m.env_map_intensity, 0.0);
    }
}
