use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use steelcube_camera::{CameraConfig, OrbitConfig};
use steelcube_render::RenderSettings;
use steelcube_scene::{PhysicalMaterial, SceneConfig, SceneVariant};
use steelcube_text::{DEFAULT_FONT_URL, TextGeometryParams};

/// Errors from loading or validating an [`AppConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the per-frame rotation increment is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// Fixed increment per rendered frame; speed follows the display rate.
    #[default]
    PerFrame,
    /// Increment scaled by elapsed time so speed is the same at any frame rate.
    ElapsedTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub mode: RotationMode,
    /// Radians per axis per frame. `None` uses the variant's default.
    pub rotation_delta: Option<Vec3>,
    /// Frame rate at which `ElapsedTime` matches `PerFrame` speed.
    pub reference_fps: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            mode: RotationMode::PerFrame,
            rotation_delta: None,
            reference_fps: 60.0,
        }
    }
}

impl AnimationConfig {
    pub fn delta_for(&self, variant: SceneVariant) -> Vec3 {
        self.rotation_delta
            .unwrap_or_else(|| variant.default_rotation_delta())
    }
}

/// Extruded text shown on the cube's front face in the text variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// URL or file path of a typeface JSON or OpenType font.
    pub font: String,
    pub content: String,
    pub geometry: TextGeometryParams,
    pub material: PhysicalMaterial,
    pub fetch_timeout_secs: u64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT_URL.to_string(),
            content: "STEEL".to_string(),
            geometry: TextGeometryParams::default(),
            material: PhysicalMaterial::engraved_text(),
            fetch_timeout_secs: 10,
        }
    }
}

impl TextConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

/// Complete application configuration. Every section has defaults, so an
/// empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scene: SceneConfig,
    pub camera: CameraConfig,
    pub controls: OrbitConfig,
    pub render: RenderSettings,
    pub animation: AnimationConfig,
    pub text: TextConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would make the camera, controls or text degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if !(self.scene.cube_size > 0.0) {
            return invalid(format!("scene.cube_size must be positive, got {}", self.scene.cube_size));
        }
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return invalid(format!("camera.fov must be in (0, 180), got {}", self.camera.fov));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return invalid(format!(
                "camera clip planes must satisfy 0 < near < far, got {}..{}",
                self.camera.near, self.camera.far
            ));
        }
        if !(0.0..=1.0).contains(&self.controls.damping_factor) {
            return invalid(format!(
                "controls.damping_factor must be in [0, 1], got {}",
                self.controls.damping_factor
            ));
        }
        if self.controls.min_distance > self.controls.max_distance {
            return invalid("controls.min_distance exceeds max_distance".into());
        }
        if !(self.animation.reference_fps > 0.0) {
            return invalid(format!(
                "animation.reference_fps must be positive, got {}",
                self.animation.reference_fps
            ));
        }
        if !(self.text.geometry.size > 0.0 && self.text.geometry.depth >= 0.0) {
            return invalid("text.geometry needs size > 0 and depth >= 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.camera.fov, 75.0);
        assert_eq!(config.controls.damping_factor, 0.05);
        assert_eq!(config.animation.mode, RotationMode::PerFrame);
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_fields() {
        let config = AppConfig::from_yaml(
            "scene:\n  variant: text_cube\nanimation:\n  mode: elapsed_time\ntext:\n  content: HI\n",
        )
        .unwrap();
        assert_eq!(config.scene.variant, SceneVariant::TextCube);
        assert_eq!(config.animation.mode, RotationMode::ElapsedTime);
        assert_eq!(config.text.content, "HI");
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            AppConfig::from_yaml("camera:\n  fov: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml("controls:\n  damping_factor: 2\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml("scene: [1, 2]"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn delta_follows_variant_unless_overridden() {
        let mut animation = AnimationConfig::default();
        assert_eq!(
            animation.delta_for(SceneVariant::TextCube),
            Vec3::new(0.0, 0.001, 0.0)
        );
        animation.rotation_delta = Some(Vec3::splat(0.01));
        assert_eq!(animation.delta_for(SceneVariant::Cube), Vec3::splat(0.01));
    }

    #[test]
    fn loads_from_file_and_round_trips() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        let yaml = AppConfig::default().to_yaml().unwrap();
        tmp.write_all(yaml.as_bytes()).unwrap();
        let loaded = AppConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppConfig::load(dir.path().join("nope.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
