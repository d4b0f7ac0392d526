use serde::{Deserialize, Serialize};

/// Tone curve applied after lighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    None,
    Linear,
    Reinhard,
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    /// Index passed to shaders.
    pub fn shader_index(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Linear => 1,
            Self::Reinhard => 2,
            Self::AcesFilmic => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerPreference {
    LowPower,
    #[default]
    HighPerformance,
}

/// Renderer construction options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub antialias: bool,
    pub power_preference: PowerPreference,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    /// Use inverse-square falloff for point and spot lights.
    pub physically_correct_lights: bool,
    pub vsync: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            antialias: true,
            power_preference: PowerPreference::HighPerformance,
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.2,
            physically_correct_lights: true,
            vsync: true,
        }
    }
}

impl RenderSettings {
    /// MSAA sample count implied by `antialias`.
    pub fn sample_count(&self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }
}
