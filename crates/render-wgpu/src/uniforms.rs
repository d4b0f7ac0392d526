use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use steelcube_camera::PerspectiveCamera;
use steelcube_render::RenderSettings;
use steelcube_scene::{Light, PhysicalMaterial, SceneGraph};

/// Point and spot lights the shader can evaluate per frame.
pub(crate) const MAX_LIGHTS: usize = 16;

const KIND_POINT: f32 = 0.0;
const KIND_SPOT: f32 = 1.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub(crate) struct GpuLight {
    /// xyz world position, w light kind.
    pub position: [f32; 4],
    /// Linear rgb, w intensity.
    pub color: [f32; 4],
    /// Normalized spot direction, w cosine of the outer cone.
    pub direction: [f32; 4],
    /// Range cutoff, decay exponent, cosine of the inner cone.
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// Summed ambient radiance.
    pub ambient: [f32; 4],
    /// Hemisphere sky color, w intensity.
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    /// Light count, tone mapping index, physical falloff flag.
    pub flags: [u32; 4],
    /// x exposure.
    pub exposure: [f32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// Metalness, roughness, clearcoat, clearcoat roughness.
    pub surface: [f32; 4],
    /// Reflectivity, environment intensity.
    pub extra: [f32; 4],
}

impl ObjectUniforms {
    pub fn new(world: Mat4, material: &PhysicalMaterial) -> Self {
        let m = material.clamped();
        let [r, g, b] = m.color.to_linear();
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: world.inverse().transpose().to_cols_array_2d(),
            base_color: [r, g, b, 1.0],
            surface: [m.metalness, m.roughness, m.clearcoat, m.clearcoat_roughness],
            extra: [m.reflectivity, m.env_map_intensity, 0.0, 0.0],
        }
    }
}

/// Pack the camera and light rig into the per-frame uniform block.
pub(crate) fn pack_globals(
    scene: &SceneGraph,
    camera: &PerspectiveCamera,
    settings: &RenderSettings,
) -> Globals {
    let mut globals = Globals {
        view_proj: camera.view_projection().to_cols_array_2d(),
        camera_position: camera.position.extend(1.0).to_array(),
        ambient: [0.0; 4],
        sky: [0.0; 4],
        ground: [0.0; 4],
        flags: [
            0,
            settings.tone_mapping.shader_index(),
            u32::from(settings.physically_correct_lights),
            0,
        ],
        exposure: [settings.exposure, 0.0, 0.0, 0.0],
        lights: [GpuLight::default(); MAX_LIGHTS],
    };

    let mut count = 0usize;
    let mut dropped = 0usize;
    for light in scene.lights() {
        match *light {
            Light::Ambient { color, intensity } => {
                let c = Vec3::from_array(color.to_linear()) * intensity;
                for (slot, v) in globals.ambient.iter_mut().zip(c.to_array()) {
                    *slot += v;
                }
            }
            Light::Hemisphere {
                sky,
                ground,
                intensity,
            } => {
                let [r, g, b] = sky.to_linear();
                globals.sky = [r, g, b, intensity];
                let [r, g, b] = ground.to_linear();
                globals.ground = [r, g, b, 0.0];
            }
            Light::Point { .. } | Light::Spot { .. } if count >= MAX_LIGHTS => dropped += 1,
            Light::Point {
                color,
                intensity,
                position,
                distance,
                decay,
            } => {
                let [r, g, b] = color.to_linear();
                globals.lights[count] = GpuLight {
                    position: [position.x, position.y, position.z, KIND_POINT],
                    color: [r, g, b, intensity],
                    direction: [0.0, 0.0, -1.0, -1.0],
                    params: [distance, decay, -1.0, 0.0],
                };
                count += 1;
            }
            Light::Spot {
                color,
                intensity,
                position,
                angle,
                penumbra,
                distance,
                decay,
            } => {
                let [r, g, b] = color.to_linear();
                let dir = (-position).try_normalize().unwrap_or(Vec3::NEG_Z);
                let outer = angle.cos();
                let inner = (angle * (1.0 - penumbra.clamp(0.0, 1.0))).cos();
                globals.lights[count] = GpuLight {
                    position: [position.x, position.y, position.z, KIND_SPOT],
                    color: [r, g, b, intensity],
                    direction: [dir.x, dir.y, dir.z, outer],
                    params: [distance, decay, inner, 0.0],
                };
                count += 1;
            }
        }
    }
    if dropped > 0 {
        tracing::warn!(dropped, max = MAX_LIGHTS, "too many local lights, extra ignored");
    }
    globals.flags[0] = count as u32;
    globals
}

#[cfg(test)]
mod tests {
    use super::*;
    use steelcube_camera::CameraConfig;
    use steelcube_common::Color;
    use steelcube_scene::{SceneConfig, initialize};

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(&CameraConfig::default(), 1.0)
    }

    #[test]
    fn uniform_blocks_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GpuLight>() % 16, 0);
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
    }

    #[test]
    fn packs_default_rig() {
        let setup = initialize(&SceneConfig::default());
        let globals = pack_globals(&setup.graph, &camera(), &RenderSettings::default());
        assert_eq!(globals.flags[0], 9);
        assert_eq!(globals.flags[1], 3);
        assert_eq!(globals.flags[2], 1);
        assert!((globals.ambient[0] - 2.5).abs() < 1e-6);
        assert_eq!(globals.sky[3], 0.6);
        // Spot at +Z aims back at the origin.
        assert_eq!(globals.lights[0].position[3], KIND_SPOT);
        assert!((globals.lights[0].direction[2] + 1.0).abs() < 1e-6);
        assert!(globals.lights[0].params[2] > globals.lights[0].direction[3]);
    }

    #[test]
    fn excess_lights_are_dropped() {
        let mut graph = SceneGraph::new(Color::BLACK);
        for i in 0..20 {
            graph.add_light(Light::point(0xffffff, 1.0, Vec3::new(i as f32, 0.0, 0.0)));
        }
        let globals = pack_globals(&graph, &camera(), &RenderSettings::default());
        assert_eq!(globals.flags[0], MAX_LIGHTS as u32);
    }

    #[test]
    fn object_uniforms_carry_material() {
        let world = Mat4::from_scale(Vec3::splat(2.0));
        let obj = ObjectUniforms::new(world, &PhysicalMaterial::stainless_steel());
        assert_eq!(obj.surface[0], 0.9);
        assert_eq!(obj.extra[1], 1.5);
        assert!((obj.normal_matrix[0][0] - 0.5).abs() < 1e-6);
    }
}
