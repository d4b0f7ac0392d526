use crate::geometry::Geometry;
use crate::graph::{Node, SceneGraph};
use crate::light::{Light, default_light_rig};
use crate::material::PhysicalMaterial;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use steelcube_common::{Color, NodeId};

/// Which of the two scene layouts to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneVariant {
    /// A single steel cube, rotating on X and Y.
    #[default]
    Cube,
    /// The cube inside a group that also receives extruded text on its
    /// front face once the font has loaded. The group rotates on Y.
    TextCube,
}

impl SceneVariant {
    /// Per-frame rotation increment for the rotatable node, radians per axis.
    pub fn default_rotation_delta(&self) -> Vec3 {
        match self {
            Self::Cube => Vec3::new(0.001, 0.001, 0.0),
            Self::TextCube => Vec3::new(0.0, 0.001, 0.0),
        }
    }
}

/// Scene tuning data. Defaults reproduce the studio cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub variant: SceneVariant,
    pub background: Color,
    pub cube_size: f32,
    pub material: PhysicalMaterial,
    pub lights: Vec<Light>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            variant: SceneVariant::Cube,
            background: Color::from_hex(0x2f353a),
            cube_size: 2.0,
            material: PhysicalMaterial::stainless_steel(),
            lights: default_light_rig(),
        }
    }
}

/// Result of scene initialization.
#[derive(Debug, Clone)]
pub struct SceneSetup {
    pub graph: SceneGraph,
    /// Node whose rotation the frame driver increments.
    pub rotatable: NodeId,
    /// Group that receives decorative nodes loaded later, if any.
    pub decoration_parent: Option<NodeId>,
    /// Z offset at which decorations sit flush with the cube's front face.
    pub front_face_z: f32,
}

/// Build the fixed scene graph for the configured variant.
pub fn initialize(config: &SceneConfig) -> SceneSetup {
    let _span = tracing::info_span!("scene_init", variant = ?config.variant).entered();

    let mut graph = SceneGraph::new(config.background);
    let cube = Node::mesh(
        "steel_cube",
        Geometry::cube(config.cube_size),
        config.material.clamped(),
    );

    let (rotatable, decoration_parent) = match config.variant {
        SceneVariant::Cube => (graph.add_root(cube), None),
        SceneVariant::TextCube => {
            let group = graph.add_root(Node::group("text_cube"));
            if let Err(err) = graph.add_child(group, cube) {
                tracing::error!("attaching cube to group failed: {err}");
            }
            (group, Some(group))
        }
    };

    for light in &config.lights {
        graph.add_light(*light);
    }

    tracing::info!(
        nodes = graph.node_count(),
        lights = graph.lights().len(),
        "scene initialized"
    );

    SceneSetup {
        graph,
        rotatable,
        decoration_parent,
        front_face_z: config.cube_size * 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    #[test]
    fn cube_variant_rotates_the_mesh() {
        let setup = initialize(&SceneConfig::default());
        assert_eq!(setup.graph.node_count(), 1);
        assert!(setup.decoration_parent.is_none());
        let node = setup.graph.get(setup.rotatable).unwrap();
        assert!(matches!(node.kind, NodeKind::Mesh(_)));
        assert_eq!(setup.graph.lights().len(), 11);
        assert_eq!(setup.front_face_z, 1.0);
    }

    #[test]
    fn text_variant_rotates_a_group() {
        let config = SceneConfig {
            variant: SceneVariant::TextCube,
            ..SceneConfig::default()
        };
        let setup = initialize(&config);
        assert_eq!(setup.decoration_parent, Some(setup.rotatable));
        let group = setup.graph.get(setup.rotatable).unwrap();
        assert!(matches!(group.kind, NodeKind::Group));
        assert_eq!(group.children().len(), 1);
        assert_eq!(setup.graph.drawables().len(), 1);
    }

    #[test]
    fn rotation_deltas_per_variant() {
        assert_eq!(
            SceneVariant::Cube.default_rotation_delta(),
            Vec3::new(0.001, 0.001, 0.0)
        );
        assert_eq!(
            SceneVariant::TextCube.default_rotation_delta(),
            Vec3::new(0.0, 0.001, 0.0)
        );
    }

    #[test]
    fn background_matches_studio_gray() {
        let setup = initialize(&SceneConfig::default());
        assert_eq!(setup.graph.background.to_hex(), 0x2f353a);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: SceneConfig = serde_yaml::from_str("variant: text_cube\ncube_size: 3.0\n").unwrap();
        assert_eq!(config.variant, SceneVariant::TextCube);
        assert_eq!(config.cube_size, 3.0);
        assert_eq!(config.lights.len(), 11);
    }
}
