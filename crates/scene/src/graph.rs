use crate::geometry::Geometry;
use crate::light::Light;
use crate::material::PhysicalMaterial;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use steelcube_common::{Color, NodeId, Transform};

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown parent {0:?}")]
    UnknownParent(NodeId),
    #[error("node {0:?} is a mesh and cannot hold children")]
    NotAGroup(NodeId),
}

/// A record of every structural change to the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    NodeAdded {
        id: NodeId,
        parent: Option<NodeId>,
        name: String,
    },
    LightAdded {
        index: usize,
    },
}

/// A drawable mesh: geometry plus material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub geometry: Geometry,
    pub material: PhysicalMaterial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Mesh(MeshNode),
    Group,
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: PhysicalMaterial) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::Mesh(MeshNode { geometry, material }),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::Group,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }
}

/// A mesh node resolved to world space, ready to draw.
#[derive(Debug, Clone, Copy)]
pub struct Drawable<'a> {
    pub id: NodeId,
    pub world: Mat4,
    pub mesh: &'a MeshNode,
}

/// The scene: a node hierarchy, a light rig and a background color.
///
/// Nodes live in a BTreeMap keyed by id; draw order comes from `roots` and
/// each node's child list, so it follows insertion order rather than ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneGraph {
    pub background: Color,
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    lights: Vec<Light>,
    #[serde(skip)]
    event_log: Vec<SceneEvent>,
}

impl SceneGraph {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            ..Default::default()
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Find the first node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Add a top-level node. Returns its id.
    pub fn add_root(&mut self, mut node: Node) -> NodeId {
        let id = NodeId::new();
        node.parent = None;
        node.children.clear();
        self.event_log.push(SceneEvent::NodeAdded {
            id,
            parent: None,
            name: node.name.clone(),
        });
        self.nodes.insert(id, node);
        self.roots.push(id);
        id
    }

    /// Attach a node under an existing group.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::UnknownParent(parent))?;
        if !matches!(parent_node.kind, NodeKind::Group) {
            return Err(SceneError::NotAGroup(parent));
        }
        let id = NodeId::new();
        parent_node.children.push(id);
        node.parent = Some(parent);
        node.children.clear();
        self.event_log.push(SceneEvent::NodeAdded {
            id,
            parent: Some(parent),
            name: node.name.clone(),
        });
        self.nodes.insert(id, node);
        Ok(id)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
        self.event_log.push(SceneEvent::LightAdded {
            index: self.lights.len() - 1,
        });
    }

    /// Add `delta` (radians per axis) to a node's rotation. Not logged: this
    /// runs every frame.
    pub fn rotate_node(&mut self, id: NodeId, delta: Vec3) -> Result<Vec3, SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        node.transform.rotation += delta;
        Ok(node.transform.rotation)
    }

    /// Local-to-world matrix, composed along the parent chain.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut node = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self
                .nodes
                .get(&parent)
                .ok_or(SceneError::UnknownNode(parent))?;
            matrix = node.transform.matrix() * matrix;
        }
        Ok(matrix)
    }

    /// All mesh nodes in draw order with their world matrices.
    pub fn drawables(&self) -> Vec<Drawable<'_>> {
        let mut out = Vec::new();
        for root in &self.roots {
            self.collect(*root, Mat4::IDENTITY, &mut out);
        }
        out
    }

    fn collect<'a>(&'a self, id: NodeId, parent_world: Mat4, out: &mut Vec<Drawable<'a>>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let world = parent_world * node.transform.matrix();
        if let NodeKind::Mesh(mesh) = &node.kind {
            out.push(Drawable { id, world, mesh });
        }
        for child in &node.children {
            self.collect(*child, world, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Node {
        Node::mesh(
            "cube",
            Geometry::cube(2.0),
            PhysicalMaterial::stainless_steel(),
        )
    }

    #[test]
    fn add_root_logs_event() {
        let mut graph = SceneGraph::new(Color::BLACK);
        let id = graph.add_root(cube());
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.roots(), &[id]);
        assert!(matches!(
            graph.events()[0],
            SceneEvent::NodeAdded { parent: None, .. }
        ));
    }

    #[test]
    fn add_child_requires_group() {
        let mut graph = SceneGraph::default();
        let mesh = graph.add_root(cube());
        assert_eq!(
            graph.add_child(mesh, cube()),
            Err(SceneError::NotAGroup(mesh))
        );
        let missing = NodeId::new();
        assert_eq!(
            graph.add_child(missing, cube()),
            Err(SceneError::UnknownParent(missing))
        );
    }

    #[test]
    fn child_links_both_ways() {
        let mut graph = SceneGraph::default();
        let group = graph.add_root(Node::group("group"));
        let child = graph.add_child(group, cube()).unwrap();
        assert_eq!(graph.get(group).unwrap().children(), &[child]);
        assert_eq!(graph.get(child).unwrap().parent(), Some(group));
        assert_eq!(graph.drain_events().len(), 2);
        assert!(graph.events().is_empty());
    }

    #[test]
    fn rotate_accumulates_raw() {
        let mut graph = SceneGraph::default();
        let id = graph.add_root(cube());
        for _ in 0..10 {
            graph.rotate_node(id, Vec3::new(0.5, 0.0, 0.0)).unwrap();
        }
        let r = graph.get(id).unwrap().transform.rotation;
        assert!((r.x - 5.0).abs() < 1e-5);
        assert_eq!(r.y, 0.0);
        assert!(graph.rotate_node(NodeId::new(), Vec3::ONE).is_err());
    }

    #[test]
    fn world_matrix_composes_parent() {
        let mut graph = SceneGraph::default();
        let group = graph.add_root(
            Node::group("group").with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
        );
        let child = graph
            .add_child(
                group,
                cube().with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))),
            )
            .unwrap();
        let p = graph
            .world_matrix(child)
            .unwrap()
            .transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn drawables_follow_insertion_order() {
        let mut graph = SceneGraph::default();
        let group = graph.add_root(Node::group("group"));
        let first = graph.add_child(group, cube()).unwrap();
        let second = graph.add_child(group, cube()).unwrap();
        let third = graph.add_root(cube());
        let ids: Vec<NodeId> = graph.drawables().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[test]
    fn find_by_name() {
        let mut graph = SceneGraph::default();
        let id = graph.add_root(cube());
        assert_eq!(graph.find_by_name("cube"), Some(id));
        assert_eq!(graph.find_by_name("missing"), None);
    }

    #[test]
    fn lights_are_logged() {
        let mut graph = SceneGraph::default();
        graph.add_light(Light::point(0xffffff, 1.0, Vec3::ONE));
        assert_eq!(graph.lights().len(), 1);
        assert_eq!(graph.events(), &[SceneEvent::LightAdded { index: 0 }]);
    }
}
