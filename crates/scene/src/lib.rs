//! Scene graph and scene initializer.
//!
//! # Invariants
//! - Nodes are only added through [`SceneGraph`] operations, which log a
//!   [`SceneEvent`] for each structural change.
//! - Drawable iteration order is deterministic: roots in insertion order,
//!   then children depth-first in insertion order.
//! - The renderer reads the graph; only the frame driver mutates it.

mod geometry;
mod graph;
mod init;
mod light;
mod material;

pub use geometry::{Geometry, MeshData};
pub use graph::{Drawable, MeshNode, Node, NodeKind, SceneError, SceneEvent, SceneGraph};
pub use init::{SceneConfig, SceneSetup, SceneVariant, initialize};
pub use light::{Light, default_light_rig};
pub use material::PhysicalMaterial;
