use crate::config::TextConfig;
use glam::Vec3;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::Duration;
use steelcube_common::{NodeId, Transform};
use steelcube_scene::{Geometry, Node, PhysicalMaterial};
use steelcube_text::{Font, FontError, FontSource, TextGeometryParams, build_text_mesh};

/// Scene changes produced off the frame thread, applied at the start of the
/// next frame.
#[derive(Debug)]
pub enum SceneMessage {
    /// Attach `node` under `parent`, or as a root when `parent` is `None`.
    NodeReady { parent: Option<NodeId>, node: Node },
    /// A resource could not be loaded; the scene continues without it.
    ResourceFailed { resource: String, reason: String },
}

/// Everything needed to build the text node on a worker thread.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub source: FontSource,
    pub text: String,
    pub params: TextGeometryParams,
    pub material: PhysicalMaterial,
    pub timeout: Duration,
    pub parent: NodeId,
    /// Z of the face the text sits on.
    pub front_face_z: f32,
}

impl TextRequest {
    pub fn from_config(config: &TextConfig, parent: NodeId, front_face_z: f32) -> Self {
        Self {
            source: FontSource::parse(&config.font),
            text: config.content.clone(),
            params: config.geometry,
            material: config.material,
            timeout: config.fetch_timeout(),
            parent,
            front_face_z,
        }
    }
}

/// Fetch the font and extrude the text into a node whose back face rests on
/// the cube's front face.
pub fn build_text_node(request: &TextRequest) -> Result<Node, FontError> {
    let bytes = request.source.fetch(request.timeout)?;
    let font = Font::from_bytes(bytes)?;
    let mesh = build_text_mesh(&font, &request.text, &request.params)?;
    tracing::info!(
        font = %font.family_name(),
        triangles = mesh.triangle_count(),
        "text geometry ready"
    );
    let z = request.front_face_z + request.params.depth * 0.5;
    Ok(
        Node::mesh("text", Geometry::Custom(mesh), request.material)
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, z))),
    )
}

/// Build the text node on a background thread and post the result.
pub fn spawn_text_loader(
    request: TextRequest,
    sender: Sender<SceneMessage>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("font-loader".into())
        .spawn(move || {
            let _span = tracing::info_span!("font_loader", source = %request.source).entered();
            let message = match build_text_node(&request) {
                Ok(node) => SceneMessage::NodeReady {
                    parent: Some(request.parent),
                    node,
                },
                Err(err) => SceneMessage::ResourceFailed {
                    resource: request.source.to_string(),
                    reason: err.to_string(),
                },
            };
            if sender.send(message).is_err() {
                tracing::debug!("frame driver gone, dropping loaded text");
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc;

    const TYPEFACE: &str = r#"{
        "familyName": "Box",
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "xMax": 600, "yMin": 0, "yMax": 800 },
        "glyphs": {
            "?": { "ha": 700, "o": "m 0 0 l 600 0 l 600 800 l 0 800" }
        }
    }"#;

    fn request(source: FontSource) -> TextRequest {
        TextRequest {
            source,
            text: "HI".into(),
            params: TextGeometryParams {
                size: 0.5,
                depth: 0.1,
                tolerance: 0.01,
            },
            material: PhysicalMaterial::engraved_text(),
            timeout: Duration::from_secs(1),
            parent: NodeId::new(),
            front_face_z: 1.0,
        }
    }

    fn font_file() -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(TYPEFACE.as_bytes()).unwrap();
        tmp
    }

    #[test]
    fn request_from_config() {
        let config = TextConfig {
            font: "fonts/a.typeface.json".into(),
            ..TextConfig::default()
        };
        let parent = NodeId::new();
        let req = TextRequest::from_config(&config, parent, 1.0);
        assert_eq!(req.source, FontSource::File("fonts/a.typeface.json".into()));
        assert_eq!(req.text, "STEEL");
        assert_eq!(req.timeout, Duration::from_secs(10));
        assert_eq!(req.parent, parent);
    }

    #[test]
    fn text_node_sits_on_front_face() {
        let tmp = font_file();
        let node = build_text_node(&request(FontSource::File(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(node.name, "text");
        assert!((node.transform.position.z - 1.05).abs() < 1e-6);
        let mesh = node.as_mesh().unwrap().geometry.to_mesh();
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo.z + 0.05).abs() < 1e-5 && (hi.z - 0.05).abs() < 1e-5);
    }

    #[test]
    fn loader_posts_node_ready() {
        let tmp = font_file();
        let req = request(FontSource::File(tmp.path().to_path_buf()));
        let parent = req.parent;
        let (tx, rx) = mpsc::channel();
        spawn_text_loader(req, tx).unwrap().join().unwrap();
        match rx.recv().unwrap() {
            SceneMessage::NodeReady { parent: p, node } => {
                assert_eq!(p, Some(parent));
                assert_eq!(node.name, "text");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn loader_posts_failure_for_missing_font() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        spawn_text_loader(request(FontSource::File(dir.path().join("gone.json"))), tx)
            .unwrap()
            .join()
            .unwrap();
        assert!(matches!(
            rx.recv().unwrap(),
            SceneMessage::ResourceFailed { .. }
        ));
    }
}
