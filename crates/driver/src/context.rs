use steelcube_camera::{CameraConfig, OrbitConfig, OrbitControls, PerspectiveCamera};
use steelcube_common::{NodeId, Viewport};
use steelcube_scene::{SceneGraph, SceneSetup};

/// Everything the frame driver mutates, owned in one place.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub graph: SceneGraph,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    /// Node rotated every frame.
    pub rotatable: NodeId,
    /// Group that receives nodes loaded after startup.
    pub decoration_parent: Option<NodeId>,
    pub front_face_z: f32,
    viewport: Viewport,
}

impl SceneContext {
    pub fn new(
        setup: SceneSetup,
        camera: &CameraConfig,
        controls: OrbitConfig,
        viewport: Viewport,
    ) -> Self {
        let viewport = viewport.sanitized();
        let mut camera_state = PerspectiveCamera::new(camera, viewport.aspect());
        camera_state.look_at(camera.target);
        Self {
            graph: setup.graph,
            camera: camera_state,
            controls: OrbitControls::new(controls, camera.target, viewport.height),
            rotatable: setup.rotatable,
            decoration_parent: setup.decoration_parent,
            front_face_z: setup.front_face_z,
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Apply a new viewport to the camera and controls. Returns `false` when
    /// nothing changed.
    pub(crate) fn apply_viewport(&mut self, viewport: Viewport) -> bool {
        let viewport = viewport.sanitized();
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        if self.camera.needs_projection_update() {
            self.camera.update_projection_matrix();
        }
        self.controls.set_viewport_height(viewport.height);
        true
    }
}
