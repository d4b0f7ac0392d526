use crate::config::{AnimationConfig, RotationMode};
use crate::context::SceneContext;
use crate::loader::SceneMessage;
use crate::scheduler::{CancellationToken, FrameScheduler};
use crate::timer::FrameTimer;
use glam::Vec3;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use steelcube_common::Viewport;
use steelcube_input::PointerAction;
use steelcube_render::{RenderError, Renderer};

const TIMER_CAPACITY: usize = 120;

/// Why the driver stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    RenderFailed(RenderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stopped(StopReason),
}

/// Runs the per-frame animation loop over a [`SceneContext`].
///
/// Each frame drains pending scene messages, steps the orbit controls,
/// rotates the rotatable node, renders once and schedules exactly one more
/// frame. A cancelled or failed driver does no further work.
pub struct FrameDriver<R, S> {
    context: SceneContext,
    renderer: R,
    scheduler: S,
    token: CancellationToken,
    sender: Sender<SceneMessage>,
    messages: Receiver<SceneMessage>,
    rotation_delta: Vec3,
    mode: RotationMode,
    reference_fps: f32,
    frames: u64,
    stopped: Option<StopReason>,
    timer: FrameTimer,
}

impl<R: Renderer, S: FrameScheduler> FrameDriver<R, S> {
    pub fn new(
        context: SceneContext,
        mut renderer: R,
        scheduler: S,
        animation: &AnimationConfig,
        rotation_delta: Vec3,
    ) -> Self {
        renderer.set_size(context.viewport());
        let (sender, messages) = mpsc::channel();
        Self {
            context,
            renderer,
            scheduler,
            token: CancellationToken::new(),
            sender,
            messages,
            rotation_delta,
            mode: animation.mode,
            reference_fps: animation.reference_fps.max(1.0),
            frames: 0,
            stopped: None,
            timer: FrameTimer::new(TIMER_CAPACITY),
        }
    }

    pub fn context(&self) -> &SceneContext {
        &self.context
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stopped.as_ref()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_some() || self.token.is_cancelled()
    }

    /// Token that stops the loop from anywhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Channel for loaders to post scene changes.
    pub fn message_sender(&self) -> Sender<SceneMessage> {
        self.sender.clone()
    }

    /// Request the first frame.
    pub fn start(&mut self) {
        if self.is_stopped() {
            return;
        }
        tracing::info!(
            mode = ?self.mode,
            delta = ?self.rotation_delta,
            "frame loop started"
        );
        self.scheduler.schedule_next_frame();
    }

    /// Run one frame.
    pub fn on_frame(&mut self, now: Instant) -> FrameOutcome {
        if let Some(reason) = &self.stopped {
            return FrameOutcome::Stopped(reason.clone());
        }
        if self.token.is_cancelled() {
            tracing::info!(frames = self.frames, "frame loop cancelled");
            self.stopped = Some(StopReason::Cancelled);
            return FrameOutcome::Stopped(StopReason::Cancelled);
        }

        let elapsed = self.timer.tick(now);

        self.drain_messages();

        let delta = self.frame_delta(elapsed);
        let ctx = &mut self.context;
        ctx.controls.update(&mut ctx.camera);
        if ctx.camera.needs_projection_update() {
            ctx.camera.update_projection_matrix();
        }

        if let Err(err) = ctx.graph.rotate_node(ctx.rotatable, delta) {
            tracing::warn!("rotation skipped: {err}");
        }

        if let Err(err) = self.renderer.render(&ctx.graph, &ctx.camera) {
            if err.is_fatal() {
                tracing::error!(frames = self.frames, "render failed, stopping frame loop: {err}");
                let reason = StopReason::RenderFailed(err);
                self.stopped = Some(reason.clone());
                return FrameOutcome::Stopped(reason);
            }
            tracing::warn!("frame skipped: {err}");
        }

        self.frames += 1;
        tracing::trace!(frame = self.frames, "frame rendered");
        self.scheduler.schedule_next_frame();
        FrameOutcome::Continue
    }

    /// Run up to `n` frames back to back, stopping early if the loop stops.
    pub fn run_frames(&mut self, n: u64) -> FrameOutcome {
        let frame = Duration::from_secs_f32(1.0 / self.reference_fps);
        let mut now = self.timer.last_tick().map_or_else(Instant::now, |t| t + frame);
        let mut outcome = FrameOutcome::Continue;
        for _ in 0..n {
            outcome = self.on_frame(now);
            if matches!(outcome, FrameOutcome::Stopped(_)) {
                break;
            }
            now += frame;
        }
        outcome
    }

    /// React to a viewport change. Repeating the current viewport is a no-op.
    pub fn resize(&mut self, viewport: Viewport) {
        if !self.context.apply_viewport(viewport) {
            return;
        }
        let viewport = self.context.viewport();
        self.renderer.set_size(viewport);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = viewport.pixel_ratio,
            "viewport resized"
        );
    }

    pub fn handle_pointer(&mut self, action: PointerAction) {
        self.context.controls.handle(action);
    }

    fn frame_delta(&self, elapsed: Option<Duration>) -> Vec3 {
        match self.mode {
            RotationMode::PerFrame => self.rotation_delta,
            RotationMode::ElapsedTime => {
                let frames = elapsed
                    .map(|dt| dt.as_secs_f32() * self.reference_fps)
                    .unwrap_or(1.0);
                self.rotation_delta * frames
            }
        }
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.messages.try_recv() {
            match message {
                SceneMessage::NodeReady { parent, node } => {
                    let name = node.name.clone();
                    let graph = &mut self.context.graph;
                    let result = match parent {
                        Some(parent) => graph.add_child(parent, node),
                        None => Ok(graph.add_root(node)),
                    };
                    match result {
                        Ok(id) => tracing::info!(node = %id.short(), %name, "node attached"),
                        Err(err) => tracing::warn!(%name, "could not attach node: {err}"),
                    }
                }
                SceneMessage::ResourceFailed { resource, reason } => {
                    tracing::warn!(%resource, "{reason}; continuing without it");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use steelcube_camera::{CameraConfig, OrbitConfig, PerspectiveCamera};
    use steelcube_common::Transform;
    use steelcube_render::{DebugTextRenderer, SurfaceSize};
    use tracing_subscriber::layer::{self, Layer, SubscriberExt};
    use steelcube_scene::{
        Geometry, Node, PhysicalMaterial, SceneConfig, SceneGraph, SceneVariant, initialize,
    };

    /// Counts calls and fails on demand.
    #[derive(Default)]
    struct MockRenderer {
        renders: u64,
        size_changes: u64,
        viewport: Option<Viewport>,
        fail_at: Option<(u64, RenderError)>,
    }

    impl Renderer for MockRenderer {
        fn set_size(&mut self, viewport: Viewport) {
            if self.viewport != Some(viewport) {
                self.viewport = Some(viewport);
                self.size_changes += 1;
            }
        }

        fn surface_size(&self) -> SurfaceSize {
            self.viewport
                .map(|v| SurfaceSize::from_viewport(&v))
                .unwrap_or(SurfaceSize {
                    width: 1,
                    height: 1,
                })
        }

        fn render(
            &mut self,
            _scene: &SceneGraph,
            _camera: &PerspectiveCamera,
        ) -> Result<(), RenderError> {
            self.renders += 1;
            match &self.fail_at {
                Some((frame, err)) if *frame == self.renders => Err(err.clone()),
                _ => Ok(()),
            }
        }
    }

    fn context(variant: SceneVariant, viewport: Viewport) -> SceneContext {
        let scene = SceneConfig {
            variant,
            ..SceneConfig::default()
        };
        SceneContext::new(
            initialize(&scene),
            &CameraConfig::default(),
            OrbitConfig::default(),
            viewport,
        )
    }

    fn driver_with<R: Renderer>(
        variant: SceneVariant,
        renderer: R,
        animation: AnimationConfig,
    ) -> FrameDriver<R, ManualScheduler> {
        FrameDriver::new(
            context(variant, Viewport::new(800.0, 600.0, 1.0)),
            renderer,
            ManualScheduler::new(),
            &animation,
            animation.delta_for(variant),
        )
    }

    fn driver() -> FrameDriver<MockRenderer, ManualScheduler> {
        driver_with(
            SceneVariant::Cube,
            MockRenderer::default(),
            AnimationConfig::default(),
        )
    }

    fn rotation(driver: &FrameDriver<impl Renderer, ManualScheduler>) -> Vec3 {
        let ctx = driver.context();
        ctx.graph.get(ctx.rotatable).unwrap().transform.rotation
    }

    #[test]
    fn aspect_tracks_last_of_many_resizes() {
        let mut driver = driver();
        let sizes = [(1024.0, 768.0), (300.0, 900.0), (1920.0, 1080.0), (640.0, 480.0)];
        for (w, h) in sizes {
            driver.resize(Viewport::new(w, h, 1.0));
            assert!((driver.context().camera.aspect() - w / h).abs() < 1e-6);
            assert!(!driver.context().camera.needs_projection_update());
        }
        assert_eq!(driver.renderer().size_changes, 1 + sizes.len() as u64);
    }

    #[test]
    fn repeated_resize_is_idempotent() {
        let mut driver = driver();
        driver.resize(Viewport::new(1024.0, 768.0, 2.0));
        let projection = driver.context().camera.projection_matrix();
        let changes = driver.renderer().size_changes;
        for _ in 0..5 {
            driver.resize(Viewport::new(1024.0, 768.0, 2.0));
        }
        assert_eq!(driver.renderer().size_changes, changes);
        assert_eq!(driver.context().camera.projection_matrix(), projection);
        assert_eq!(
            driver.renderer().surface_size(),
            SurfaceSize {
                width: 2048,
                height: 1536
            }
        );
    }

    #[test]
    fn rotation_accumulates_per_frame() {
        let mut driver = driver();
        driver.start();
        assert_eq!(driver.run_frames(250), FrameOutcome::Continue);
        let r = rotation(&driver);
        assert!((r.x - 0.25).abs() < 1e-4);
        assert!((r.y - 0.25).abs() < 1e-4);
        assert_eq!(r.z, 0.0);
    }

    #[test]
    fn text_variant_rotates_group_on_y_only() {
        let mut driver = driver_with(
            SceneVariant::TextCube,
            MockRenderer::default(),
            AnimationConfig::default(),
        );
        driver.run_frames(100);
        let r = rotation(&driver);
        assert_eq!(r.x, 0.0);
        assert!((r.y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn exactly_one_reschedule_per_frame() {
        let mut driver = driver();
        driver.start();
        assert_eq!(driver.scheduler().requests(), 1);
        for i in 0..1000u64 {
            assert!(driver.scheduler_mut().take_request());
            assert_eq!(driver.on_frame(Instant::now()), FrameOutcome::Continue);
            assert_eq!(driver.scheduler().requests(), i + 2);
        }
        assert_eq!(driver.renderer().renders, 1000);
        assert_eq!(driver.frames(), 1000);
    }

    #[test]
    fn end_to_end_single_frame() {
        let renderer = DebugTextRenderer::new(Viewport::new(800.0, 600.0, 1.0));
        let mut driver = driver_with(SceneVariant::Cube, renderer, AnimationConfig::default());
        driver.start();
        assert_eq!(driver.run_frames(1), FrameOutcome::Continue);
        assert_eq!(driver.renderer().frames(), 1);
        let out = driver.renderer().last_frame();
        assert!(out.contains("800x600"));
        assert!(out.contains("aspect=1.3333"));
        assert!(out.contains("rot=(0.0010, 0.0010,"));
    }

    #[test]
    fn resize_applies_pixel_ratio_to_surface() {
        let renderer = DebugTextRenderer::new(Viewport::new(800.0, 600.0, 1.0));
        let mut driver = driver_with(SceneVariant::Cube, renderer, AnimationConfig::default());
        driver.resize(Viewport::new(1920.0, 1080.0, 2.0));
        assert_eq!(
            driver.renderer().surface_size(),
            SurfaceSize {
                width: 3840,
                height: 2160
            }
        );
        assert!((driver.context().camera.aspect() - 16.0 / 9.0).abs() < 1e-6);
        driver.run_frames(1);
        assert!(driver.renderer().last_frame().contains("3840x2160"));
    }

    #[test]
    fn font_failure_keeps_loop_running() {
        let mut driver = driver_with(
            SceneVariant::TextCube,
            MockRenderer::default(),
            AnimationConfig::default(),
        );
        driver
            .message_sender()
            .send(SceneMessage::ResourceFailed {
                resource: "fonts/missing.json".into(),
                reason: "not found".into(),
            })
            .unwrap();
        assert_eq!(driver.run_frames(10), FrameOutcome::Continue);
        assert_eq!(driver.frames(), 10);
        assert_eq!(driver.context().graph.node_count(), 2);
    }

    #[test]
    fn node_ready_attaches_before_render() {
        let mut driver = driver_with(
            SceneVariant::TextCube,
            MockRenderer::default(),
            AnimationConfig::default(),
        );
        let parent = driver.context().decoration_parent;
        let text = Node::mesh("text", Geometry::cube(0.1), PhysicalMaterial::default())
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, 1.05)));
        driver
            .message_sender()
            .send(SceneMessage::NodeReady { parent, node: text })
            .unwrap();
        driver.run_frames(1);
        let graph = &driver.context().graph;
        let id = graph.find_by_name("text").unwrap();
        assert_eq!(graph.get(id).unwrap().parent(), parent);
        assert_eq!(graph.drawables().len(), 2);
    }

    #[test]
    fn device_loss_stops_loop() {
        let renderer = MockRenderer {
            fail_at: Some((3, RenderError::DeviceLost("reset".into()))),
            ..MockRenderer::default()
        };
        let mut driver = driver_with(SceneVariant::Cube, renderer, AnimationConfig::default());
        driver.start();
        let outcome = driver.run_frames(10);
        assert_eq!(
            outcome,
            FrameOutcome::Stopped(StopReason::RenderFailed(RenderError::DeviceLost(
                "reset".into()
            )))
        );
        assert_eq!(driver.renderer().renders, 3);
        // start + two successful frames
        assert_eq!(driver.scheduler().requests(), 3);
        assert!(matches!(
            driver.on_frame(Instant::now()),
            FrameOutcome::Stopped(_)
        ));
        assert_eq!(driver.renderer().renders, 3);
    }

    /// Counts `ERROR` level events.
    struct ErrorCounter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: layer::Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn device_loss_logs_one_error() {
        let errors = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let subscriber =
            tracing_subscriber::registry().with(ErrorCounter(std::sync::Arc::clone(&errors)));
        tracing::subscriber::with_default(subscriber, || {
            let renderer = MockRenderer {
                fail_at: Some((2, RenderError::DeviceLost("reset".into()))),
                ..MockRenderer::default()
            };
            let mut driver =
                driver_with(SceneVariant::Cube, renderer, AnimationConfig::default());
            driver.start();
            driver.run_frames(5);
            driver.on_frame(Instant::now());
            assert!(driver.is_stopped());
        });
        assert_eq!(errors.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn recoverable_render_error_skips_frame() {
        let renderer = MockRenderer {
            fail_at: Some((2, RenderError::Backend("timeout".into()))),
            ..MockRenderer::default()
        };
        let mut driver = driver_with(SceneVariant::Cube, renderer, AnimationConfig::default());
        assert_eq!(driver.run_frames(5), FrameOutcome::Continue);
        assert_eq!(driver.scheduler().requests(), 5);
    }

    #[test]
    fn cancelled_driver_does_nothing() {
        let mut driver = driver();
        driver.start();
        let token = driver.cancellation_token();
        driver.run_frames(3);
        token.cancel();
        assert_eq!(
            driver.on_frame(Instant::now()),
            FrameOutcome::Stopped(StopReason::Cancelled)
        );
        assert_eq!(driver.renderer().renders, 3);
        assert_eq!(driver.scheduler().requests(), 4);
        assert_eq!(driver.stop_reason(), Some(&StopReason::Cancelled));
        driver.start();
        assert_eq!(driver.scheduler().requests(), 4);
    }

    #[test]
    fn elapsed_time_mode_scales_by_interval() {
        let animation = AnimationConfig {
            mode: RotationMode::ElapsedTime,
            ..AnimationConfig::default()
        };
        let mut driver = driver_with(SceneVariant::Cube, MockRenderer::default(), animation);
        let start = Instant::now();
        driver.on_frame(start);
        // Half a second at 60 fps reference is 30 frames' worth.
        driver.on_frame(start + Duration::from_millis(500));
        let r = rotation(&driver);
        assert!((r.y - 0.031).abs() < 1e-4);
    }

    #[test]
    fn pointer_input_moves_camera_on_next_frame() {
        let mut driver = driver();
        driver.handle_pointer(PointerAction::Rotate(glam::Vec2::new(-150.0, 0.0)));
        driver.run_frames(1);
        let position = driver.context().camera.position;
        assert!(position.x > 0.0);
        assert!((position.length() - 6.0).abs() < 1e-3);
    }
}
