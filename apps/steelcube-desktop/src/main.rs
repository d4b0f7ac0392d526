use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec2;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use steelcube_common::Viewport;
use steelcube_driver::{
    AppConfig, FrameDriver, FrameOutcome, FrameScheduler, RotationMode, SceneContext,
    StopReason, TextRequest, spawn_text_loader,
};
use steelcube_input::{PointerButton, PointerState};
use steelcube_render_wgpu::WgpuRenderer;
use steelcube_scene::{SceneVariant, initialize};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Pixels of trackpad scroll treated as one wheel line.
const PIXELS_PER_LINE: f32 = 50.0;

#[derive(Parser)]
#[command(name = "steelcube-desktop", about = "Steel cube desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Font URL or path for the text variant
    #[arg(long)]
    font: Option<String>,

    /// Text to extrude onto the cube
    #[arg(long)]
    text: Option<String>,

    /// Scale rotation by elapsed time instead of per frame
    #[arg(long)]
    time_based: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    Cube,
    Text,
}

impl From<Variant> for SceneVariant {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Cube => SceneVariant::Cube,
            Variant::Text => SceneVariant::TextCube,
        }
    }
}

/// Frame requests become window redraw requests.
struct WinitScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for WinitScheduler {
    fn schedule_next_frame(&mut self) {
        self.window.request_redraw();
    }
}

/// Pairs the window's physical size with the scale factor it belongs to.
#[derive(Debug, Clone, Copy)]
struct SurfaceTracker {
    size: PhysicalSize<u32>,
    scale_factor: f64,
    scale_pending: bool,
}

impl SurfaceTracker {
    fn new(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        Self {
            size,
            scale_factor,
            scale_pending: false,
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport::from_physical(self.size.width, self.size.height, self.scale_factor)
    }

    fn resized(&mut self, size: PhysicalSize<u32>) -> Viewport {
        self.size = size;
        self.scale_pending = false;
        self.viewport()
    }

    /// The window size may still be the pre-change size here, so the new
    /// viewport waits for the next resize or redraw.
    fn scale_changed(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
        self.scale_pending = true;
    }

    /// Viewport for a scale change that no resize followed.
    fn settle(&mut self, size: PhysicalSize<u32>) -> Option<Viewport> {
        if !self.scale_pending {
            return None;
        }
        Some(self.resized(size))
    }
}

/// How the event loop ended.
enum Exit {
    Clean,
    /// Setup failed before the frame loop ran.
    InitFailed(anyhow::Error),
    /// The frame loop stopped on a fatal render error it already logged.
    RenderFailed,
}

struct DesktopApp {
    config: AppConfig,
    window: Option<Arc<Window>>,
    driver: Option<FrameDriver<WgpuRenderer, WinitScheduler>>,
    surface: Option<SurfaceTracker>,
    pointer: PointerState,
    pinch_distance: f32,
    exit: Exit,
}

impl DesktopApp {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            window: None,
            driver: None,
            surface: None,
            pointer: PointerState::new(),
            pinch_distance: 1.0,
            exit: Exit::Clean,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Steel Cube")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("creating window")?,
        );

        let surface = SurfaceTracker::new(window.inner_size(), window.scale_factor());
        let viewport = surface.viewport();
        let renderer = WgpuRenderer::new(Arc::clone(&window), viewport, self.config.render)
            .context("initializing GPU renderer")?;

        let variant = self.config.scene.variant;
        let setup = initialize(&self.config.scene);
        let context = SceneContext::new(setup, &self.config.camera, self.config.controls, viewport);
        let mut driver = FrameDriver::new(
            context,
            renderer,
            WinitScheduler {
                window: Arc::clone(&window),
            },
            &self.config.animation,
            self.config.animation.delta_for(variant),
        );

        if let Some(parent) = driver.context().decoration_parent {
            let request =
                TextRequest::from_config(&self.config.text, parent, driver.context().front_face_z);
            spawn_text_loader(request, driver.message_sender())
                .context("spawning font loader")?;
        }

        driver.start();
        self.surface = Some(surface);
        self.window = Some(window);
        self.driver = Some(driver);
        Ok(())
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        if let (Some(surface), Some(driver)) = (&mut self.surface, &mut self.driver) {
            driver.resize(surface.resized(size));
        }
    }
}

fn map_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.exit = Exit::InitFailed(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(driver) = &self.driver {
                    driver.cancellation_token().cancel();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(surface) = &mut self.surface {
                    surface.scale_changed(scale_factor);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = map_button(button) {
                    self.pointer.button(button, state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let Some(window) = &self.window else {
                    return;
                };
                let logical = position.to_logical::<f32>(window.scale_factor());
                if let (Some(action), Some(driver)) = (
                    self.pointer.moved(Vec2::new(logical.x, logical.y)),
                    &mut self.driver,
                ) {
                    driver.handle_pointer(action);
                }
            }
            WindowEvent::CursorLeft { .. } => self.pointer.left(),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                if let (Some(action), Some(driver)) = (self.pointer.wheel(lines), &mut self.driver)
                {
                    driver.handle_pointer(action);
                }
            }
            WindowEvent::PinchGesture { delta, phase, .. } => {
                if phase == TouchPhase::Started {
                    self.pinch_distance = 1.0;
                    self.pointer.pinch(self.pinch_distance);
                }
                self.pinch_distance = (self.pinch_distance * (1.0 + delta as f32)).max(1e-3);
                if let (Some(action), Some(driver)) =
                    (self.pointer.pinch(self.pinch_distance), &mut self.driver)
                {
                    driver.handle_pointer(action);
                }
                if matches!(phase, TouchPhase::Ended | TouchPhase::Cancelled) {
                    self.pointer.pinch_ended();
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(window), Some(surface), Some(driver)) =
                    (&self.window, &mut self.surface, &mut self.driver)
                else {
                    return;
                };
                if let Some(viewport) = surface.settle(window.inner_size()) {
                    driver.resize(viewport);
                }
                match driver.on_frame(Instant::now()) {
                    FrameOutcome::Continue => {}
                    FrameOutcome::Stopped(StopReason::Cancelled) => event_loop.exit(),
                    FrameOutcome::Stopped(StopReason::RenderFailed(_)) => {
                        self.exit = Exit::RenderFailed;
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(variant) = cli.variant {
        config.scene.variant = variant.into();
    }
    if let Some(font) = cli.font {
        config.text.font = font;
    }
    if let Some(text) = cli.text {
        config.text.content = text;
    }
    if cli.time_based {
        config.animation.mode = RotationMode::ElapsedTime;
    }
    config.validate()?;

    tracing::info!(variant = ?config.scene.variant, "steelcube-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = DesktopApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.exit {
        Exit::Clean => Ok(ExitCode::SUCCESS),
        Exit::InitFailed(err) => Err(err),
        Exit::RenderFailed => Ok(ExitCode::FAILURE),
    }
}
