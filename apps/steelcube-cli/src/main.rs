use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use steelcube_common::Viewport;
use steelcube_driver::{
    AppConfig, FrameDriver, FrameOutcome, ManualScheduler, RotationMode, SceneContext,
    TextRequest, spawn_text_loader,
};
use steelcube_render::DebugTextRenderer;
use steelcube_scene::{SceneVariant, initialize};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "steelcube-cli", about = "Headless steel cube tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
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

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the frame loop against the text renderer
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Logical viewport width
        #[arg(long, default_value = "800")]
        width: f32,
        /// Logical viewport height
        #[arg(long, default_value = "600")]
        height: f32,
        /// Device pixel ratio
        #[arg(long, default_value = "1.0")]
        pixel_ratio: f32,
        #[arg(long, value_enum)]
        variant: Option<Variant>,
        /// Font URL or path for the text variant
        #[arg(long)]
        font: Option<String>,
        /// Text to extrude
        #[arg(long)]
        text: Option<String>,
        /// Scale rotation by elapsed time instead of per frame
        #[arg(long)]
        time_based: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("steelcube-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", steelcube_render::crate_info());
            println!("driver: {}", steelcube_driver::crate_info());
            println!("default font: {}", steelcube_text::DEFAULT_FONT_URL);
        }
        Commands::Simulate {
            frames,
            width,
            height,
            pixel_ratio,
            variant,
            font,
            text,
            time_based,
        } => {
            if let Some(variant) = variant {
                config.scene.variant = variant.into();
            }
            if let Some(font) = font {
                config.text.font = font;
            }
            if let Some(text) = text {
                config.text.content = text;
            }
            if time_based {
                config.animation.mode = RotationMode::ElapsedTime;
            }
            config.validate()?;
            simulate(&config, Viewport::new(width, height, pixel_ratio), frames)?;
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}

fn simulate(config: &AppConfig, viewport: Viewport, frames: u64) -> anyhow::Result<()> {
    let setup = initialize(&config.scene);
    let variant = config.scene.variant;
    let context = SceneContext::new(setup, &config.camera, config.controls, viewport);
    let renderer = DebugTextRenderer::new(viewport);
    let mut driver = FrameDriver::new(
        context,
        renderer,
        ManualScheduler::new(),
        &config.animation,
        config.animation.delta_for(variant),
    );

    if let Some(parent) = driver.context().decoration_parent {
        let request = TextRequest::from_config(&config.text, parent, driver.context().front_face_z);
        let loader = spawn_text_loader(request, driver.message_sender())
            .context("spawning font loader")?;
        // Headless runs wait for the font so the first frame is deterministic.
        if loader.join().is_err() {
            tracing::warn!("font loader panicked");
        }
    }

    let frame = Duration::from_secs_f32(1.0 / config.animation.reference_fps);
    let mut now = Instant::now();
    let mut outcome = FrameOutcome::Continue;
    driver.start();
    while driver.frames() < frames && driver.scheduler_mut().take_request() {
        outcome = driver.on_frame(now);
        if matches!(outcome, FrameOutcome::Stopped(_)) {
            break;
        }
        now += frame;
    }

    print!("{}", driver.renderer().last_frame());
    let timer = driver.frame_timer();
    println!(
        "Frames: {}  Resizes: {}  Scheduled: {}  Simulated fps: {:.1}",
        driver.frames(),
        driver.renderer().resizes(),
        driver.scheduler().requests(),
        timer.fps()
    );
    if let FrameOutcome::Stopped(reason) = outcome {
        anyhow::bail!("frame loop stopped: {reason:?}");
    }
    Ok(())
}
