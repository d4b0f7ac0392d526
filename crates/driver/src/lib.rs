//! Frame driver: owns the scene context and runs the animation loop.
//!
//! # Invariants
//! - Every frame renders exactly once and requests exactly one next frame.
//! - Camera aspect equals viewport width / height after any resize, before
//!   the next render.
//! - Background loaders never touch the scene graph; they post
//!   [`SceneMessage`]s that the driver applies at the start of a frame.
//! - A fatal render error or cancellation stops the loop for good.

mod config;
mod context;
mod driver;
mod loader;
mod scheduler;
mod timer;

pub use config::{AnimationConfig, AppConfig, ConfigError, RotationMode, TextConfig};
pub use context::SceneContext;
pub use driver::{FrameDriver, FrameOutcome, StopReason};
pub use loader::{SceneMessage, TextRequest, build_text_node, spawn_text_loader};
pub use scheduler::{CancellationToken, FrameScheduler, ManualScheduler};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "steelcube-driver v0.1.0"
}
