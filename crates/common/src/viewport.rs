use serde::{Deserialize, Serialize};

/// Logical viewport dimensions plus the device pixel ratio.
///
/// Width and height are logical (density independent) pixels. The backing
/// pixel buffer is `logical * pixel_ratio`, rounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// Build from a physical size reported by the windowing system.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            width: (width as f64 / scale) as f32,
            height: (height as f64 / scale) as f32,
            pixel_ratio: scale as f32,
        }
    }

    /// Clamp degenerate dimensions so aspect and buffer sizes stay finite.
    pub fn sanitized(self) -> Self {
        let ratio = if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        };
        Self {
            width: self.width.max(1.0),
            height: self.height.max(1.0),
            pixel_ratio: ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Size of the backing pixel buffer.
    pub fn buffer_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 1.0)
    }
}
