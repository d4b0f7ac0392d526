use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame pacing over a sliding window of recent frame intervals.
#[derive(Debug)]
pub struct FrameTimer {
    window: VecDeque<Duration>,
    capacity: usize,
    last_tick: Option<Instant>,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            last_tick: None,
        }
    }

    /// Mark the start of a frame. Returns the interval since the previous
    /// tick, or `None` on the first frame.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        let interval = self
            .last_tick
            .map(|last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        if let Some(dt) = interval {
            if self.window.len() == self.capacity {
                self.window.pop_front();
            }
            self.window.push_back(dt);
        }
        interval
    }

    pub fn last_tick(&self) -> Option<Instant> {
        self.last_tick
    }

    /// Number of intervals currently in the window.
    pub fn samples(&self) -> usize {
        self.window.len()
    }

    pub fn mean(&self) -> Duration {
        match self.window.len() {
            0 => Duration::ZERO,
            n => self.window.iter().sum::<Duration>() / n as u32,
        }
    }

    pub fn worst(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or_default()
    }

    pub fn fps(&self) -> f64 {
        let mean = self.mean().as_secs_f64();
        if mean > 0.0 { mean.recip() } else { 0.0 }
    }
}
