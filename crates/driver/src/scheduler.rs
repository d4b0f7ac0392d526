use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Host hook that runs the frame driver once more before the next repaint.
///
/// Requests are single-shot: the driver issues one per frame it wants.
pub trait FrameScheduler {
    fn schedule_next_frame(&mut self);
}

/// Scheduler for headless hosts and tests. Records requests; the host polls
/// [`take_request`](Self::take_request) to decide whether to run a frame.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: bool,
    requests: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requests issued so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending request, if any.
    pub fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_next_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }
}

/// Shared stop flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_scheduler_counts_and_consumes() {
        let mut scheduler = ManualScheduler::new();
        assert!(!scheduler.take_request());
        scheduler.schedule_next_frame();
        assert!(scheduler.is_pending());
        assert!(scheduler.take_request());
        assert!(!scheduler.take_request());
        assert_eq!(scheduler.requests(), 1);
    }

    #[test]
    fn cancellation_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
