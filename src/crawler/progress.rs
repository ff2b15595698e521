//! Progress reporting hooks
//!
//! The crawl never depends on a progress display; it calls these hooks
//! opportunistically and ignores what the sink does with them.

/// Receives progress updates from long-running passes
pub trait ProgressSink {
    /// Number of steps the current pass will take
    fn set_max(&self, _max: usize) {}

    /// Steps completed so far
    fn set_progress(&self, _done: usize) {}

    /// Human-readable status line
    fn status(&self, _message: &str) {}
}

/// Discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Forwards updates to the `tracing` log
#[derive(Debug, Default)]
pub struct LogProgress {
    max: std::sync::atomic::AtomicUsize,
}

impl ProgressSink for LogProgress {
    fn set_max(&self, max: usize) {
        self.max.store(max, std::sync::atomic::Ordering::Relaxed);
    }

    fn set_progress(&self, done: usize) {
        let max = self.max.load(std::sync::atomic::Ordering::Relaxed);
        tracing::info!("Progress: {}/{}", done, max);
    }

    fn status(&self, message: &str) {
        tracing::info!("{}", message);
    }
}
