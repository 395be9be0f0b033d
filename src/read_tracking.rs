//! Dwell-time tracking for automatic mark-as-read.
//!
//! The clock is `tokio::time::Instant`, so tests drive it with
//! `tokio::time::pause` and `advance`.

use std::time::Duration;
use tokio::time::Instant;

/// Tracks how long the current post has been on screen.
#[derive(Debug, Clone)]
pub struct DwellTimer {
    /// `None` never elapses. Set after an explicit mark-unread so the post
    /// is not read again by the next navigation.
    selected_at: Option<Instant>,
    /// `None` disables auto-marking.
    threshold: Option<Duration>,
}

impl DwellTimer {
    /// `threshold_secs < 0` disables auto-marking.
    pub fn new(threshold_secs: i64) -> Self {
        let threshold = u64::try_from(threshold_secs).ok().map(Duration::from_secs);
        Self {
            selected_at: Some(Instant::now()),
            threshold,
        }
    }

    /// Decide whether the post being left should be auto-marked read, then
    /// restart the clock for the next one.
    ///
    /// Fires when a post is displayed, the timer is enabled and armed, and
    /// strictly more than the threshold has elapsed. The clock restarts on
    /// every call, whatever the outcome.
    pub fn should_mark(&mut self, has_post: bool) -> bool {
        let now = Instant::now();
        let fire = match (self.threshold, self.selected_at) {
            (Some(threshold), Some(at)) => has_post && now.duration_since(at) > threshold,
            _ => false,
        };
        self.selected_at = Some(now);
        fire
    }

    /// Stop the clock until the next [`should_mark`](Self::should_mark).
    pub fn disarm(&mut self) {
        self.selected_at = None;
    }

    /// Restart the clock without evaluating it.
    pub fn restart(&mut self) {
        self.selected_at = Some(Instant::now());
    }
}
