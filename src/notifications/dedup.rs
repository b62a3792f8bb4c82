//! Time-bounded suppression of repeated notification signals.
//!
//! Fragment swaps can hand the same response headers to several listeners
//! within one user action. Each `(source, severity, message)` triple is
//! rendered once per window; entries expire lazily on every lookup.

use super::types::{Notification, Severity};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Default suppression window (10 seconds)
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    source: String,
    severity: Severity,
    message: String,
}

impl DedupKey {
    pub fn new(notification: &Notification, source: &str) -> Self {
        Self {
            source: source.to_string(),
            severity: notification.severity(),
            message: notification.message().to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Deduplicator {
    window: Duration,
    /// Insertion time per key
    entries: HashMap<DedupKey, Instant>,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_WINDOW)
    }
}

impl Deduplicator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` the first time a triple is seen within the window,
    /// recording it; `false` while an identical entry is still live.
    pub fn should_render(&mut self, notification: &Notification, source: &str) -> bool {
        self.should_render_at(notification, source, Instant::now())
    }

    fn should_render_at(&mut self, notification: &Notification, source: &str, now: Instant) -> bool {
        self.sweep(now);

        let key = DedupKey::new(notification, source);
        if self.entries.contains_key(&key) {
            tracing::debug!(
                "Suppressing duplicate {} notification from '{}'",
                notification.severity(),
                source
            );
            return false;
        }

        self.entries.insert(key, now);
        true
    }

    /// Drop every entry whose window has elapsed. Returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let window = self.window;
        let before = self.entries.len();
        self.entries
            .retain(|_, inserted_at| now.saturating_duration_since(*inserted_at) < window);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
