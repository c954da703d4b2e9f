//! Queued toast notifications with a typed API (message, severity,
//! duration), replacing one-off DOM-style popups. The shell expires and
//! renders the queue each frame.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    deadline: Instant,
}

#[derive(Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, duration: Duration) {
        self.queue.push_back(Notification {
            message: message.into(),
            severity,
            deadline: Instant::now() + duration,
        });
    }

    /// Convenience shorthands used all over the shell.
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, DEFAULT_TOAST_DURATION);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        // Errors linger a little longer than the default toast.
        self.push(message, Severity::Error, DEFAULT_TOAST_DURATION * 2);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, DEFAULT_TOAST_DURATION);
    }

    /// Drops expired entries as of `now`.
    pub fn expire(&mut self, now: Instant) {
        self.queue.retain(|n| n.deadline > now);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_expires_in_push_order() {
        let mut toasts = Notifications::new();
        let start = Instant::now();
        toasts.push("saved", Severity::Success, Duration::from_millis(10));
        toasts.push("slow down", Severity::Warning, Duration::from_secs(60));

        toasts.expire(start);
        assert_eq!(toasts.visible().count(), 2);

        toasts.expire(start + Duration::from_secs(1));
        let left: Vec<_> = toasts.visible().collect();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].message, "slow down");

        toasts.expire(start + Duration::from_secs(120));
        assert!(toasts.is_empty());
    }
}
