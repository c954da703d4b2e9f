//! Typed event bus owned by the application root.
//!
//! Replaces ad-hoc cross-component signaling: screens publish events
//! through the bus and hold nothing but a subscription handle. Fan-out
//! is plain `std::sync::mpsc`; the shell drains its receiver once per
//! frame.

use crate::journey::Presentation;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// Cross-screen application events.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A historic analysis was opened from the recent panel; the shell
    /// should jump straight to the preview.
    ShowPresentation(Presentation),
    /// Auth material was wiped (expiry or logout); screens drop any
    /// user-derived state.
    SessionCleared,
    /// The profile round-tripped through the backend.
    ProfileUpdated { complete: bool },
    /// "Start over" was requested.
    JourneyReset,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<AppEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle the subscriber polls at its own pace.
    pub fn subscribe(&self) -> Receiver<AppEvent> {
        let (tx, rx) = channel();
        self.subscribers
            .lock()
            .expect("event bus lock poisoned")
            .push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber, dropping hung-up ones.
    pub fn publish(&self, event: AppEvent) {
        let mut subs = self.subscribers.lock().expect("event bus lock poisoned");
        subs.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
