//! Background work plumbing for the egui shell.
//!
//! The UI thread never blocks on the network: async work runs on a
//! dedicated tokio runtime and results come back over std mpsc
//! channels the shell polls once per frame. One receiver per logical
//! action doubles as the in-flight guard: while a receiver is
//! pending, the action's button renders a spinner and re-submission is
//! ignored.

use std::future::Future;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

pub struct Background {
    runtime: tokio::runtime::Runtime,
}

impl Background {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            runtime: tokio::runtime::Runtime::new()?,
        })
    }

    /// Runs `future` on the background runtime; the returned receiver
    /// yields its output exactly once.
    pub fn run<T, F>(&self, future: F) -> Receiver<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = channel();
        self.runtime.spawn(async move {
            let _ = tx.send(future.await);
        });
        rx
    }

    /// Blocks the calling thread; used only during startup, before the
    /// event loop exists.
    pub fn block_on<T, F: Future<Output = T>>(&self, future: F) -> T {
        self.runtime.block_on(future)
    }

    /// Enters the runtime context so detached tasks (the refresh
    /// scheduler) can be spawned from the UI thread.
    pub fn enter(&self) -> tokio::runtime::EnterGuard<'_> {
        self.runtime.enter()
    }
}

/// Polls a pending receiver; clears it once the result (or a
/// disconnect) arrives.
pub fn poll<T>(slot: &mut Option<Receiver<T>>) -> Option<T> {
    let outcome = match slot {
        Some(rx) => rx.try_recv(),
        None => return None,
    };
    match outcome {
        Ok(value) => {
            *slot = None;
            Some(value)
        }
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            *slot = None;
            None
        }
    }
}
