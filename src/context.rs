//! Cancellation Context
//!
//! Carries a cancellation signal and an optional deadline into every store
//! operation and background task.
//!
//! ## Semantics
//! - `cancel()` is sticky: once cancelled, a context never recovers
//! - Contexts derived with `with_timeout`/`with_deadline` share the
//!   cancellation signal of their origin and keep the earlier deadline
//! - `done()` hands out a channel that disconnects on cancellation, so
//!   threads can `select!` on it next to their own work

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{Result, VaultError};

/// Shared cancellation state
struct CancelState {
    cancelled: AtomicBool,

    /// Dropped on cancel, which disconnects every `done` receiver
    done_tx: Mutex<Option<Sender<()>>>,

    done_rx: Receiver<()>,
}

/// Cancellation + deadline carrier
#[derive(Clone)]
pub struct Context {
    state: Arc<CancelState>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled on its own and has no deadline
    pub fn background() -> Self {
        let (done_tx, done_rx) = channel::bounded(0);
        Self {
            state: Arc::new(CancelState {
                cancelled: AtomicBool::new(false),
                done_tx: Mutex::new(Some(done_tx)),
                done_rx,
            }),
            deadline: None,
        }
    }

    /// Derive a context that expires after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline` (or earlier, if this one does)
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        };
        Self {
            state: Arc::clone(&self.state),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every context sharing its signal
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            self.state.done_tx.lock().take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail with `Cancelled` or `DeadlineExceeded` once the context has ended
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(VaultError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(VaultError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Receiver that disconnects when the context is cancelled
    ///
    /// Nothing is ever sent on it; `recv` only returns once it errors.
    pub fn done(&self) -> Receiver<()> {
        self.state.done_rx.clone()
    }

    /// Receiver that fires at the deadline, or never
    pub fn expired(&self) -> Receiver<Instant> {
        match self.deadline {
            Some(deadline) => channel::at(deadline),
            None => channel::never(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline)
            .finish()
    }
}
