//! Cancellation token shared between the interrupt handler and the session.
//!
//! The token is a one-way flag: once cancelled it stays cancelled for the life
//! of the process. Every wait in the crate goes through [`CancelToken::sleep`],
//! which sleeps in slices no longer than the polling quantum and re-checks the
//! flag between slices.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a step that can be interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The step ran to completion
    Continue,
    /// Cancellation was observed before the step completed
    Cancelled,
}

/// Cloneable handle to a process-wide cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Set once, never cleared
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not yet cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking at least every `quantum` to check the flag.
    ///
    /// Returns `true` if the full duration elapsed without cancellation and
    /// `false` as soon as cancellation is observed. A zero duration only
    /// checks the flag. A duration too large to represent as a deadline
    /// waits until cancelled.
    pub fn sleep(&self, duration: Duration, quantum: Duration) -> bool {
        let quantum = quantum.max(Duration::from_millis(1));
        let deadline = Instant::now().checked_add(duration);

        loop {
            if self.is_cancelled() {
                return false;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    (deadline - now).min(quantum)
                }
                None => quantum,
            };
            thread::sleep(slice);
        }
    }
}
