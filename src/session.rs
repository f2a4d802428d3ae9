//! Session loop: wait for the trigger, type the text, repeat until cancelled.
//!
//! Drives the `Waiting -> Emitting -> Stopped` cycle. In repeat mode the loop
//! has no iteration limit; cancellation is its only exit.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::cancel::{CancelToken, Outcome};
use crate::config::Timing;
use crate::input::{KeySink, TextInjector};
use crate::request::EmissionRequest;
use crate::trigger::{Toggle, TriggerGate};

/// Where the session loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the trigger to fire
    Waiting,
    /// Typing the request text
    Emitting,
    /// Finished; no further input will be sent
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Emitting => write!(f, "Emitting"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// Emissions that typed the full text
    pub emissions: u64,
    /// Whether cancellation ended the run
    pub cancelled: bool,
}

/// Owns the gate and injector and drives the session cycle
pub struct Session<T, S> {
    /// What to type and how
    request: EmissionRequest,
    /// Decides when each emission starts
    gate: TriggerGate<T>,
    /// Types the text
    injector: TextInjector<S>,
    /// Pause between repeated emissions
    repeat_cooldown: Duration,
    /// Slice length for cancellable waits
    poll_interval: Duration,
    /// Current state
    state: SessionState,
}

impl<T: Toggle, S: KeySink> Session<T, S> {
    /// Assemble a session from its parts
    pub fn new(
        request: EmissionRequest,
        gate: TriggerGate<T>,
        injector: TextInjector<S>,
        timing: &Timing,
    ) -> Self {
        Self {
            request,
            gate,
            injector,
            repeat_cooldown: timing.repeat_cooldown,
            poll_interval: timing.poll_interval,
            state: SessionState::Stopped,
        }
    }

    /// Run until the request is satisfied or `cancel` is set
    pub fn run(&mut self, cancel: &CancelToken) -> Result<SessionReport> {
        let repeat = self.request.repeat();
        debug!("Running session ({})", self.request.trigger_mode());
        if repeat {
            info!("Repeating mode enabled. Press Ctrl+C to stop.");
        }

        let mut emissions = 0;
        self.transition(SessionState::Waiting);

        loop {
            let gate = self
                .gate
                .await_trigger(self.request.trigger_mode(), cancel)?;
            if gate == Outcome::Cancelled || cancel.is_cancelled() {
                return Ok(self.stop(emissions, true));
            }

            self.transition(SessionState::Emitting);
            if self.injector.emit_text(self.request.text(), cancel) == Outcome::Cancelled {
                return Ok(self.stop(emissions, true));
            }
            if self.request.append_enter() {
                self.injector.emit_enter();
            }
            emissions += 1;
            debug!("Emission {} complete", emissions);

            if !repeat {
                return Ok(self.stop(emissions, false));
            }
            if !cancel.sleep(self.repeat_cooldown, self.poll_interval) {
                return Ok(self.stop(emissions, true));
            }

            self.transition(SessionState::Waiting);
        }
    }

    /// Move to `next`, logging the change
    fn transition(&mut self, next: SessionState) {
        debug!("Session state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Enter the terminal state and build the report
    fn stop(&mut self, emissions: u64, cancelled: bool) -> SessionReport {
        self.transition(SessionState::Stopped);
        SessionReport {
            emissions,
            cancelled,
        }
    }
}
