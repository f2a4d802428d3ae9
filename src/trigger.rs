//! Trigger gate: decides when typing may begin.
//!
//! Either sleeps for a fixed number of seconds or watches the Scroll Lock
//! indicator. The toggle is sampled once per poll interval, so flips shorter
//! than one interval are not seen.

use std::time::Duration;

use tracing::info;

#[cfg(windows)]
use windows::Win32::UI::Input::KeyboardAndMouse::{GetKeyState, VK_SCROLL};

use crate::cancel::{CancelToken, Outcome};
use crate::config::Timing;
use crate::error::{Error, Result};
use crate::request::TriggerMode;

/// A binary hardware indicator that can be polled
pub trait Toggle {
    /// Current state of the indicator
    fn is_on(&mut self) -> bool;
}

impl<T: Toggle + ?Sized> Toggle for Box<T> {
    fn is_on(&mut self) -> bool {
        (**self).is_on()
    }
}

/// The Scroll Lock indicator
#[derive(Debug)]
pub struct ScrollLock {
    /// Prevents construction outside [`ScrollLock::new`]
    _private: (),
}

impl ScrollLock {
    /// Open the Scroll Lock indicator for polling
    #[cfg(windows)]
    pub fn new() -> Result<Self> {
        Ok(Self { _private: () })
    }

    /// Scroll Lock state cannot be read on this platform
    #[cfg(not(windows))]
    pub fn new() -> Result<Self> {
        Err(Error::ToggleUnavailable(
            "Scroll Lock state can only be read on Windows".to_owned(),
        ))
    }
}

impl Toggle for ScrollLock {
    #[cfg(windows)]
    fn is_on(&mut self) -> bool {
        // SAFETY: GetKeyState only reads the calling thread's keyboard state.
        let state = unsafe { GetKeyState(i32::from(VK_SCROLL.0)) };
        state & 0x0001 != 0
    }

    #[cfg(not(windows))]
    fn is_on(&mut self) -> bool {
        false
    }
}

/// What a single toggle sample means for the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStep {
    /// Keep polling
    Pending,
    /// The toggle went on after starting off; now waiting for off
    TurnedOn,
    /// The qualifying transition happened
    Fire,
}

/// Tracks toggle samples during one gate invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleObservation {
    /// State seen on entry
    initial_state: bool,
    /// An `on` sample was seen after starting off
    has_toggled_on: bool,
}

impl ToggleObservation {
    /// Start observing with the state seen on entry
    pub const fn new(initial_state: bool) -> Self {
        Self {
            initial_state,
            has_toggled_on: false,
        }
    }

    /// Feed one sample.
    ///
    /// Starting on, the first `off` fires. Starting off, an `on` followed by
    /// a later `off` fires; an `off` before any `on` does not.
    pub fn observe(&mut self, state: bool) -> ToggleStep {
        if self.initial_state {
            return if state {
                ToggleStep::Pending
            } else {
                ToggleStep::Fire
            };
        }

        match (state, self.has_toggled_on) {
            (true, false) => {
                self.has_toggled_on = true;
                ToggleStep::TurnedOn
            }
            (false, true) => ToggleStep::Fire,
            _ => ToggleStep::Pending,
        }
    }
}

/// Gate that holds a session until its trigger fires
pub struct TriggerGate<T> {
    /// Toggle to watch; absent when only fixed delays are used
    toggle: Option<T>,
    /// Poll rate and cancellation quantum
    poll_interval: Duration,
}

impl<T: Toggle> TriggerGate<T> {
    /// Create a gate. `toggle` is required only for [`TriggerMode::ToggleWatch`].
    pub fn new(toggle: Option<T>, timing: &Timing) -> Self {
        Self {
            toggle,
            poll_interval: timing.poll_interval,
        }
    }

    /// Block until `mode` fires or `cancel` is set
    pub fn await_trigger(&mut self, mode: TriggerMode, cancel: &CancelToken) -> Result<Outcome> {
        match mode {
            TriggerMode::FixedDelay(seconds) => Ok(self.fixed_delay(seconds, cancel)),
            TriggerMode::ToggleWatch => {
                let poll_interval = self.poll_interval;
                let toggle = self.toggle.as_mut().ok_or_else(|| {
                    Error::ToggleUnavailable("no toggle configured for this gate".to_owned())
                })?;
                Ok(Self::watch_toggle(toggle, poll_interval, cancel))
            }
        }
    }

    /// Sleep `seconds`, waking every poll interval to check `cancel`
    fn fixed_delay(&self, seconds: u64, cancel: &CancelToken) -> Outcome {
        info!("Waiting {} second(s) before typing...", seconds);
        if cancel.sleep(Duration::from_secs(seconds), self.poll_interval) {
            Outcome::Continue
        } else {
            Outcome::Cancelled
        }
    }

    /// Poll the toggle until it completes a qualifying transition
    fn watch_toggle(toggle: &mut T, poll_interval: Duration, cancel: &CancelToken) -> Outcome {
        let initial_state = toggle.is_on();
        let mut observation = ToggleObservation::new(initial_state);

        info!("Scroll Lock is {}", if initial_state { "ON" } else { "OFF" });
        if initial_state {
            info!("Turn OFF Scroll Lock to begin...");
        } else {
            info!("Turn ON Scroll Lock, then OFF to begin...");
        }

        loop {
            if !cancel.sleep(poll_interval, poll_interval) {
                return Outcome::Cancelled;
            }
            match observation.observe(toggle.is_on()) {
                ToggleStep::Pending => {}
                ToggleStep::TurnedOn => info!("Now turn OFF Scroll Lock..."),
                ToggleStep::Fire => {
                    info!("Starting...");
                    return Outcome::Continue;
                }
            }
        }
    }
}
