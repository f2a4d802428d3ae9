//! Configuration loading from an optional .env file and the environment

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;

use crate::error::Error;
use crate::input::Backend;

/// Pacing constants for every wait in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Toggle poll rate; also the upper bound on cancellation latency
    pub poll_interval: Duration,
    /// Pause after each typed character
    pub keystroke_delay: Duration,
    /// Pause between repeated sessions
    pub repeat_cooldown: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            keystroke_delay: Duration::from_millis(50),
            repeat_cooldown: Duration::from_millis(500),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct Config {
    pub log_level: String,
    pub log_to_file: bool,
    pub backend: Backend,
    pub timing: Timing,
}

impl Config {
    /// Load configuration from .env (if present) and the process environment
    pub fn load() -> Result<Self> {
        // A missing .env is fine; every setting has a default.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Timing::default();
        let poll_ms = Self::get_env_or(
            &lookup,
            "SENDKEYS_POLL_INTERVAL_MS",
            millis(defaults.poll_interval),
        )?;
        let keystroke_ms = Self::get_env_or(
            &lookup,
            "SENDKEYS_KEYSTROKE_DELAY_MS",
            millis(defaults.keystroke_delay),
        )?;
        let cooldown_ms = Self::get_env_or(
            &lookup,
            "SENDKEYS_REPEAT_COOLDOWN_MS",
            millis(defaults.repeat_cooldown),
        )?;

        Ok(Self {
            log_level: lookup("SENDKEYS_LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
            log_to_file: Self::get_env_or(&lookup, "SENDKEYS_LOG_TO_FILE", false)?,
            backend: Self::get_env_or(&lookup, "SENDKEYS_BACKEND", Backend::default())?,
            timing: Timing {
                poll_interval: Duration::from_millis(poll_ms.max(1)),
                keystroke_delay: Duration::from_millis(keystroke_ms),
                repeat_cooldown: Duration::from_millis(cooldown_ms),
            },
        })
    }

    /// Parse a variable, falling back to `default` when it is unset
    fn get_env_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, Error>
    where
        F: Fn(&str) -> Option<String>,
        T: FromStr,
    {
        match lookup(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| Error::Config { key, value }),
        }
    }
}

/// Whole milliseconds of a duration, saturating
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
