//! What to type, when to start, and whether to repeat

use std::fmt;

use crate::error::{Error, Result};

/// Default delay before typing when no trigger is given
pub const DEFAULT_WAIT_SECONDS: i64 = 2;

/// How a session decides that typing may begin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Sleep for a number of seconds, then start
    FixedDelay(u64),
    /// Wait for the operator to cycle Scroll Lock
    ToggleWatch,
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::FixedDelay(seconds) => write!(f, "wait {seconds}s"),
            Self::ToggleWatch => write!(f, "wait for Scroll Lock"),
        }
    }
}

/// A validated, immutable typing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionRequest {
    /// Text to type; never empty
    text: String,
    /// Press Enter after the text
    append_enter: bool,
    /// When typing starts
    trigger_mode: TriggerMode,
    /// Keep typing until cancelled
    repeat: bool,
}

impl EmissionRequest {
    /// Build a request, rejecting empty text
    pub fn new(
        text: impl Into<String>,
        append_enter: bool,
        trigger_mode: TriggerMode,
        repeat: bool,
    ) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::EmptyText);
        }
        Ok(Self {
            text,
            append_enter,
            trigger_mode,
            repeat,
        })
    }

    /// Text to type
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether Enter follows the text
    pub const fn append_enter(&self) -> bool {
        self.append_enter
    }

    /// How each session is triggered
    pub const fn trigger_mode(&self) -> TriggerMode {
        self.trigger_mode
    }

    /// Whether sessions repeat until cancelled
    pub const fn repeat(&self) -> bool {
        self.repeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_rejected() {
        let result = EmissionRequest::new("", true, TriggerMode::ToggleWatch, false);
        assert!(matches!(result, Err(Error::EmptyText)), "empty text must be rejected");
    }

    #[test]
    fn test_request_accessors() {
        let request =
            EmissionRequest::new("héllo", true, TriggerMode::FixedDelay(5), true).unwrap();
        assert_eq!(request.text(), "héllo");
        assert!(request.append_enter());
        assert_eq!(request.trigger_mode(), TriggerMode::FixedDelay(5));
        assert!(request.repeat());
    }

    #[test]
    fn test_trigger_mode_display() {
        assert_eq!(TriggerMode::FixedDelay(3).to_string(), "wait 3s");
        assert_eq!(TriggerMode::ToggleWatch.to_string(), "wait for Scroll Lock");
    }
}
