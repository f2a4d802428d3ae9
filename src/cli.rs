//! Command-line arguments

use clap::Parser;

use crate::error::Result;
use crate::request::{DEFAULT_WAIT_SECONDS, EmissionRequest, TriggerMode};

/// Usage examples shown after the option list
const EXAMPLES: &str = "\
Examples:
  sendkeys --text \"Hello\" --wait 5
  sendkeys --text \"World\" --new-line --wait-scroll-lock
  sendkeys --text \"Test\" --keep --wait 3";

/// Type text into the focused window, after a delay or a Scroll Lock toggle.
#[derive(Parser, Debug)]
#[command(name = "sendkeys", version, about, after_help = EXAMPLES)]
pub struct CliArgs {
    /// The text to type.
    #[arg(long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Send an Enter key after typing.
    #[arg(long = "new-line")]
    pub new_line: bool,

    /// Wait before typing, in seconds. Zero or less starts immediately.
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = DEFAULT_WAIT_SECONDS,
        allow_negative_numbers = true
    )]
    pub wait: i64,

    /// Wait for Scroll Lock toggle before typing (overrides --wait).
    #[arg(long = "wait-scroll-lock")]
    pub wait_scroll_lock: bool,

    /// Keep repeating until Ctrl+C is pressed.
    #[arg(long)]
    pub keep: bool,
}

impl CliArgs {
    /// Trigger selected by the flags; `--wait-scroll-lock` wins over `--wait`.
    /// Negative waits are clamped to zero.
    pub fn trigger_mode(&self) -> TriggerMode {
        if self.wait_scroll_lock {
            TriggerMode::ToggleWatch
        } else {
            TriggerMode::FixedDelay(u64::try_from(self.wait).unwrap_or(0))
        }
    }

    /// Validate the arguments into a request
    pub fn into_request(self) -> Result<EmissionRequest> {
        let trigger_mode = self.trigger_mode();
        EmissionRequest::new(
            self.text.unwrap_or_default(),
            self.new_line,
            trigger_mode,
            self.keep,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("sendkeys").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--text", "hello"]);
        assert_eq!(args.trigger_mode(), TriggerMode::FixedDelay(2));

        let request = args.into_request().unwrap();
        assert_eq!(request.text(), "hello");
        assert!(!request.append_enter());
        assert!(!request.repeat());
    }

    #[test]
    fn test_all_flags() {
        let request = parse(&["--text", "x", "--new-line", "--wait", "7", "--keep"])
            .into_request()
            .unwrap();
        assert!(request.append_enter());
        assert!(request.repeat());
        assert_eq!(request.trigger_mode(), TriggerMode::FixedDelay(7));
    }

    #[test]
    fn test_scroll_lock_overrides_wait() {
        let args = parse(&["--text", "x", "--wait", "9", "--wait-scroll-lock"]);
        assert_eq!(args.trigger_mode(), TriggerMode::ToggleWatch);
    }

    #[test]
    fn test_missing_text_is_empty_text_error() {
        let result = parse(&["--new-line"]).into_request();
        assert!(matches!(result, Err(Error::EmptyText)));
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let result = parse(&["--text", ""]).into_request();
        assert!(matches!(result, Err(Error::EmptyText)));
    }

    #[test]
    fn test_negative_wait_starts_immediately() {
        let args = parse(&["--text", "x", "--wait", "-1"]);
        assert_eq!(args.trigger_mode(), TriggerMode::FixedDelay(0));
    }

    #[test]
    fn test_largest_wait_is_accepted() {
        let args = parse(&["--text", "x", "--wait", "9223372036854775807"]);
        assert_eq!(
            args.trigger_mode(),
            TriggerMode::FixedDelay(9_223_372_036_854_775_807)
        );
    }

    #[test]
    fn test_help_is_reported_by_clap() {
        let err = CliArgs::try_parse_from(["sendkeys", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
