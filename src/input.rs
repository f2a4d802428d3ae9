//! Text injection via keyboard simulation
//!
//! Each character is typed as its own key-down / key-up pair carrying the
//! character itself rather than a virtual key code, so any text can be typed
//! regardless of keyboard layout. Failed injections are logged and skipped.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use tracing::{info, warn};

#[cfg(windows)]
use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP,
    KEYEVENTF_UNICODE, SendInput, VIRTUAL_KEY, VK_RETURN,
};

use crate::cancel::{CancelToken, Outcome};
use crate::config::Timing;
use crate::error::{Error, Result};

/// A single key that can be pressed or released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStroke {
    /// A literal character, injected by code point
    Char(char),
    /// The Enter key, injected by virtual key
    Enter,
}

/// OS-facing primitive that delivers one key event to the focused window
pub trait KeySink {
    /// Press `key`
    fn key_down(&mut self, key: KeyStroke) -> Result<()>;
    /// Release `key`
    fn key_up(&mut self, key: KeyStroke) -> Result<()>;
}

impl<S: KeySink + ?Sized> KeySink for Box<S> {
    fn key_down(&mut self, key: KeyStroke) -> Result<()> {
        (**self).key_down(key)
    }

    fn key_up(&mut self, key: KeyStroke) -> Result<()> {
        (**self).key_up(key)
    }
}

/// Which injection mechanism to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Win32 `SendInput` with `KEYEVENTF_UNICODE`
    SendInput,
    /// The cross-platform enigo crate
    Enigo,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(windows) {
            Self::SendInput
        } else {
            Self::Enigo
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sendinput" => Ok(Self::SendInput),
            "enigo" => Ok(Self::Enigo),
            _ => Err(Error::Backend(format!("unknown backend: {s}"))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendInput => write!(f, "sendinput"),
            Self::Enigo => write!(f, "enigo"),
        }
    }
}

impl Backend {
    /// Create a sink for this backend
    pub fn open(self) -> Result<Box<dyn KeySink>> {
        let sink: Box<dyn KeySink> = match self {
            #[cfg(windows)]
            Self::SendInput => Box::new(SendInputSink),
            #[cfg(not(windows))]
            Self::SendInput => {
                return Err(Error::Backend(
                    "SendInput is only available on Windows".to_owned(),
                ));
            }
            Self::Enigo => Box::new(EnigoSink::new()?),
        };
        info!("Using {} injection backend", self);
        Ok(sink)
    }
}

/// Key sink backed by enigo
pub struct EnigoSink {
    /// Enigo instance
    enigo: Enigo,
}

impl EnigoSink {
    /// Connect to the platform input system
    pub fn new() -> Result<Self> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| Error::Backend(e.to_string()))?;
        Ok(Self { enigo })
    }

    /// Send one key event
    fn send(&mut self, key: KeyStroke, direction: Direction) -> Result<()> {
        let key = match key {
            KeyStroke::Char(c) => Key::Unicode(c),
            KeyStroke::Enter => Key::Return,
        };
        self.enigo
            .key(key, direction)
            .map_err(|e| Error::Injection(e.to_string()))
    }
}

impl KeySink for EnigoSink {
    fn key_down(&mut self, key: KeyStroke) -> Result<()> {
        self.send(key, Direction::Press)
    }

    fn key_up(&mut self, key: KeyStroke) -> Result<()> {
        self.send(key, Direction::Release)
    }
}

/// Key sink that calls Win32 `SendInput` directly
#[cfg(windows)]
pub struct SendInputSink;

#[cfg(windows)]
impl SendInputSink {
    /// Build the keyboard events for one key transition
    fn events(key: KeyStroke, release: bool) -> Vec<INPUT> {
        let up = if release {
            KEYEVENTF_KEYUP
        } else {
            KEYBD_EVENT_FLAGS::default()
        };
        let event = |vk: VIRTUAL_KEY, scan: u16, flags: KEYBD_EVENT_FLAGS| INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: vk,
                    wScan: scan,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };

        match key {
            // Characters outside the BMP go out as a surrogate pair
            KeyStroke::Char(c) => {
                let mut units = [0_u16; 2];
                c.encode_utf16(&mut units)
                    .iter()
                    .map(|&unit| event(VIRTUAL_KEY(0), unit, KEYEVENTF_UNICODE | up))
                    .collect()
            }
            KeyStroke::Enter => vec![event(VK_RETURN, 0, up)],
        }
    }

    /// Inject the events, failing if the OS accepted fewer than requested
    fn send(key: KeyStroke, release: bool) -> Result<()> {
        let inputs = Self::events(key, release);
        let size = i32::try_from(std::mem::size_of::<INPUT>())
            .map_err(|e| Error::Injection(e.to_string()))?;

        // SAFETY: `inputs` is a fully initialised slice of keyboard INPUT
        // structs and `size` is the size of one element, as SendInput requires.
        let sent = unsafe { SendInput(&inputs, size) };

        if usize::try_from(sent).ok() != Some(inputs.len()) {
            return Err(Error::Injection(format!(
                "SendInput only sent {} of {} events",
                sent,
                inputs.len()
            )));
        }
        Ok(())
    }
}

#[cfg(windows)]
impl KeySink for SendInputSink {
    fn key_down(&mut self, key: KeyStroke) -> Result<()> {
        Self::send(key, false)
    }

    fn key_up(&mut self, key: KeyStroke) -> Result<()> {
        Self::send(key, true)
    }
}

/// Types text into the active window through a [`KeySink`]
pub struct TextInjector<S> {
    /// Event destination
    sink: S,
    /// Pause after each character
    keystroke_delay: Duration,
    /// Slice length for cancellable waits
    poll_interval: Duration,
}

impl<S: KeySink> TextInjector<S> {
    /// Create new text injector
    pub fn new(sink: S, timing: &Timing) -> Self {
        Self {
            sink,
            keystroke_delay: timing.keystroke_delay,
            poll_interval: timing.poll_interval,
        }
    }

    /// Type `text` one character at a time.
    ///
    /// Stops early, before the next character, if cancellation is observed
    /// during the inter-character delay.
    pub fn emit_text(&mut self, text: &str, cancel: &CancelToken) -> Outcome {
        for c in text.chars() {
            self.tap(KeyStroke::Char(c));
            if !cancel.sleep(self.keystroke_delay, self.poll_interval) {
                return Outcome::Cancelled;
            }
        }
        Outcome::Continue
    }

    /// Press and release Enter
    pub fn emit_enter(&mut self) {
        self.tap(KeyStroke::Enter);
    }

    /// Send a down/up pair. Failures are logged, never retried.
    fn tap(&mut self, key: KeyStroke) {
        if let Err(e) = self.sink.key_down(key) {
            warn!("Key down not delivered: {}", e);
        }
        if let Err(e) = self.sink.key_up(key) {
            warn!("Key up not delivered: {}", e);
        }
    }

    /// Access the underlying sink
    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}


#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::testing::{Edge, RecordingSink};
    use super::*;

    fn fast_timing() -> Timing {
        Timing {
            poll_interval: Duration::from_millis(5),
            keystroke_delay: Duration::from_millis(1),
            repeat_cooldown: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_one_pair_per_character_in_order() {
        let mut injector = TextInjector::new(RecordingSink::default(), &fast_timing());
        let outcome = injector.emit_text("aé😀", &CancelToken::new());

        assert_eq!(outcome, Outcome::Continue);
        let expected: Vec<_> = "aé😀"
            .chars()
            .flat_map(|c| {
                [
                    (Edge::Down, KeyStroke::Char(c)),
                    (Edge::Up, KeyStroke::Char(c)),
                ]
            })
            .collect();
        assert_eq!(injector.sink().events, expected);
    }

    #[test]
    fn test_enter_is_a_single_pair() {
        let mut injector = TextInjector::new(RecordingSink::default(), &fast_timing());
        injector.emit_enter();
        assert_eq!(
            injector.sink().events,
            vec![(Edge::Down, KeyStroke::Enter), (Edge::Up, KeyStroke::Enter)]
        );
    }

    #[test]
    fn test_characters_are_paced() {
        let timing = Timing {
            keystroke_delay: Duration::from_millis(20),
            ..fast_timing()
        };
        let mut injector = TextInjector::new(RecordingSink::default(), &timing);

        let start = Instant::now();
        injector.emit_text("abcd", &CancelToken::new());
        assert!(start.elapsed() >= Duration::from_millis(80), "delay not applied per character");
    }

    #[test]
    fn test_injection_failure_does_not_abort_text() {
        let sink = RecordingSink {
            fail_down: true,
            ..RecordingSink::default()
        };
        let mut injector = TextInjector::new(sink, &fast_timing());
        let outcome = injector.emit_text("abc", &CancelToken::new());

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(injector.sink().typed(), "abc");
        assert_eq!(injector.sink().events.len(), 6, "key up must follow a failed key down");
    }

    #[test]
    fn test_cancel_stops_before_next_character() {
        let cancel = CancelToken::new();
        let sink = RecordingSink {
            cancel_on: Some((cancel.clone(), 4)),
            ..RecordingSink::default()
        };
        let mut injector = TextInjector::new(sink, &fast_timing());

        let outcome = injector.emit_text("hello", &cancel);

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(injector.sink().typed(), "he");
        assert_eq!(injector.sink().events.len(), 4, "no half-typed character");
    }

    #[test]
    fn test_backend_names() {
        assert_eq!("SendInput".parse::<Backend>().unwrap(), Backend::SendInput);
        assert_eq!("enigo".parse::<Backend>().unwrap(), Backend::Enigo);
        assert!("uinput".parse::<Backend>().is_err());
        assert_eq!(Backend::Enigo.to_string(), "enigo");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_sendinput_unavailable_off_windows() {
        let result = Backend::SendInput.open();
        assert!(matches!(result, Err(Error::Backend(_))));
    }

    #[cfg(windows)]
    #[test]
    fn test_sendinput_encodes_surrogate_pairs() {
        assert_eq!(SendInputSink::events(KeyStroke::Char('a'), false).len(), 1);
        assert_eq!(SendInputSink::events(KeyStroke::Char('😀'), true).len(), 2);
        assert_eq!(SendInputSink::events(KeyStroke::Enter, false).len(), 1);
    }
}
