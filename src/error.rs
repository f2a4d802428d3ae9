//! Error types

use thiserror::Error;

/// Errors raised while preparing or running a typing session
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request carried no text to type
    #[error("no text to type; pass --text <text>")]
    EmptyText,

    /// The hardware toggle state cannot be read on this platform
    #[error("toggle unavailable: {0}")]
    ToggleUnavailable(String),

    /// A single key event could not be injected
    #[error("key injection failed: {0}")]
    Injection(String),

    /// The injection backend could not be created
    #[error("injection backend unavailable: {0}")]
    Backend(String),

    /// A configuration value could not be interpreted
    #[error("invalid value {value:?} for {key}")]
    Config {
        /// Environment variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Result alias for this crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
