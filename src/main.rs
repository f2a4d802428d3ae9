//! SendKeys: types a string into the focused window, optionally pressing Enter,
//! after a delay or a Scroll Lock toggle.

mod cancel;
mod cli;
mod config;
mod error;
mod input;
mod request;
mod session;
mod trigger;

use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{Subscriber, debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;

use cancel::CancelToken;
use cli::CliArgs;
use config::Config;
use error::Error;
use input::TextInjector;
use request::TriggerMode;
use session::Session;
use trigger::{ScrollLock, TriggerGate};

/// Main entry point: parse arguments, load configuration, and run the session.
fn main() -> Result<ExitCode> {
    let request = match CliArgs::parse().into_request() {
        Ok(request) => request,
        Err(Error::EmptyText) => {
            CliArgs::command().print_help()?;
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    let config = Config::load().context("Failed to load configuration")?;
    setup_logging(&config)?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl+C handler")?;

    let toggle = match request.trigger_mode() {
        TriggerMode::ToggleWatch => {
            Some(ScrollLock::new().context("Cannot wait for Scroll Lock")?)
        }
        TriggerMode::FixedDelay(_) => None,
    };
    let sink = config
        .backend
        .open()
        .context("Failed to create injection backend")?;

    let gate = TriggerGate::new(toggle, &config.timing);
    let injector = TextInjector::new(sink, &config.timing);
    let report = Session::new(request, gate, injector, &config.timing).run(&cancel)?;

    debug!(
        "Session finished after {} emission(s), cancelled: {}",
        report.emissions, report.cancelled
    );
    announce_interrupt(&cancel);
    Ok(ExitCode::SUCCESS)
}

/// Log the exit notice if Ctrl+C arrived at any point during the run.
///
/// Returns whether the notice was logged.
fn announce_interrupt(cancel: &CancelToken) -> bool {
    if cancel.is_cancelled() {
        info!("Ctrl+C pressed. Exiting...");
        return true;
    }
    false
}

/// Operator-facing messages stay on the console even when logging to a file
const CONSOLE_DIRECTIVE: &str = "sendkeys=info";

/// Configure tracing based on the log level and output destination in config.
fn setup_logging(config: &Config) -> Result<()> {
    if config.log_to_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("sendkeys.log")
            .context("Failed to open log file")?;
        let filter = log_filter(&config.log_level);
        file_subscriber(filter, std::io::stdout, Mutex::new(file)).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_filter(&config.log_level))
            .init();
    }

    Ok(())
}

/// Filter for the configured level.
fn log_filter(log_level: &str) -> EnvFilter {
    let level = match log_level {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    // enigo is suppressed to error-only so typed text never reaches the log
    EnvFilter::new(format!("{level},enigo=error"))
}

/// Subscriber that writes `filter`ed events to `log_writer` and mirrors this
/// crate's info-level narration to `console`.
fn file_subscriber<C, L>(
    filter: EnvFilter,
    console: C,
    log_writer: L,
) -> impl Subscriber + Send + Sync
where
    C: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    L: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(log_writer)
                .with_ansi(false)
                .with_filter(filter),
        )
        .with(
            fmt::layer()
                .with_writer(console)
                .with_filter(EnvFilter::new(CONSOLE_DIRECTIVE)),
        )
}
