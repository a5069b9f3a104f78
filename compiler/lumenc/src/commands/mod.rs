//! Command handlers for the `lumenc` CLI.
//!
//! Handlers return their result instead of printing or exiting; `main`
//! decides what goes to stdout and turns any error into exit code 1.

use std::io::IsTerminal;
use std::path::PathBuf;

use lumen_diagnostic::{ColorMode, DiagnosticSink, TerminalEmitter};
use lumen_session::{CompilerConnection, ModuleIdentity, ReferenceBackend};

mod check;
mod compile;
mod targets;

pub use check::{check_file, CheckReport, ImportStatus};
pub use compile::{compile_file, parse_compile_options, CompileOptions, CompiledEntry};
pub use targets::{default_profile, list_targets};

/// Anything that makes a command fail.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Session(#[from] lumen_session::Error),
    #[error("module '{module}' exports no entry points")]
    NoEntryPoints { module: ModuleIdentity },
    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }
}

pub(crate) fn session_error<E: Into<lumen_session::Error>>(err: E) -> CliError {
    CliError::Session(err.into())
}

/// Connect to the reference backend with compiler output going to stderr.
pub(crate) fn open_connection(
    options: &CompileOptions,
) -> Result<CompilerConnection<ReferenceBackend>, CliError> {
    let is_tty = std::io::stderr().is_terminal();
    let emitter = TerminalEmitter::stderr(options.color, is_tty);
    let sink = DiagnosticSink::with_emitter(options.sink_config(), emitter);
    CompilerConnection::with_sink(ReferenceBackend::new(), sink).map_err(session_error)
}

/// Color mode from a `--color=` value, defaulting to auto-detection.
pub(crate) fn parse_color(value: &str) -> Result<ColorMode, CliError> {
    ColorMode::parse(value).ok_or_else(|| {
        CliError::usage(format!(
            "unknown color mode '{value}', expected one of: auto, always, never"
        ))
    })
}
