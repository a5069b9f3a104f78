//! The diagnostics sink shared by every compiler call on one connection.
//!
//! Reporting is unconditional at call sites: whether anything is shown is
//! decided here, by [`SinkConfig::enabled`], rather than by build mode.

use crate::emitter::{DiagnosticEmitter, TracingEmitter};
use crate::{Diagnostic, Phase};

/// Configuration for diagnostic reporting.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SinkConfig {
    /// When false, `report` discards everything.
    pub enabled: bool,
}

impl Default for SinkConfig {
    /// Enabled in debug builds, suppressed in release builds.
    fn default() -> Self {
        SinkConfig {
            enabled: cfg!(debug_assertions),
        }
    }
}

impl SinkConfig {
    /// Always report, regardless of build profile.
    pub fn enabled() -> Self {
        SinkConfig { enabled: true }
    }

    /// Never report.
    pub fn silent() -> Self {
        SinkConfig { enabled: false }
    }
}

/// Routes non-empty compiler diagnostics to an emitter.
pub struct DiagnosticSink {
    config: SinkConfig,
    emitter: Box<dyn DiagnosticEmitter>,
    reported: usize,
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new(SinkConfig::default())
    }
}

impl std::fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("config", &self.config)
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}

impl DiagnosticSink {
    /// Sink that forwards to `tracing`.
    pub fn new(config: SinkConfig) -> Self {
        Self::with_emitter(config, TracingEmitter)
    }

    pub fn with_emitter(config: SinkConfig, emitter: impl DiagnosticEmitter + 'static) -> Self {
        DiagnosticSink {
            config,
            emitter: Box::new(emitter),
            reported: 0,
        }
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Number of diagnostics actually passed to the emitter.
    pub fn reported(&self) -> usize {
        self.reported
    }

    /// Report compiler output for one phase.
    ///
    /// No-op for empty text or when the sink is disabled. Returns whether the
    /// text reached the emitter.
    pub fn report(&mut self, phase: Phase, origin: &str, text: &str) -> bool {
        if !self.config.enabled {
            return false;
        }
        let diagnostic = Diagnostic::new(phase, origin, text);
        self.report_diagnostic(&diagnostic)
    }

    /// Report an already-built diagnostic. Same filtering as [`report`](Self::report).
    pub fn report_diagnostic(&mut self, diagnostic: &Diagnostic) -> bool {
        if !self.config.enabled || diagnostic.is_empty() {
            return false;
        }
        self.emitter.emit(diagnostic);
        self.reported += 1;
        true
    }

    pub fn flush(&mut self) {
        self.emitter.flush();
    }
}

#[cfg(test)]
mod tests;
