//! Diagnostic Emitters
//!
//! Destinations for reported diagnostics:
//! - Tracing: forwards to the `tracing` subscriber installed by the host
//! - Terminal: human-readable output with optional ANSI color
//! - Capture: keeps diagnostics in memory for inspection

mod capture;
mod terminal;
mod trace;

pub use capture::CaptureEmitter;
pub use terminal::{ColorMode, TerminalEmitter};
pub use trace::TracingEmitter;

use crate::Diagnostic;

/// Trait for emitting diagnostics to some output surface.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self) {}
}

impl<E: DiagnosticEmitter + ?Sized> DiagnosticEmitter for Box<E> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        (**self).emit(diagnostic);
    }

    fn flush(&mut self) {
        (**self).flush();
    }
}

/// Classify a rendered line for coloring.
///
/// Only used for presentation; the payload itself is never interpreted.
pub(crate) fn line_tone(line: &str) -> LineTone {
    let lower = line.to_ascii_lowercase();
    if lower.contains("error") {
        LineTone::Error
    } else if lower.contains("warning") {
        LineTone::Warning
    } else {
        LineTone::Plain
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LineTone {
    Error,
    Warning,
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_tone() {
        assert_eq!(line_tone("a.lsl:3: error: bad"), LineTone::Error);
        assert_eq!(line_tone("a.lsl:3: Warning: meh"), LineTone::Warning);
        assert_eq!(line_tone("note: see here"), LineTone::Plain);
    }

    #[test]
    fn test_boxed_emitter_forwards() {
        let mut boxed: Box<CaptureEmitter> = Box::new(CaptureEmitter::new());
        boxed.emit(&Diagnostic::new(crate::Phase::Load, "a", "b"));
        assert_eq!(boxed.diagnostics().len(), 1);
    }
}
