use crate::Diagnostic;

use super::DiagnosticEmitter;

/// Forwards diagnostics to the installed `tracing` subscriber.
///
/// Each diagnostic becomes one `WARN` event on the `lumen::diagnostics`
/// target, so hosts can filter compiler chatter with `RUST_LOG`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEmitter;

impl DiagnosticEmitter for TracingEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        tracing::warn!(
            target: "lumen::diagnostics",
            phase = %diagnostic.phase,
            origin = %diagnostic.origin,
            "{}",
            diagnostic.text.trim_end()
        );
    }
}
