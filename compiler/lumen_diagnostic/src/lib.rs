//! Diagnostic capture for the shader compiler front end.
//!
//! The compiler hands back free-form diagnostic text from every fallible call
//! (parse, link, code generation). This crate does not interpret that text;
//! it tags it with the pipeline phase and the module it came from, and routes
//! it to an emitter.
//!
//! ```text
//! compiler call ──► text ──► DiagnosticSink::report()
//!                                  │ (enabled? non-empty?)
//!                                  ▼
//!                           DiagnosticEmitter
//!                   ├── TracingEmitter   (default)
//!                   ├── TerminalEmitter  (CLI, stderr)
//!                   └── CaptureEmitter   (tests, tooling)
//! ```

mod diagnostic;
pub mod emitter;
pub mod sink;

pub use diagnostic::{Diagnostic, Phase};
pub use emitter::{CaptureEmitter, ColorMode, DiagnosticEmitter, TerminalEmitter, TracingEmitter};
pub use sink::{DiagnosticSink, SinkConfig};
