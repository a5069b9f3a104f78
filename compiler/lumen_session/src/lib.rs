//! Lumen shader compiler: sessions, module cache and entry point linking.
//!
//! Turns shader modules into target bytecode through an opaque compiler
//! [`Backend`], caching every parsed module for the lifetime of the
//! compilation context that loaded it.
//!
//! # Architecture
//!
//! ```text
//! CompilerConnection (one per thread, owns the backend + diagnostics sink)
//!     │ create_context(ContextDesc)
//!     ▼
//! CompilationContext (targets, resolver, module cache)
//!     │ load_module(identity) ──► ModuleCache ──miss──► Backend::parse
//!     ▼
//! LoadedModule (Rc, immutable)
//!     │ emit(module, entry, target_index)
//!     ▼
//! resolve entry ──► link import closure ──► generate ──► BytecodeBlob
//! ```
//!
//! Every compiler call hands back optional diagnostic text, which is sent to
//! the connection's [`DiagnosticSink`] before any error propagates.
//!
//! # Threading
//!
//! A connection is bound to the thread that created it. The types are
//! `!Send`, and every entry point additionally checks a [`ThreadToken`].
//! Use one connection per thread.

pub mod backend;
mod cache;
mod connection;
mod context;
mod errors;
mod identity;
mod linker;
pub mod resolver;
pub mod target;
pub mod testing;
mod thread;

pub use backend::reference::ReferenceBackend;
pub use backend::{Backend, Compiled, EntryPointInfo, ShaderStage};
pub use cache::{CacheStats, LoadedModule, ModuleHandle};
pub use connection::CompilerConnection;
pub use context::{CompilationContext, ContextDesc, ContextId};
pub use errors::{
    CodeGenError, ConfigurationError, ConnectionError, EmitError, EntrypointError, Error,
    IdentityError, LinkError, ModuleLoadError,
};
pub use identity::ModuleIdentity;
pub use linker::{BytecodeBlob, EmitOutput};
pub use resolver::{ModuleResolver, MODULE_EXTENSION};
pub use target::{EmitFlags, MatrixLayout, OutputFormat, Profile, TargetConfig};
pub use thread::ThreadToken;

pub use lumen_diagnostic::{DiagnosticSink, Phase, SinkConfig};
