//! Error taxonomy for the compilation pipeline.
//!
//! Every variant that wraps compiler output carries the diagnostic text as
//! well; by the time one of these is returned, that text has already been
//! reported to the connection's sink.

use std::path::PathBuf;

use crate::identity::ModuleIdentity;
use crate::target::{OutputFormat, Profile};

/// The compiler capability could not be brought up.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to initialize compiler backend '{backend}': {reason}")]
    Initialization { backend: String, reason: String },
}

/// A context could not be built from the requested targets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("a compilation context needs at least one target")]
    NoTargets,
    #[error("target {index} ({format}/{profile}) is not supported by {backend}: {reason}")]
    UnsupportedTarget {
        index: usize,
        format: OutputFormat,
        profile: Profile,
        backend: String,
        reason: String,
    },
}

/// A path could not be turned into a module identity.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("module path '{}' is not absolute", .0.display())]
    NotAbsolute(PathBuf),
    #[error("cannot resolve module path '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parsing a module failed. Nothing was cached; loading again re-parses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load module '{identity}'{}", render_diagnostics(.diagnostics))]
pub struct ModuleLoadError {
    pub identity: ModuleIdentity,
    pub diagnostics: String,
}

/// The requested entry point does not exist in the module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entry point '{name}' not found in module '{module}'")]
pub struct EntrypointError {
    /// The name exactly as the caller spelled it.
    pub name: String,
    pub module: ModuleIdentity,
}

/// Linking an entry point with its imports failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("cannot resolve import '{import}' from module '{importer}'")]
    UnresolvedImport {
        importer: ModuleIdentity,
        import: String,
    },
    #[error("imported module '{identity}' failed to load{}", render_diagnostics(.diagnostics))]
    ImportLoad {
        identity: ModuleIdentity,
        diagnostics: String,
    },
    #[error("module '{module}' was loaded by a different compilation context")]
    ForeignModule { module: ModuleIdentity },
    #[error("failed to link entry point '{entry}'{}", render_diagnostics(.diagnostics))]
    Rejected { entry: String, diagnostics: String },
}

/// Lowering a linked program to target bytecode failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeGenError {
    #[error("target index {index} is out of range: the context has {count} target(s)")]
    NoSuchTarget { index: usize, count: usize },
    #[error("failed to generate {format} code for entry point '{entry}'{}", render_diagnostics(.diagnostics))]
    Lowering {
        entry: String,
        format: OutputFormat,
        diagnostics: String,
    },
}

/// Failure of one `emit` call, by pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error(transparent)]
    Entrypoint(#[from] EntrypointError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    CodeGen(#[from] CodeGenError),
}

/// Any error the pipeline can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

fn render_diagnostics(diagnostics: &str) -> String {
    let trimmed = diagnostics.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}
