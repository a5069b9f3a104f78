//! The compiler capability.
//!
//! A [`Backend`] is the opaque shader compiler behind a connection: it knows
//! the language, the profiles it can target, and how to lower a linked
//! program. The session layer never looks inside parsed modules or linked
//! programs; it only caches, sequences and reports.
//!
//! Every fallible call returns a [`Compiled`] value: an optional result plus
//! optional diagnostic text, which may be non-empty on success (warnings)
//! and on failure.

pub mod reference;

use std::fmt;

use crate::identity::ModuleIdentity;
use crate::target::{Profile, TargetConfig};

/// Result of one compiler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled<T> {
    /// `None` means the call failed.
    pub value: Option<T>,
    /// Compiler output, possibly empty.
    pub diagnostics: String,
}

impl<T> Compiled<T> {
    /// Success with no diagnostics.
    pub fn ok(value: T) -> Self {
        Compiled {
            value: Some(value),
            diagnostics: String::new(),
        }
    }

    /// Failure with the compiler's explanation.
    pub fn failed(diagnostics: impl Into<String>) -> Self {
        Compiled {
            value: None,
            diagnostics: diagnostics.into(),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: impl Into<String>) -> Self {
        self.diagnostics = diagnostics.into();
        self
    }

    pub fn into_parts(self) -> (Option<T>, String) {
        (self.value, self.diagnostics)
    }
}

/// Pipeline stage an entry point runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vertex" => Some(ShaderStage::Vertex),
            "fragment" | "pixel" => Some(ShaderStage::Fragment),
            "compute" => Some(ShaderStage::Compute),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry point exported by a parsed module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPointInfo {
    pub name: String,
    pub stage: ShaderStage,
}

/// An opaque shader compiler.
///
/// Implementations are used from a single thread; nothing here needs to be
/// `Send` or `Sync`.
pub trait Backend {
    /// A parsed module. Never mutated once produced.
    type Module;
    /// An entry point linked with everything it imports.
    type Program;

    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Allocate compiler runtime state. Called once, by the connection.
    fn initialize(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Look up a profile by name.
    fn find_profile(&self, name: &str) -> Option<Profile>;

    /// Check that a target's format/profile combination is supported.
    fn check_target(&self, target: &TargetConfig) -> Result<(), String>;

    /// Parse the module at `identity`.
    fn parse(&self, identity: &ModuleIdentity) -> Compiled<Self::Module>;

    /// Entry points exported by a module.
    fn entry_points(&self, module: &Self::Module) -> Vec<EntryPointInfo>;

    /// Logical names of the modules a module imports, in source order.
    fn imports(&self, module: &Self::Module) -> Vec<String>;

    /// Link `entry` from `root` with its transitive imports.
    ///
    /// `imports` holds every module in the import closure except `root`, in
    /// a deterministic order.
    fn link(
        &self,
        entry: &EntryPointInfo,
        root: &Self::Module,
        imports: &[&Self::Module],
        targets: &[TargetConfig],
    ) -> Compiled<Self::Program>;

    /// Lower a linked program for one target.
    fn generate(&self, program: &Self::Program, target: &TargetConfig) -> Compiled<Vec<u8>>;
}
