//! Built-in reference backend.
//!
//! A small, dependency-free stand-in for a native shader compiler. It scans
//! `.lsl` modules for declarations (imports, attributes and functions),
//! enforces symbol and capability rules at link time, checks profile
//! minimums at code generation, and emits a deterministic container per
//! output format. It is what the CLI and the test suite run against.

mod codegen;
mod profile;
mod syntax;


pub use codegen::LinkedProgram;
pub use profile::KNOWN_PROFILES;
pub use syntax::{Capability, Function, Import, SourceModule};

use crate::backend::{Backend, Compiled, EntryPointInfo};
use crate::identity::ModuleIdentity;
use crate::target::{OutputFormat, Profile, TargetConfig};

use profile::{format_supports_scalar_layout, ProfileSpec};

/// The reference compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

impl ReferenceBackend {
    pub fn new() -> Self {
        ReferenceBackend
    }

    /// Profiles accepted for a format, in ascending order.
    pub fn profiles_for(format: OutputFormat) -> Vec<&'static str> {
        KNOWN_PROFILES
            .iter()
            .copied()
            .filter(|name| ProfileSpec::parse(name).is_some_and(|spec| spec.accepts(format)))
            .collect()
    }
}

impl Backend for ReferenceBackend {
    type Module = SourceModule;
    type Program = LinkedProgram;

    fn name(&self) -> &str {
        "lumen-reference"
    }

    fn find_profile(&self, name: &str) -> Option<Profile> {
        ProfileSpec::parse(name).map(|_| Profile::new(name))
    }

    fn check_target(&self, target: &TargetConfig) -> Result<(), String> {
        let Some(spec) = ProfileSpec::parse(target.profile().as_str()) else {
            return Err(format!("unknown profile '{}'", target.profile()));
        };
        if !spec.accepts(target.format()) {
            return Err(format!(
                "profile '{}' cannot produce {}; expected one of: {}",
                target.profile(),
                target.format(),
                Self::profiles_for(target.format()).join(", ")
            ));
        }
        if target.scalar_block_layout() && !format_supports_scalar_layout(target.format()) {
            return Err(format!(
                "scalar block layout is not available for {}",
                target.format()
            ));
        }
        Ok(())
    }

    fn parse(&self, identity: &ModuleIdentity) -> Compiled<SourceModule> {
        let source = match std::fs::read_to_string(identity.path()) {
            Ok(source) => source,
            Err(e) => return Compiled::failed(format!("{identity}: error: cannot read module: {e}")),
        };
        let (module, messages) = syntax::parse_source(identity.path(), &source);
        Compiled {
            value: module,
            diagnostics: messages.join("\n"),
        }
    }

    fn entry_points(&self, module: &SourceModule) -> Vec<EntryPointInfo> {
        module
            .functions
            .iter()
            .filter_map(|f| {
                f.stage.map(|stage| EntryPointInfo {
                    name: f.name.clone(),
                    stage,
                })
            })
            .collect()
    }

    fn imports(&self, module: &SourceModule) -> Vec<String> {
        module.imports.iter().map(|imp| imp.name.clone()).collect()
    }

    fn link(
        &self,
        entry: &EntryPointInfo,
        root: &SourceModule,
        imports: &[&SourceModule],
        targets: &[TargetConfig],
    ) -> Compiled<LinkedProgram> {
        codegen::link(entry, root, imports, targets)
    }

    fn generate(&self, program: &LinkedProgram, target: &TargetConfig) -> Compiled<Vec<u8>> {
        codegen::generate(program, target)
    }
}
