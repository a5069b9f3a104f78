//! Entry point linking and bytecode emission.
//!
//! `emit` runs three steps, stopping at the first failure:
//!
//! ```text
//! Unresolved ──resolve──► Resolved ──link──► Linked ──codegen──► BytecodeBlob
//!      │                     │                  │
//!      └──► EntrypointError  └──► LinkError     └──► CodeGenError
//! ```
//!
//! Whatever step runs reports its compiler output to the sink before its
//! result is inspected.

use std::fmt;
use std::rc::Rc;

use lumen_diagnostic::Phase;
use rustc_hash::FxHashSet;

use crate::backend::{Backend, EntryPointInfo};
use crate::cache::{LoadedModule, ModuleHandle};
use crate::context::CompilationContext;
use crate::errors::{CodeGenError, EmitError, EntrypointError, LinkError};
use crate::identity::ModuleIdentity;

/// Target bytecode for one entry point. Owned by the caller.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BytecodeBlob {
    bytes: Box<[u8]>,
}

impl BytecodeBlob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into_vec()
    }
}

impl From<Vec<u8>> for BytecodeBlob {
    fn from(bytes: Vec<u8>) -> Self {
        BytecodeBlob {
            bytes: bytes.into_boxed_slice(),
        }
    }
}

impl AsRef<[u8]> for BytecodeBlob {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for BytecodeBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BytecodeBlob({} bytes)", self.bytes.len())
    }
}

/// Result of a successful `emit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOutput {
    pub bytecode: BytecodeBlob,
    /// Warnings from linking and code generation, newline separated.
    pub diagnostics: String,
}

impl<B: Backend> CompilationContext<'_, B> {
    /// Compile `entry` from `module` for the target at `target_index`.
    ///
    /// `module` must have been loaded through this context. The entry name
    /// is matched exactly.
    #[tracing::instrument(
        level = "debug",
        skip(self, module),
        fields(context = %self.id(), module = %module.identity())
    )]
    pub fn emit(
        &self,
        module: &LoadedModule<B::Module>,
        entry: &str,
        target_index: usize,
    ) -> Result<EmitOutput, EmitError> {
        self.connection().assert_owner();

        if module.context() != self.id() {
            return Err(LinkError::ForeignModule {
                module: module.identity().clone(),
            }
            .into());
        }

        let entry_point = module
            .entry_point(entry)
            .ok_or_else(|| EntrypointError {
                name: entry.to_string(),
                module: module.identity().clone(),
            })?;

        let origin = format!("{}::{}", module.identity(), entry_point.name);
        let (program, link_diagnostics) = self.link(module, entry_point, &origin)?;
        let (bytes, codegen_diagnostics) =
            self.generate(&program, entry_point, target_index, &origin)?;

        tracing::debug!(bytes = bytes.len(), "entry point emitted");
        Ok(EmitOutput {
            bytecode: BytecodeBlob::from(bytes),
            diagnostics: join_diagnostics(&link_diagnostics, &codegen_diagnostics),
        })
    }

    fn link(
        &self,
        module: &LoadedModule<B::Module>,
        entry_point: &EntryPointInfo,
        origin: &str,
    ) -> Result<(B::Program, String), LinkError> {
        let closure = self.import_closure(module)?;
        tracing::trace!(imports = closure.len(), "import closure collected");

        let imports: Vec<&B::Module> = closure.iter().map(|m| m.module()).collect();
        let (program, diagnostics) = self
            .connection()
            .backend()
            .link(entry_point, module.module(), &imports, self.targets())
            .into_parts();
        self.connection().report(Phase::Link, origin, &diagnostics);

        match program {
            Some(program) => Ok((program, diagnostics)),
            None => Err(LinkError::Rejected {
                entry: entry_point.name.clone(),
                diagnostics,
            }),
        }
    }

    fn generate(
        &self,
        program: &B::Program,
        entry_point: &EntryPointInfo,
        target_index: usize,
        origin: &str,
    ) -> Result<(Vec<u8>, String), CodeGenError> {
        let target = self
            .targets()
            .get(target_index)
            .ok_or(CodeGenError::NoSuchTarget {
                index: target_index,
                count: self.targets().len(),
            })?;

        let (bytes, diagnostics) = self
            .connection()
            .backend()
            .generate(program, target)
            .into_parts();
        self.connection().report(Phase::CodeGen, origin, &diagnostics);

        match bytes {
            Some(bytes) if !bytes.is_empty() => Ok((bytes, diagnostics)),
            _ => Err(CodeGenError::Lowering {
                entry: entry_point.name.clone(),
                format: target.format(),
                diagnostics,
            }),
        }
    }

    /// Every module reachable through imports, excluding `root`, in
    /// depth-first import order. Each module appears once; cycles are cut.
    fn import_closure(
        &self,
        root: &LoadedModule<B::Module>,
    ) -> Result<Vec<ModuleHandle<B::Module>>, LinkError> {
        let mut visited = FxHashSet::default();
        visited.insert(root.identity().clone());
        let mut order = Vec::new();
        self.collect_imports(root, &mut visited, &mut order)?;
        Ok(order)
    }

    fn collect_imports(
        &self,
        importer: &LoadedModule<B::Module>,
        visited: &mut FxHashSet<ModuleIdentity>,
        order: &mut Vec<ModuleHandle<B::Module>>,
    ) -> Result<(), LinkError> {
        for name in importer.imports() {
            let Some(identity) = self.resolver().resolve(name, Some(importer.identity())) else {
                let text = format!(
                    "{}: error: cannot resolve import '{name}'",
                    importer.identity()
                );
                self.connection()
                    .report(Phase::Link, &importer.identity().to_string(), &text);
                return Err(LinkError::UnresolvedImport {
                    importer: importer.identity().clone(),
                    import: name.clone(),
                });
            };

            if !visited.insert(identity.clone()) {
                continue;
            }

            let module = self
                .load_module(&identity)
                .map_err(|e| LinkError::ImportLoad {
                    identity: e.identity,
                    diagnostics: e.diagnostics,
                })?;
            order.push(Rc::clone(&module));
            self.collect_imports(&module, visited, order)?;
        }
        Ok(())
    }
}

fn join_diagnostics(first: &str, second: &str) -> String {
    match (first.trim_end().is_empty(), second.trim_end().is_empty()) {
        (true, true) => String::new(),
        (false, true) => first.trim_end().to_string(),
        (true, false) => second.trim_end().to_string(),
        (false, false) => format!("{}\n{}", first.trim_end(), second.trim_end()),
    }
}
