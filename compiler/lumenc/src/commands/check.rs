//! The `check` command: load a module and report what it exports.

use std::fmt;

use lumen_session::{EntryPointInfo, ModuleIdentity};

use super::{open_connection, session_error, CliError, CompileOptions};

/// How one import of the checked module resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    Resolved(ModuleIdentity),
    Unresolved,
}

/// What `check` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub module: ModuleIdentity,
    pub entry_points: Vec<EntryPointInfo>,
    pub imports: Vec<(String, ImportStatus)>,
}

impl CheckReport {
    pub fn has_unresolved_imports(&self) -> bool {
        self.imports
            .iter()
            .any(|(_, status)| *status == ImportStatus::Unresolved)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.module)?;
        if self.entry_points.is_empty() {
            writeln!(f, "  no entry points")?;
        }
        for entry in &self.entry_points {
            writeln!(f, "  entry {} ({})", entry.name, entry.stage)?;
        }
        for (name, status) in &self.imports {
            match status {
                ImportStatus::Resolved(identity) => writeln!(f, "  import {name} -> {identity}")?,
                ImportStatus::Unresolved => writeln!(f, "  import {name} -> unresolved")?,
            }
        }
        Ok(())
    }
}

/// Parse a module and resolve its direct imports without emitting code.
///
/// A module that fails to parse is an error; unresolved imports are
/// reported in the result.
pub fn check_file(options: &CompileOptions) -> Result<CheckReport, CliError> {
    let connection = open_connection(options)?;
    let context = connection
        .create_context(options.context_desc())
        .map_err(session_error)?;
    let identity = ModuleIdentity::canonicalize(&options.input).map_err(session_error)?;
    let module = context.load_module(&identity).map_err(session_error)?;

    let imports = module
        .imports()
        .iter()
        .map(|name| {
            let status = match context.resolver().resolve(name, Some(&identity)) {
                Some(resolved) => ImportStatus::Resolved(resolved),
                None => ImportStatus::Unresolved,
            };
            (name.clone(), status)
        })
        .collect();

    connection.flush_diagnostics();
    Ok(CheckReport {
        module: identity,
        entry_points: module.entry_points().to_vec(),
        imports,
    })
}
