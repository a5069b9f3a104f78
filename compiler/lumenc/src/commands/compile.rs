//! The `compile` command: emit target bytecode for a module's entry points.

use std::fmt;
use std::path::{Path, PathBuf};

use lumen_diagnostic::{ColorMode, SinkConfig};
use lumen_session::{
    ContextDesc, EmitFlags, MatrixLayout, ModuleIdentity, OutputFormat, Profile, TargetConfig,
};

use super::{open_connection, parse_color, session_error, CliError};
use crate::commands::targets::default_profile;

/// Options shared by `compile` and `check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Module to compile.
    pub input: PathBuf,
    /// Output format (--format=<name>)
    pub format: OutputFormat,
    /// Profile (--profile=<name>); defaults per format
    pub profile: Option<String>,
    /// Single entry point to emit (--entry=<name>); all when absent
    pub entry: Option<String>,
    /// Row-major matrices (--row-major)
    pub row_major: bool,
    /// Scalar block layout (--scalar-layout)
    pub scalar_layout: bool,
    /// Keep names and source locations (--debug-info)
    pub debug_info: bool,
    /// Strip names (--obfuscate)
    pub obfuscate: bool,
    /// Import search paths (-I <dir>)
    pub include_dirs: Vec<PathBuf>,
    /// Output file, or directory when emitting several entry points (-o <path>)
    pub output: Option<PathBuf>,
    /// Suppress compiler output and the summary (--quiet)
    pub quiet: bool,
    /// Show compiler output even in release builds (--diagnostics)
    pub diagnostics: bool,
    /// Terminal colors (--color=<mode>)
    pub color: ColorMode,
}

impl CompileOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        CompileOptions {
            input: input.into(),
            format: OutputFormat::Spirv,
            profile: None,
            entry: None,
            row_major: false,
            scalar_layout: false,
            debug_info: false,
            obfuscate: false,
            include_dirs: Vec::new(),
            output: None,
            quiet: false,
            diagnostics: false,
            color: ColorMode::Auto,
        }
    }

    /// `--quiet` wins over `--diagnostics`; otherwise follow the build mode.
    pub fn sink_config(&self) -> SinkConfig {
        if self.quiet {
            SinkConfig::silent()
        } else if self.diagnostics {
            SinkConfig::enabled()
        } else {
            SinkConfig::default()
        }
    }

    /// The single target these options describe.
    pub fn target(&self) -> TargetConfig {
        let profile = self
            .profile
            .clone()
            .unwrap_or_else(|| default_profile(self.format).to_string());

        let mut flags = EmitFlags::EMIT_DIRECTLY;
        if self.debug_info {
            flags |= EmitFlags::DEBUG_INFO;
        }
        if self.obfuscate {
            flags |= EmitFlags::OBFUSCATE;
        }

        let layout = if self.row_major {
            MatrixLayout::RowMajor
        } else {
            MatrixLayout::ColumnMajor
        };

        TargetConfig::new(self.format, Profile::new(profile))
            .with_flags(flags)
            .with_matrix_layout(layout)
            .with_scalar_block_layout(self.scalar_layout)
    }

    pub fn context_desc(&self) -> ContextDesc {
        self.include_dirs
            .iter()
            .fold(ContextDesc::new(self.target()), |desc, dir| {
                desc.with_search_path(dir.clone())
            })
    }

    /// Where the bytecode for `entry` goes.
    ///
    /// `-o` names the file when one entry point is emitted and a directory
    /// otherwise. Without `-o`, files land next to the module as
    /// `<stem>.<entry>.<ext>`.
    pub fn output_path(&self, module: &ModuleIdentity, entry: &str, entry_count: usize) -> PathBuf {
        let file_name = format!("{}.{entry}.{}", module.stem(), self.format.extension());
        match &self.output {
            Some(path) if entry_count == 1 => path.clone(),
            Some(dir) => dir.join(file_name),
            None => module.directory().join(file_name),
        }
    }
}

/// Parse `compile`/`check` arguments (everything after the subcommand).
pub fn parse_compile_options(args: &[String]) -> Result<CompileOptions, CliError> {
    let mut options = CompileOptions::new(PathBuf::new());
    let mut input = None;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if let Some(name) = arg.strip_prefix("--format=") {
            options.format = OutputFormat::parse(name).ok_or_else(|| {
                let known: Vec<_> = OutputFormat::ALL.iter().map(|f| f.as_str()).collect();
                CliError::usage(format!(
                    "unknown format '{name}', expected one of: {}",
                    known.join(", ")
                ))
            })?;
        } else if let Some(profile) = arg.strip_prefix("--profile=") {
            options.profile = Some(profile.to_string());
        } else if let Some(entry) = arg.strip_prefix("--entry=") {
            options.entry = Some(entry.to_string());
        } else if let Some(mode) = arg.strip_prefix("--color=") {
            options.color = parse_color(mode)?;
        } else if arg == "--row-major" {
            options.row_major = true;
        } else if arg == "--scalar-layout" {
            options.scalar_layout = true;
        } else if arg == "--debug-info" || arg == "-g" {
            options.debug_info = true;
        } else if arg == "--obfuscate" {
            options.obfuscate = true;
        } else if arg == "--quiet" || arg == "-q" {
            options.quiet = true;
        } else if arg == "--diagnostics" {
            options.diagnostics = true;
        } else if arg == "-I" || arg == "-o" {
            let Some(value) = args.get(i + 1) else {
                return Err(CliError::usage(format!("{arg} requires a value")));
            };
            if arg == "-I" {
                options.include_dirs.push(PathBuf::from(value));
            } else {
                options.output = Some(PathBuf::from(value));
            }
            i += 1;
        } else if let Some(dir) = arg.strip_prefix("-I") {
            options.include_dirs.push(PathBuf::from(dir));
        } else if arg.starts_with('-') {
            return Err(CliError::usage(format!("unknown option '{arg}'")));
        } else if input.is_none() {
            input = Some(PathBuf::from(arg));
        } else {
            return Err(CliError::usage(format!("unexpected argument '{arg}'")));
        }
        i += 1;
    }

    options.input = input.ok_or_else(|| CliError::usage("missing input file"))?;
    Ok(options)
}

/// One emitted entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledEntry {
    pub entry: String,
    pub path: PathBuf,
    pub size: usize,
}

impl fmt::Display for CompiledEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} bytes)",
            self.entry,
            self.path.display(),
            self.size
        )
    }
}

/// Compile the requested entry points and write each blob to disk.
///
/// Every entry point is emitted before anything is written, so a failing
/// entry point leaves no output behind. If a write fails, blobs already
/// written by this call are removed.
pub fn compile_file(options: &CompileOptions) -> Result<Vec<CompiledEntry>, CliError> {
    let connection = open_connection(options)?;
    let context = connection
        .create_context(options.context_desc())
        .map_err(session_error)?;
    let identity = ModuleIdentity::canonicalize(&options.input).map_err(session_error)?;
    let module = context.load_module(&identity).map_err(session_error)?;

    let entries: Vec<String> = match &options.entry {
        Some(entry) => vec![entry.clone()],
        None => module.entry_points().iter().map(|e| e.name.clone()).collect(),
    };
    if entries.is_empty() {
        return Err(CliError::NoEntryPoints { module: identity });
    }

    let mut emitted = Vec::with_capacity(entries.len());
    for entry in &entries {
        let output = context.emit(&module, entry, 0).map_err(session_error)?;
        emitted.push((entry, output.bytecode));
    }

    let mut compiled: Vec<CompiledEntry> = Vec::with_capacity(emitted.len());
    for (entry, bytecode) in emitted {
        let path = options.output_path(&identity, entry, entries.len());
        if let Err(err) = write_blob(&path, bytecode.as_bytes()) {
            remove_written(&compiled);
            return Err(err);
        }
        tracing::debug!(entry = %entry, path = %path.display(), "bytecode written");
        compiled.push(CompiledEntry {
            entry: entry.clone(),
            path,
            size: bytecode.len(),
        });
    }

    connection.flush_diagnostics();
    Ok(compiled)
}

fn remove_written(compiled: &[CompiledEntry]) {
    for entry in compiled {
        if let Err(err) = std::fs::remove_file(&entry.path) {
            tracing::debug!(
                path = %entry.path.display(),
                error = %err,
                "cannot remove partial output"
            );
        }
    }
}

fn write_blob(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    let write_error = |source| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, bytes).map_err(write_error)
}
