//! Linking and bytecode emission for the reference backend.
//!
//! The emitted container is deterministic: the same linked program and
//! target always produce the same bytes.
//!
//! ```text
//! magic[4] version:u32 stage:u8 matrix:u8 scalar:u8 flags:u8
//! profile:str entry:str count:u32
//! count × { name:str caps:u32 [origin:str line:u32] body:str }
//! ```
//!
//! `str` is a `u32` little-endian length followed by UTF-8 bytes. The
//! bracketed origin fields are present only with `EmitFlags::DEBUG_INFO`.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::backend::{Compiled, EntryPointInfo, ShaderStage};
use crate::target::{EmitFlags, MatrixLayout, OutputFormat, TargetConfig};

use super::profile::{format_provides, ProfileSpec};
use super::syntax::{Capabilities, Function, SourceModule};

const CONTAINER_VERSION: u32 = 1;

/// Per-format container magic. SPIR-V uses its real magic number.
fn magic(format: OutputFormat) -> [u8; 4] {
    match format {
        OutputFormat::Spirv => 0x0723_0203_u32.to_le_bytes(),
        OutputFormat::Dxil => *b"DXIL",
        OutputFormat::Dxbc => *b"DXBC",
        OutputFormat::Metal => *b"MTLB",
        OutputFormat::Wgsl => *b"WGSL",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LinkedFunction {
    name: String,
    origin: PathBuf,
    line: usize,
    requires: Capabilities,
    body: String,
}

/// An entry point together with every function from its import closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedProgram {
    entry: EntryPointInfo,
    functions: Vec<LinkedFunction>,
}

impl LinkedProgram {
    pub fn entry(&self) -> &EntryPointInfo {
        &self.entry
    }

    /// Names of the linked functions, entry point first.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.name.as_str())
    }
}

fn located(path: &Path, line: usize, severity: &str, message: &str) -> String {
    format!("{}:{line}: {severity}: {message}", path.display())
}

pub(crate) fn link(
    entry: &EntryPointInfo,
    root: &SourceModule,
    imports: &[&SourceModule],
    targets: &[TargetConfig],
) -> Compiled<LinkedProgram> {
    let modules: Vec<&SourceModule> = std::iter::once(root).chain(imports.iter().copied()).collect();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // One definition per symbol across the whole program.
    let mut defined: FxHashMap<&str, &Path> = FxHashMap::default();
    for module in &modules {
        for function in module.definitions() {
            if let Some(previous) = defined.insert(&function.name, &module.path) {
                errors.push(located(
                    &module.path,
                    function.line,
                    "error",
                    &format!(
                        "symbol '{}' is also defined in '{}'",
                        function.name,
                        previous.display()
                    ),
                ));
            }
        }
    }

    for module in &modules {
        for function in module.functions.iter().filter(|f| f.is_extern) {
            if !defined.contains_key(function.name.as_str()) {
                errors.push(located(
                    &module.path,
                    function.line,
                    "error",
                    &format!("unresolved external symbol '{}'", function.name),
                ));
            }
        }

        for function in module.definitions() {
            for cap in &function.requires {
                for target in targets {
                    if !format_provides(target.format(), *cap) {
                        errors.push(located(
                            &module.path,
                            function.line,
                            "error",
                            &format!(
                                "function '{}' requires capability '{}', which {} does not provide",
                                function.name,
                                cap.as_str(),
                                target.format()
                            ),
                        ));
                    }
                }
            }
        }
    }

    for module in imports {
        if module.definitions().next().is_none() {
            warnings.push(located(
                &module.path,
                1,
                "warning",
                "module is imported but defines no functions",
            ));
        }
    }

    if !errors.is_empty() {
        errors.extend(warnings);
        return Compiled::failed(errors.join("\n"));
    }

    let mut functions = Vec::new();
    if let Some(main) = root.definitions().find(|f| f.name == entry.name) {
        functions.push(linked(&root.path, main));
    }
    for module in &modules {
        for function in module.definitions() {
            if function.name != entry.name {
                functions.push(linked(&module.path, function));
            }
        }
    }

    let program = LinkedProgram {
        entry: entry.clone(),
        functions,
    };
    Compiled::ok(program).with_diagnostics(warnings.join("\n"))
}

fn linked(origin: &Path, function: &Function) -> LinkedFunction {
    LinkedFunction {
        name: function.name.clone(),
        origin: origin.to_path_buf(),
        line: function.line,
        requires: function.requires.clone(),
        body: function.body.clone(),
    }
}

pub(crate) fn generate(program: &LinkedProgram, target: &TargetConfig) -> Compiled<Vec<u8>> {
    let Some(profile) = ProfileSpec::parse(target.profile().as_str()) else {
        return Compiled::failed(format!("error: unknown profile '{}'", target.profile()));
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for function in &program.functions {
        for cap in &function.requires {
            if let Some(minimum) = profile.minimum_for(*cap) {
                if !profile.satisfies(minimum) {
                    errors.push(located(
                        &function.origin,
                        function.line,
                        "error",
                        &format!(
                            "capability '{}' used by '{}' requires profile {minimum} or later, but the target profile is {}",
                            cap.as_str(),
                            function.name,
                            target.profile()
                        ),
                    ));
                }
            }
        }
    }

    if let Some(entry) = program.functions.first() {
        if entry.body.is_empty() {
            warnings.push(located(
                &entry.origin,
                entry.line,
                "warning",
                &format!("entry point '{}' has an empty body", entry.name),
            ));
        }
    }

    if !errors.is_empty() {
        errors.extend(warnings);
        return Compiled::failed(errors.join("\n"));
    }

    let bytes = write_container(program, target);
    Compiled::ok(bytes).with_diagnostics(warnings.join("\n"))
}

fn write_container(program: &LinkedProgram, target: &TargetConfig) -> Vec<u8> {
    let flags = target.flags();
    let named = !flags.contains(EmitFlags::OBFUSCATE);
    let debug = flags.contains(EmitFlags::DEBUG_INFO) && named;

    let mut out = ContainerWriter::default();
    out.bytes(&magic(target.format()));
    out.u32(CONTAINER_VERSION);
    out.u8(match program.entry.stage {
        ShaderStage::Vertex => 0,
        ShaderStage::Fragment => 1,
        ShaderStage::Compute => 2,
    });
    out.u8(match target.matrix_layout() {
        MatrixLayout::ColumnMajor => 0,
        MatrixLayout::RowMajor => 1,
    });
    out.u8(u8::from(target.scalar_block_layout()));
    out.u8((flags.bits() & 0xff) as u8);
    out.str(target.profile().as_str());
    out.str(if named { &program.entry.name } else { "" });

    out.u32(program.functions.len() as u32);
    for function in &program.functions {
        out.str(if named { &function.name } else { "" });
        out.u32(function.requires.iter().fold(0, |bits, cap| bits | cap.bit()));
        if debug {
            out.str(&function.origin.to_string_lossy());
            out.u32(function.line as u32);
        }
        out.str(&function.body);
    }
    out.finish()
}

#[derive(Default)]
struct ContainerWriter {
    buf: Vec<u8>,
}

impl ContainerWriter {
    fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn str(&mut self, value: &str) {
        self.u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}
