//! Declaration scanner for `.lsl` modules.
//!
//! Recognizes only what linking needs: imports, entry point and capability
//! attributes, function definitions and `extern` declarations. Function
//! bodies are kept as opaque text.
//!
//! ```text
//! import common.lighting;
//!
//! [shader("vertex")]
//! [require("float64")]
//! fn VertexMain(position: float3) { ... }
//!
//! extern fn shade(normal: float3);
//! ```

use std::path::{Path, PathBuf};

use smallvec::SmallVec;

use crate::backend::ShaderStage;

/// Hardware feature a function depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Float64,
    Int64,
    Subgroups,
    RayTracing,
    MeshShading,
}

impl Capability {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "float64" => Some(Capability::Float64),
            "int64" => Some(Capability::Int64),
            "subgroups" => Some(Capability::Subgroups),
            "ray_tracing" => Some(Capability::RayTracing),
            "mesh_shading" => Some(Capability::MeshShading),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Float64 => "float64",
            Capability::Int64 => "int64",
            Capability::Subgroups => "subgroups",
            Capability::RayTracing => "ray_tracing",
            Capability::MeshShading => "mesh_shading",
        }
    }

    pub(crate) fn bit(self) -> u32 {
        match self {
            Capability::Float64 => 1,
            Capability::Int64 => 1 << 1,
            Capability::Subgroups => 1 << 2,
            Capability::RayTracing => 1 << 3,
            Capability::MeshShading => 1 << 4,
        }
    }
}

pub(crate) type Capabilities = SmallVec<[Capability; 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub line: usize,
    pub stage: Option<ShaderStage>,
    pub requires: SmallVec<[Capability; 2]>,
    pub is_extern: bool,
    /// Body text with whitespace collapsed; empty for `extern` declarations.
    pub body: String,
}

/// A scanned module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    pub(crate) path: PathBuf,
    pub(crate) imports: Vec<Import>,
    pub(crate) functions: Vec<Function>,
}

impl SourceModule {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Functions with a body, in source order.
    pub(crate) fn definitions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| !f.is_extern)
    }
}

/// Scan `source`. Returns the module (unless there were errors) and every
/// message produced, already formatted as `path:line: severity: text`.
pub(crate) fn parse_source(path: &Path, source: &str) -> (Option<SourceModule>, Vec<String>) {
    let mut parser = Parser::new(path);
    for (index, line) in source.lines().enumerate() {
        parser.line(index + 1, line);
    }
    parser.finish()
}

#[derive(Default)]
struct PendingAttributes {
    line: Option<usize>,
    stage: Option<ShaderStage>,
    requires: Capabilities,
}

struct OpenFunction {
    function: Function,
    depth: usize,
    body: String,
}

struct Parser<'a> {
    path: &'a Path,
    imports: Vec<Import>,
    functions: Vec<Function>,
    messages: Vec<String>,
    has_errors: bool,
    pending: PendingAttributes,
    open: Option<OpenFunction>,
}

impl<'a> Parser<'a> {
    fn new(path: &'a Path) -> Self {
        Parser {
            path,
            imports: Vec::new(),
            functions: Vec::new(),
            messages: Vec::new(),
            has_errors: false,
            pending: PendingAttributes::default(),
            open: None,
        }
    }

    fn error(&mut self, line: usize, message: impl AsRef<str>) {
        self.has_errors = true;
        self.push_message(line, "error", message.as_ref());
    }

    fn warning(&mut self, line: usize, message: impl AsRef<str>) {
        self.push_message(line, "warning", message.as_ref());
    }

    fn push_message(&mut self, line: usize, severity: &str, message: &str) {
        self.messages.push(format!(
            "{}:{line}: {severity}: {message}",
            self.path.display()
        ));
    }

    fn line(&mut self, number: usize, raw: &str) {
        let text = strip_comment(raw);
        if self.open.is_some() {
            self.feed_body(number, text);
            return;
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(rest) = trimmed.strip_prefix("import ") {
            self.reject_dangling_attributes();
            self.import(number, rest);
        } else if trimmed.starts_with('[') {
            self.attribute(number, trimmed);
        } else if let Some(rest) = trimmed.strip_prefix("extern fn ") {
            self.extern_function(number, rest);
        } else if let Some(rest) = trimmed.strip_prefix("fn ") {
            self.function_header(number, rest);
        } else if trimmed.starts_with('}') {
            self.error(number, "unmatched closing brace");
        } else {
            self.error(
                number,
                format!("expected `import`, an attribute, or a function, found `{trimmed}`"),
            );
        }
    }

    fn import(&mut self, line: usize, rest: &str) {
        let Some(name) = rest.trim().strip_suffix(';') else {
            self.error(line, "malformed import: missing `;`");
            return;
        };
        let name = name.trim().trim_matches('"');
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-'));
        if !valid {
            self.error(line, format!("malformed import `{name}`"));
            return;
        }
        if self.imports.iter().any(|imp| imp.name == name) {
            self.warning(line, format!("duplicate import '{name}'"));
            return;
        }
        self.imports.push(Import {
            name: name.to_string(),
            line,
        });
    }

    fn attribute(&mut self, line: usize, text: &str) {
        let Some((kind, argument)) = parse_attribute(text) else {
            self.error(line, format!("malformed attribute `{text}`"));
            return;
        };
        self.pending.line.get_or_insert(line);
        match kind {
            "shader" => match ShaderStage::parse(argument) {
                Some(stage) => {
                    if self.pending.stage.replace(stage).is_some() {
                        self.error(line, "function already has a shader stage");
                    }
                }
                None => self.error(line, format!("unknown shader stage '{argument}'")),
            },
            "require" => match Capability::parse(argument) {
                Some(cap) => {
                    if !self.pending.requires.contains(&cap) {
                        self.pending.requires.push(cap);
                    }
                }
                None => self.error(line, format!("unknown capability '{argument}'")),
            },
            other => self.error(line, format!("unknown attribute '{other}'")),
        }
    }

    fn extern_function(&mut self, line: usize, rest: &str) {
        let pending = std::mem::take(&mut self.pending);
        if !rest.trim_end().ends_with(';') {
            self.error(line, "extern declaration must end with `;`");
            return;
        }
        let Some(name) = signature_name(rest) else {
            self.error(line, "malformed extern declaration");
            return;
        };
        if pending.stage.is_some() {
            self.error(
                line,
                format!("extern function '{name}' cannot be an entry point"),
            );
            return;
        }
        self.declare(Function {
            name: name.to_string(),
            line,
            stage: None,
            requires: pending.requires,
            is_extern: true,
            body: String::new(),
        });
    }

    fn function_header(&mut self, line: usize, rest: &str) {
        let pending = std::mem::take(&mut self.pending);
        let Some(name) = signature_name(rest) else {
            self.error(line, "malformed function signature");
            return;
        };
        let Some(brace) = rest.find('{') else {
            self.error(line, format!("expected `{{` after signature of '{name}'"));
            return;
        };
        self.open = Some(OpenFunction {
            function: Function {
                name: name.to_string(),
                line,
                stage: pending.stage,
                requires: pending.requires,
                is_extern: false,
                body: String::new(),
            },
            depth: 1,
            body: String::new(),
        });
        self.feed_body(line, &rest[brace + 1..]);
    }

    fn feed_body(&mut self, line: usize, text: &str) {
        let Some(open) = self.open.as_mut() else {
            return;
        };

        let mut closed_at = None;
        for (idx, ch) in text.char_indices() {
            match ch {
                '{' => open.depth += 1,
                '}' => {
                    open.depth -= 1;
                    if open.depth == 0 {
                        closed_at = Some(idx + 1);
                        break;
                    }
                }
                _ => {}
            }
            open.body.push(ch);
        }

        let Some(rest_start) = closed_at else {
            open.body.push('\n');
            return;
        };

        if let Some(open) = self.open.take() {
            let mut function = open.function;
            function.body = open.body.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text[rest_start..].trim().is_empty() {
                self.error(line, format!("unexpected text after body of '{}'", function.name));
            }
            self.declare(function);
        }
    }

    fn declare(&mut self, function: Function) {
        if let Some(existing) = self.functions.iter().find(|f| f.name == function.name) {
            let first = existing.line;
            self.error(
                function.line,
                format!(
                    "duplicate function '{}' (first declared on line {first})",
                    function.name
                ),
            );
            return;
        }
        self.functions.push(function);
    }

    fn reject_dangling_attributes(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if let Some(line) = pending.line {
            self.error(line, "attribute is not followed by a function");
        }
    }

    fn finish(mut self) -> (Option<SourceModule>, Vec<String>) {
        if let Some(open) = self.open.take() {
            self.error(
                open.function.line,
                format!("function '{}' is missing a closing brace", open.function.name),
            );
        }
        self.reject_dangling_attributes();

        if self.has_errors {
            return (None, self.messages);
        }
        let module = SourceModule {
            path: self.path.to_path_buf(),
            imports: self.imports,
            functions: self.functions,
        };
        (Some(module), self.messages)
    }
}

fn strip_comment(line: &str) -> &str {
    line.find("//").map_or(line, |idx| &line[..idx])
}

/// `[kind("argument")]` -> `("kind", "argument")`
fn parse_attribute(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?.trim();
    let open = inner.find('(')?;
    let kind = inner[..open].trim();
    let argument = inner[open + 1..]
        .strip_suffix(')')?
        .trim()
        .strip_prefix('"')?
        .strip_suffix('"')?;
    Some((kind, argument))
}

/// Name before the parameter list, if it is an identifier.
fn signature_name(rest: &str) -> Option<&str> {
    let open = rest.find('(')?;
    let name = rest[..open].trim();
    is_identifier(name).then_some(name)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
