//! The diagnostic payload passed from compiler calls to the sink.

use std::fmt;

/// Pipeline phase that produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Parsing a module into the cache.
    Load,
    /// Linking an entry point with its imports.
    Link,
    /// Lowering a linked program to target bytecode.
    CodeGen,
}

impl Phase {
    /// Short lowercase name used in rendered output.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Link => "link",
            Phase::CodeGen => "codegen",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler-emitted text tagged with where it came from.
///
/// The text is opaque: it is rendered as-is and never parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Phase that produced the text.
    pub phase: Phase,
    /// What was being compiled (a module path, or `module::entry`).
    pub origin: String,
    /// Raw compiler output.
    pub text: String,
}

impl Diagnostic {
    pub fn new(phase: Phase, origin: impl Into<String>, text: impl Into<String>) -> Self {
        Diagnostic {
            phase,
            origin: origin.into(),
            text: text.into(),
        }
    }

    /// Whether there is anything worth showing.
    ///
    /// Compilers commonly return a blob containing only whitespace or a
    /// trailing NUL when they have nothing to say.
    pub fn is_empty(&self) -> bool {
        self.text.trim_matches(|c: char| c.is_whitespace() || c == '\0').is_empty()
    }

    /// Lines of the payload, without trailing blank lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.trim_end_matches(['\n', '\r', '\0']).lines()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.phase, self.origin)?;
        for line in self.lines() {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
