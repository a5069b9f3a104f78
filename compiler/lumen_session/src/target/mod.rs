//! Target Configuration
//!
//! Describes what a compilation context produces: the bytecode dialect,
//! the feature-level profile, and the layout conventions baked into the
//! generated code.
//!
//! # Usage
//!
//! ```
//! use lumen_session::{EmitFlags, MatrixLayout, OutputFormat, Profile, TargetConfig};
//!
//! let target = TargetConfig::new(OutputFormat::Spirv, Profile::new("spirv_1_5"))
//!     .with_matrix_layout(MatrixLayout::RowMajor)
//!     .with_scalar_block_layout(true)
//!     .with_flags(EmitFlags::EMIT_DIRECTLY | EmitFlags::DEBUG_INFO);
//!
//! assert_eq!(target.profile().as_str(), "spirv_1_5");
//! ```
//!
//! Whether a format/profile pair is actually supported is decided by the
//! backend when a context is created, not here.

use std::fmt;

/// Bytecode dialect produced for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    /// Khronos SPIR-V binary (Vulkan, OpenGL 4.6).
    Spirv,
    /// DirectX Intermediate Language (D3D12, shader model 6+).
    Dxil,
    /// Legacy DirectX bytecode (D3D11, shader model 5).
    Dxbc,
    /// Metal library.
    Metal,
    /// WebGPU shading language.
    Wgsl,
}

impl OutputFormat {
    /// Every format, in a stable order.
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Spirv,
        OutputFormat::Dxil,
        OutputFormat::Dxbc,
        OutputFormat::Metal,
        OutputFormat::Wgsl,
    ];

    /// Parse a format name as accepted on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spirv" | "spir-v" => Some(OutputFormat::Spirv),
            "dxil" => Some(OutputFormat::Dxil),
            "dxbc" => Some(OutputFormat::Dxbc),
            "metal" | "metallib" => Some(OutputFormat::Metal),
            "wgsl" => Some(OutputFormat::Wgsl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Spirv => "spirv",
            OutputFormat::Dxil => "dxil",
            OutputFormat::Dxbc => "dxbc",
            OutputFormat::Metal => "metal",
            OutputFormat::Wgsl => "wgsl",
        }
    }

    /// Typical file extension for emitted bytecode.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Spirv => "spv",
            OutputFormat::Dxil => "dxil",
            OutputFormat::Dxbc => "dxbc",
            OutputFormat::Metal => "metallib",
            OutputFormat::Wgsl => "wgsl",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature-level identifier, e.g. `spirv_1_5` or `sm_6_5`.
///
/// Opaque to this crate; backends interpret and validate it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Profile(String);

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Profile(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage convention for matrices in buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatrixLayout {
    RowMajor,
    #[default]
    ColumnMajor,
}

impl MatrixLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            MatrixLayout::RowMajor => "row-major",
            MatrixLayout::ColumnMajor => "column-major",
        }
    }
}

bitflags::bitflags! {
    /// Capability flags passed through to code generation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EmitFlags: u32 {
        /// Produce target bytecode directly rather than through textual source.
        const EMIT_DIRECTLY = 1;
        /// Keep function names and source locations in the output.
        const DEBUG_INFO = 1 << 1;
        /// Strip all names from the output.
        const OBFUSCATE = 1 << 2;
    }
}

/// One compilation target.
///
/// A value type: once a context is built from it, it never changes. Build a
/// new context to change any setting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetConfig {
    format: OutputFormat,
    profile: Profile,
    flags: EmitFlags,
    matrix_layout: MatrixLayout,
    scalar_block_layout: bool,
}

impl TargetConfig {
    /// Target with column-major matrices, standard block layout, and
    /// direct bytecode emission.
    pub fn new(format: OutputFormat, profile: Profile) -> Self {
        TargetConfig {
            format,
            profile,
            flags: EmitFlags::EMIT_DIRECTLY,
            matrix_layout: MatrixLayout::default(),
            scalar_block_layout: false,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: EmitFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_matrix_layout(mut self, layout: MatrixLayout) -> Self {
        self.matrix_layout = layout;
        self
    }

    #[must_use]
    pub fn with_scalar_block_layout(mut self, enabled: bool) -> Self {
        self.scalar_block_layout = enabled;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn flags(&self) -> EmitFlags {
        self.flags
    }

    pub fn matrix_layout(&self) -> MatrixLayout {
        self.matrix_layout
    }

    pub fn scalar_block_layout(&self) -> bool {
        self.scalar_block_layout
    }
}

impl fmt::Display for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.format, self.profile)
    }
}

#[cfg(test)]
mod tests;
