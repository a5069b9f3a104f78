//! Profile table for the reference backend.
//!
//! Profiles are named `<family>_<major>_<minor>` (`spirv_1_5`, `sm_6_5`,
//! `metal_3_0`), plus `glsl_450`/`glsl_460` and the versionless `wgsl`.

use std::fmt;

use crate::target::OutputFormat;

use super::syntax::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Family {
    Spirv,
    Glsl,
    ShaderModel,
    Metal,
    Wgsl,
}

/// A parsed, known profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ProfileSpec {
    pub(crate) family: Family,
    pub(crate) version: (u32, u32),
}

/// Every profile the reference backend accepts, for listings.
pub const KNOWN_PROFILES: &[&str] = &[
    "spirv_1_0",
    "spirv_1_1",
    "spirv_1_2",
    "spirv_1_3",
    "spirv_1_4",
    "spirv_1_5",
    "spirv_1_6",
    "glsl_450",
    "glsl_460",
    "sm_5_0",
    "sm_5_1",
    "sm_6_0",
    "sm_6_1",
    "sm_6_2",
    "sm_6_3",
    "sm_6_4",
    "sm_6_5",
    "sm_6_6",
    "sm_6_7",
    "metal_2_0",
    "metal_2_1",
    "metal_2_2",
    "metal_2_3",
    "metal_2_4",
    "metal_3_0",
    "metal_3_1",
    "wgsl",
];

impl ProfileSpec {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        if !KNOWN_PROFILES.contains(&name) {
            return None;
        }
        if name == "wgsl" {
            return Some(ProfileSpec {
                family: Family::Wgsl,
                version: (0, 0),
            });
        }
        if let Some(version) = name.strip_prefix("glsl_") {
            let number: u32 = version.parse().ok()?;
            return Some(ProfileSpec {
                family: Family::Glsl,
                version: (number / 100, number % 100),
            });
        }

        let (family, rest) = if let Some(rest) = name.strip_prefix("spirv_") {
            (Family::Spirv, rest)
        } else if let Some(rest) = name.strip_prefix("sm_") {
            (Family::ShaderModel, rest)
        } else {
            (Family::Metal, name.strip_prefix("metal_")?)
        };
        let (major, minor) = rest.split_once('_')?;
        Some(ProfileSpec {
            family,
            version: (major.parse().ok()?, minor.parse().ok()?),
        })
    }

    /// Whether a format can be produced at this profile.
    pub(crate) fn accepts(self, format: OutputFormat) -> bool {
        match format {
            OutputFormat::Spirv => matches!(self.family, Family::Spirv | Family::Glsl),
            OutputFormat::Dxil => self.family == Family::ShaderModel && self.version.0 >= 6,
            OutputFormat::Dxbc => self.family == Family::ShaderModel && self.version.0 == 5,
            OutputFormat::Metal => self.family == Family::Metal,
            OutputFormat::Wgsl => self.family == Family::Wgsl,
        }
    }

    /// Lowest profile of this family that provides `cap`, if the family
    /// needs a minimum at all.
    pub(crate) fn minimum_for(self, cap: Capability) -> Option<ProfileSpec> {
        let version = match (self.family, cap) {
            (Family::Spirv, Capability::Subgroups) => (1, 3),
            (Family::Spirv, Capability::RayTracing | Capability::MeshShading) => (1, 4),
            (
                Family::Glsl,
                Capability::Subgroups | Capability::RayTracing | Capability::MeshShading,
            ) => (4, 60),
            (Family::ShaderModel, Capability::Int64 | Capability::Subgroups) => (6, 0),
            (Family::ShaderModel, Capability::RayTracing) => (6, 3),
            (Family::ShaderModel, Capability::MeshShading) => (6, 5),
            (Family::Metal, Capability::Subgroups) => (2, 1),
            (Family::Metal, Capability::RayTracing) => (2, 3),
            (Family::Metal, Capability::MeshShading) => (3, 0),
            _ => return None,
        };
        Some(ProfileSpec {
            family: self.family,
            version,
        })
    }

    pub(crate) fn satisfies(self, minimum: ProfileSpec) -> bool {
        self.version >= minimum.version
    }
}

impl fmt::Display for ProfileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.version;
        match self.family {
            Family::Spirv => write!(f, "spirv_{major}_{minor}"),
            Family::Glsl => write!(f, "glsl_{}", major * 100 + minor),
            Family::ShaderModel => write!(f, "sm_{major}_{minor}"),
            Family::Metal => write!(f, "metal_{major}_{minor}"),
            Family::Wgsl => f.write_str("wgsl"),
        }
    }
}

/// Whether a bytecode format can express a capability at any profile.
pub(crate) fn format_provides(format: OutputFormat, cap: Capability) -> bool {
    match format {
        OutputFormat::Spirv | OutputFormat::Dxil => true,
        OutputFormat::Dxbc => cap == Capability::Float64,
        OutputFormat::Metal => cap != Capability::Float64,
        OutputFormat::Wgsl => false,
    }
}

/// Whether a format supports scalar (C-like) buffer layout.
pub(crate) fn format_supports_scalar_layout(format: OutputFormat) -> bool {
    matches!(
        format,
        OutputFormat::Spirv | OutputFormat::Dxil | OutputFormat::Metal
    )
}
