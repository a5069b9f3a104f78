//! The `targets` command: list output formats and their profiles.

use std::fmt::Write;

use lumen_session::{OutputFormat, ReferenceBackend};

/// Profile used when `--profile` is not given.
pub fn default_profile(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Spirv => "spirv_1_5",
        OutputFormat::Dxil => "sm_6_5",
        OutputFormat::Dxbc => "sm_5_1",
        OutputFormat::Metal => "metal_2_4",
        OutputFormat::Wgsl => "wgsl",
    }
}

/// Render every format with its accepted profiles, default marked.
pub fn list_targets() -> String {
    let mut out = String::from("Supported targets:\n");
    for format in OutputFormat::ALL {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {format} (.{})", format.extension());
        let default = default_profile(format);
        for profile in ReferenceBackend::profiles_for(format) {
            if profile == default {
                let _ = writeln!(out, "    {profile} (default)");
            } else {
                let _ = writeln!(out, "    {profile}");
            }
        }
    }
    out
}
