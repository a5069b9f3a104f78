use super::*;
use pretty_assertions::assert_eq;

#[test]
fn format_parse_accepts_aliases() {
    assert_eq!(OutputFormat::parse("spirv"), Some(OutputFormat::Spirv));
    assert_eq!(OutputFormat::parse("SPIR-V"), Some(OutputFormat::Spirv));
    assert_eq!(OutputFormat::parse("metallib"), Some(OutputFormat::Metal));
    assert_eq!(OutputFormat::parse("dxil"), Some(OutputFormat::Dxil));
    assert_eq!(OutputFormat::parse("glsl"), None);
    assert_eq!(OutputFormat::parse(""), None);
}

#[test]
fn format_names_round_trip() {
    for format in OutputFormat::ALL {
        assert_eq!(OutputFormat::parse(format.as_str()), Some(format));
    }
}

#[test]
fn target_defaults() {
    let target = TargetConfig::new(OutputFormat::Dxil, Profile::new("sm_6_5"));
    assert_eq!(target.format(), OutputFormat::Dxil);
    assert_eq!(target.profile().as_str(), "sm_6_5");
    assert_eq!(target.flags(), EmitFlags::EMIT_DIRECTLY);
    assert_eq!(target.matrix_layout(), MatrixLayout::ColumnMajor);
    assert!(!target.scalar_block_layout());
}

#[test]
fn target_builders_apply() {
    let target = TargetConfig::new(OutputFormat::Spirv, Profile::new("spirv_1_6"))
        .with_matrix_layout(MatrixLayout::RowMajor)
        .with_scalar_block_layout(true)
        .with_flags(EmitFlags::DEBUG_INFO);
    assert_eq!(target.matrix_layout(), MatrixLayout::RowMajor);
    assert!(target.scalar_block_layout());
    assert!(target.flags().contains(EmitFlags::DEBUG_INFO));
    assert!(!target.flags().contains(EmitFlags::EMIT_DIRECTLY));
    assert_eq!(target.to_string(), "spirv/spirv_1_6");
}

#[test]
fn configs_with_same_settings_are_equal() {
    let a = TargetConfig::new(OutputFormat::Wgsl, Profile::new("wgsl"));
    let b = TargetConfig::new(OutputFormat::Wgsl, Profile::new("wgsl"));
    assert_eq!(a, b);
    assert_ne!(a, b.with_matrix_layout(MatrixLayout::RowMajor));
}
