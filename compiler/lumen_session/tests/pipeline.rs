//! End-to-end pipeline tests through the public API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;

use lumen_diagnostic::CaptureEmitter;
use lumen_session::testing::{write_module_identity, CountingBackend};
use lumen_session::{
    CompilerConnection, ContextDesc, DiagnosticSink, EmitError, EmitFlags, Error, LinkError,
    MatrixLayout, ModuleIdentity, OutputFormat, Phase, Profile, ReferenceBackend, SinkConfig,
    TargetConfig,
};
use pretty_assertions::assert_eq;

const MESH: &str = r#"
import lighting;

[shader("vertex")]
fn VertexMain(position: float3) { emit(transform(position)); }

[shader("fragment")]
fn FragmentMain(normal: float3) { output(shade(normal)); }

extern fn shade(normal: float3);
"#;

const LIGHTING: &str = r#"
fn shade(normal: float3) { return dot(normal, light); }
"#;

fn column_major() -> TargetConfig {
    TargetConfig::new(OutputFormat::Spirv, Profile::new("spirv_1_5"))
        .with_matrix_layout(MatrixLayout::ColumnMajor)
}

fn connection() -> CompilerConnection<CountingBackend<ReferenceBackend>> {
    CompilerConnection::with_sink(
        CountingBackend::reference(),
        DiagnosticSink::new(SinkConfig::enabled()),
    )
    .unwrap()
}

#[test]
fn vertex_main_compiles_with_empty_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    write_module_identity(dir.path(), "lighting.lsl", LIGHTING).unwrap();
    let mesh = write_module_identity(dir.path(), "mesh.lsl", MESH).unwrap();

    let connection = connection();
    let context = connection
        .create_context(ContextDesc::new(column_major()))
        .unwrap();
    let module = context.load_module(&mesh).unwrap();

    let output = context.emit(&module, "VertexMain", 0).unwrap();
    assert!(output.bytecode.len() > 0);
    assert!(output.diagnostics.is_empty());

    let missing = context.emit(&module, "Nonexistent", 0).unwrap_err();
    match missing {
        EmitError::Entrypoint(err) => assert_eq!(err.name, "Nonexistent"),
        other => panic!("expected an entry point error, got {other}"),
    }
}

#[test]
fn same_identity_parses_once() {
    let dir = tempfile::tempdir().unwrap();
    write_module_identity(dir.path(), "lighting.lsl", LIGHTING).unwrap();
    let mesh = write_module_identity(dir.path(), "mesh.lsl", MESH).unwrap();

    let connection = connection();
    let context = connection
        .create_context(ContextDesc::new(column_major()))
        .unwrap();

    // A second spelling of the same file resolves to the same identity.
    let dotted = dir.path().join("sub/../mesh.lsl");
    std::fs::create_dir_all(dir.path().join("sub")).unwrap();
    let again = ModuleIdentity::canonicalize(dotted).unwrap();
    assert_eq!(again, mesh);

    let first = context.load_module(&mesh).unwrap();
    let second = context.load_module(&again).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(connection.backend().parses_of(&mesh), 1);
}

#[test]
fn equal_basenames_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_module_identity(
        dir.path(),
        "a/common.lsl",
        "[shader(\"vertex\")]\nfn FromA() { a(); }\n",
    )
    .unwrap();
    let b = write_module_identity(
        dir.path(),
        "b/common.lsl",
        "[shader(\"vertex\")]\nfn FromB() { b(); }\n",
    )
    .unwrap();

    let connection = connection();
    let context = connection
        .create_context(ContextDesc::new(column_major()))
        .unwrap();
    let module_a = context.load_module(&a).unwrap();
    let module_b = context.load_module(&b).unwrap();

    assert!(!Rc::ptr_eq(&module_a, &module_b));
    assert!(module_a.entry_point("FromA").is_some());
    assert!(module_b.entry_point("FromB").is_some());
    assert_eq!(connection.backend().parses(), 2);
}

#[test]
fn unresolved_import_produces_no_blob() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = write_module_identity(dir.path(), "mesh.lsl", MESH).unwrap();

    let connection = connection();
    let context = connection
        .create_context(ContextDesc::new(column_major()))
        .unwrap();
    let module = context.load_module(&mesh).unwrap();

    let err = context.emit(&module, "VertexMain", 0).unwrap_err();
    assert!(matches!(
        err,
        EmitError::Link(LinkError::UnresolvedImport { ref import, .. }) if import == "lighting"
    ));
    assert_eq!(connection.backend().generates(), 0);
}

#[test]
fn repeated_emit_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_module_identity(dir.path(), "lighting.lsl", LIGHTING).unwrap();
    let mesh = write_module_identity(dir.path(), "mesh.lsl", MESH).unwrap();

    let connection = connection();
    let context = connection
        .create_context(ContextDesc::new(column_major()))
        .unwrap();
    let module = context.load_module(&mesh).unwrap();

    let first = context.emit(&module, "FragmentMain", 0).unwrap();
    let second = context.emit(&module, "FragmentMain", 0).unwrap();
    assert_eq!(first.bytecode.as_bytes(), second.bytecode.as_bytes());
}

#[test]
fn new_context_misses_the_cache_again() {
    let dir = tempfile::tempdir().unwrap();
    write_module_identity(dir.path(), "lighting.lsl", LIGHTING).unwrap();
    let mesh = write_module_identity(dir.path(), "mesh.lsl", MESH).unwrap();

    let connection = connection();
    let first_bytes = {
        let context = connection
            .create_context(ContextDesc::new(column_major()))
            .unwrap();
        let module = context.load_module(&mesh).unwrap();
        context.emit(&module, "VertexMain", 0).unwrap().bytecode
    };

    let context = connection
        .create_context(ContextDesc::new(column_major()))
        .unwrap();
    assert!(!context.is_cached(&mesh));
    let module = context.load_module(&mesh).unwrap();
    let second_bytes = context.emit(&module, "VertexMain", 0).unwrap().bytecode;

    assert_eq!(connection.backend().parses_of(&mesh), 2);
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn layout_and_flags_change_the_output() {
    let dir = tempfile::tempdir().unwrap();
    write_module_identity(dir.path(), "lighting.lsl", LIGHTING).unwrap();
    let mesh = write_module_identity(dir.path(), "mesh.lsl", MESH).unwrap();

    let connection = connection();
    let desc = ContextDesc::new(column_major())
        .with_target(column_major().with_matrix_layout(MatrixLayout::RowMajor))
        .with_target(column_major().with_flags(EmitFlags::EMIT_DIRECTLY | EmitFlags::DEBUG_INFO));
    let context = connection.create_context(desc).unwrap();
    let module = context.load_module(&mesh).unwrap();

    let base = context.emit(&module, "VertexMain", 0).unwrap().bytecode;
    let row_major = context.emit(&module, "VertexMain", 1).unwrap().bytecode;
    let debug = context.emit(&module, "VertexMain", 2).unwrap().bytecode;

    assert_ne!(base, row_major);
    assert!(debug.len() > base.len());
}

#[test]
fn sink_sees_failures_before_errors_return() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_module_identity(dir.path(), "broken.lsl", "fn Broken() {\n").unwrap();

    let capture = CaptureEmitter::new();
    let connection = CompilerConnection::with_sink(
        ReferenceBackend::new(),
        DiagnosticSink::with_emitter(SinkConfig::enabled(), capture.clone()),
    )
    .unwrap();
    let context = connection
        .create_context(ContextDesc::new(column_major()))
        .unwrap();

    let err = context.load_module(&broken).unwrap_err();
    let reported = capture.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].phase, Phase::Load);
    assert_eq!(reported[0].text, err.diagnostics);
}

#[test]
fn errors_aggregate_into_crate_error() {
    fn compile(path: &std::path::Path) -> Result<usize, Error> {
        let connection = CompilerConnection::reference()?;
        let context = connection.create_context(ContextDesc::new(column_major()))?;
        let identity = ModuleIdentity::canonicalize(path)?;
        let module = context.load_module(&identity)?;
        let output = context.emit(&module, "VertexMain", 0)?;
        Ok(output.bytecode.len())
    }

    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        compile(&dir.path().join("missing.lsl")),
        Err(Error::Identity(_))
    ));

    let path = lumen_session::testing::write_module(
        dir.path(),
        "ok.lsl",
        "[shader(\"vertex\")]\nfn VertexMain() { emit(); }\n",
    )
    .unwrap();
    assert!(compile(&path).unwrap() > 0);
}

#[test]
fn unsupported_profile_is_a_configuration_error() {
    let connection = CompilerConnection::reference().unwrap();
    let target = TargetConfig::new(OutputFormat::Metal, Profile::new("sm_6_5"));
    let err = connection
        .create_context(ContextDesc::new(target))
        .unwrap_err();
    assert!(err.to_string().contains("metal_2_0"));
}
