use super::*;
use crate::CaptureEmitter;
use pretty_assertions::assert_eq;

fn capturing(config: SinkConfig) -> (DiagnosticSink, CaptureEmitter) {
    let capture = CaptureEmitter::new();
    (DiagnosticSink::with_emitter(config, capture.clone()), capture)
}

#[test]
fn empty_text_is_not_reported() {
    let (mut sink, capture) = capturing(SinkConfig::enabled());
    assert!(!sink.report(Phase::Load, "a.lsl", ""));
    assert!(!sink.report(Phase::Link, "a.lsl", "\n\n"));
    assert!(capture.is_empty());
    assert_eq!(sink.reported(), 0);
}

#[test]
fn non_empty_text_is_reported() {
    let (mut sink, capture) = capturing(SinkConfig::enabled());
    assert!(sink.report(Phase::Link, "a.lsl::main", "a.lsl:4: error: unresolved symbol"));
    assert_eq!(sink.reported(), 1);

    let captured = capture.diagnostics();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].phase, Phase::Link);
    assert_eq!(captured[0].origin, "a.lsl::main");
}

#[test]
fn disabled_sink_drops_everything() {
    let (mut sink, capture) = capturing(SinkConfig::silent());
    assert!(!sink.report(Phase::CodeGen, "a.lsl", "error: boom"));
    assert!(!sink.report_diagnostic(&Diagnostic::new(Phase::Load, "a", "b")));
    assert!(capture.is_empty());
    assert!(!sink.is_enabled());
}

#[test]
fn default_follows_build_profile() {
    assert_eq!(SinkConfig::default().enabled, cfg!(debug_assertions));
}
