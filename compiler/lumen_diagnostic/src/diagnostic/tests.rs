use super::*;
use pretty_assertions::assert_eq;

#[test]
fn empty_text_is_empty() {
    assert!(Diagnostic::new(Phase::Load, "a.lsl", "").is_empty());
    assert!(Diagnostic::new(Phase::Load, "a.lsl", "  \n").is_empty());
    assert!(Diagnostic::new(Phase::Link, "a.lsl", "\0").is_empty());
}

#[test]
fn text_with_content_is_not_empty() {
    let diag = Diagnostic::new(Phase::CodeGen, "a.lsl::main", "a.lsl:3: warning: unused");
    assert!(!diag.is_empty());
}

#[test]
fn display_indents_each_line() {
    let diag = Diagnostic::new(
        Phase::Link,
        "/shaders/mesh.lsl::VertexMain",
        "first\nsecond\n",
    );
    assert_eq!(
        diag.to_string(),
        "[link] /shaders/mesh.lsl::VertexMain\n  first\n  second\n"
    );
}

#[test]
fn phase_names() {
    assert_eq!(Phase::Load.as_str(), "load");
    assert_eq!(Phase::Link.as_str(), "link");
    assert_eq!(Phase::CodeGen.to_string(), "codegen");
}
