use super::*;
use pretty_assertions::assert_eq;

#[test]
fn relative_path_is_rejected() {
    let err = ModuleIdentity::new("shaders/mesh.lsl").unwrap_err();
    assert!(matches!(err, IdentityError::NotAbsolute(_)));
}

#[cfg(unix)]
#[test]
fn dot_components_are_folded() {
    let a = ModuleIdentity::new("/project/shaders/./lib/../mesh.lsl").unwrap();
    let b = ModuleIdentity::new("/project/shaders/mesh.lsl").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.path(), Path::new("/project/shaders/mesh.lsl"));
}

#[cfg(unix)]
#[test]
fn parent_of_root_stays_at_root() {
    let id = ModuleIdentity::new("/../../mesh.lsl").unwrap();
    assert_eq!(id.path(), Path::new("/mesh.lsl"));
}

#[cfg(unix)]
#[test]
fn same_basename_in_different_directories_differs() {
    let a = ModuleIdentity::new("/project/a/common.lsl").unwrap();
    let b = ModuleIdentity::new("/project/b/common.lsl").unwrap();
    assert_ne!(a, b);
    assert_eq!(a.stem(), b.stem());
}

#[cfg(unix)]
#[test]
fn directory_and_display() {
    let id = ModuleIdentity::new("/project/shaders/mesh.lsl").unwrap();
    assert_eq!(id.directory(), Path::new("/project/shaders"));
    assert_eq!(id.to_string(), "/project/shaders/mesh.lsl");
    assert_eq!(id.stem(), "mesh");
}

#[test]
fn canonicalize_requires_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.lsl");
    let err = ModuleIdentity::canonicalize(&missing).unwrap_err();
    assert!(matches!(err, IdentityError::Unreadable { .. }));

    let present = dir.path().join("present.lsl");
    std::fs::write(&present, "").unwrap();
    let id = ModuleIdentity::canonicalize(&present).unwrap();
    assert!(id.path().is_absolute());
    assert_eq!(id.stem(), "present");
}

#[cfg(unix)]
#[test]
fn new_resolves_symlinked_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("real")).unwrap();
    std::fs::write(dir.path().join("real/a.lsl"), "").unwrap();
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

    let through_link = ModuleIdentity::new(dir.path().join("link/a.lsl")).unwrap();
    let direct = ModuleIdentity::canonicalize(dir.path().join("real/a.lsl")).unwrap();
    assert_eq!(through_link, direct);
}

#[test]
fn new_agrees_with_canonicalize_for_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("mesh.lsl"), "").unwrap();

    let spelled = ModuleIdentity::new(dir.path().join("sub/../mesh.lsl")).unwrap();
    let canonical = ModuleIdentity::canonicalize(dir.path().join("mesh.lsl")).unwrap();
    assert_eq!(spelled, canonical);
}
