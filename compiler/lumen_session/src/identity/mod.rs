//! Canonical module identity: the module cache key.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::errors::IdentityError;

/// Absolute, normalized path of a shader module.
///
/// Two requests for the same file resolve to equal identities; two files
/// that only share a basename never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleIdentity {
    path: PathBuf,
}

impl ModuleIdentity {
    /// Build an identity from an absolute path.
    ///
    /// An existing file resolves to its canonical path, so the result equals
    /// [`ModuleIdentity::canonicalize`] for the same file. A path that does
    /// not exist yet has `.` and `..` folded lexically.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(IdentityError::NotAbsolute(path.to_path_buf()));
        }
        let path = match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => normalize_path(path),
        };
        Ok(ModuleIdentity { path })
    }

    /// Build an identity from an existing file, resolving symlinks.
    pub fn canonicalize(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|source| IdentityError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ModuleIdentity { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the module, used for relative imports.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    /// File stem, used in rendered messages.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl AsRef<Path> for ModuleIdentity {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Normalize a path by resolving `.` and `..` components.
///
/// `..` at the root stays at the root.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !matches!(
                    result.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    result.pop();
                }
            }
            Component::CurDir => {}
            _ => result.push(component),
        }
    }
    result
}

#[cfg(test)]
mod tests;
