//! Import name resolution.
//!
//! Maps a logical import name to a [`ModuleIdentity`]. Two forms:
//!
//! - Relative (`./lighting`, `../shared/noise`): resolved against the
//!   importing module's directory, or the working directory when there is
//!   no importer.
//! - Dotted (`common.math`): each segment becomes a directory level, tried
//!   under the importer's directory and then under each search path.
//!
//! Each base yields `<path>.lsl` then `<path>/mod.lsl`. The first candidate
//! that exists on disk wins.

use std::path::{Path, PathBuf};

use crate::identity::{normalize_path, ModuleIdentity};

/// File extension of shader modules.
pub const MODULE_EXTENSION: &str = "lsl";

const DIRECTORY_MODULE: &str = "mod.lsl";

/// Resolves import names against a list of search paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleResolver {
    search_paths: Vec<PathBuf>,
}

impl ModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_paths(search_paths: impl IntoIterator<Item = PathBuf>) -> Self {
        ModuleResolver {
            search_paths: search_paths.into_iter().collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Candidate paths for `name`, in priority order.
    pub fn candidates(&self, name: &str, importer: Option<&ModuleIdentity>) -> Vec<PathBuf> {
        if is_path_like(name) {
            let base = match importer {
                Some(identity) => identity.directory().join(name),
                None => std::env::current_dir()
                    .map(|cwd| cwd.join(name))
                    .unwrap_or_else(|_| PathBuf::from(name)),
            };
            return file_candidates(&normalize_path(&base));
        }

        let segments: Vec<&str> = name.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Vec::new();
        }

        let roots = importer
            .map(ModuleIdentity::directory)
            .into_iter()
            .chain(self.search_paths.iter().map(PathBuf::as_path));

        let mut candidates = Vec::new();
        for root in roots {
            let mut base = root.to_path_buf();
            base.extend(&segments);
            candidates.extend(file_candidates(&base));
        }
        candidates
    }

    /// Resolve `name` to the first candidate that exists.
    ///
    /// A candidate that exists but cannot be canonicalized ends the search;
    /// the I/O error is logged at debug level.
    pub fn resolve(&self, name: &str, importer: Option<&ModuleIdentity>) -> Option<ModuleIdentity> {
        let candidates = self.candidates(name, importer);
        let found = candidates
            .iter()
            .find(|path| path.is_file())
            .and_then(|path| match ModuleIdentity::canonicalize(path) {
                Ok(identity) => Some(identity),
                Err(err) => {
                    tracing::debug!(
                        name,
                        candidate = %path.display(),
                        error = %err,
                        "import candidate exists but cannot be resolved"
                    );
                    None
                }
            });

        match &found {
            Some(identity) => tracing::trace!(name, %identity, "import resolved"),
            None => tracing::trace!(name, searched = candidates.len(), "import not found"),
        }
        found
    }
}

fn is_path_like(name: &str) -> bool {
    let path = Path::new(name);
    name.starts_with("./")
        || name.starts_with("../")
        || path.is_absolute()
        || path
            .extension()
            .is_some_and(|ext| ext == MODULE_EXTENSION)
}

/// `<base>.lsl` then `<base>/mod.lsl`; a base that already names an
/// `.lsl` file is its own only candidate.
fn file_candidates(base: &Path) -> Vec<PathBuf> {
    if base
        .extension()
        .is_some_and(|ext| ext == MODULE_EXTENSION)
    {
        return vec![base.to_path_buf()];
    }

    let mut file = base.as_os_str().to_owned();
    file.push(".");
    file.push(MODULE_EXTENSION);
    vec![PathBuf::from(file), base.join(DIRECTORY_MODULE)]
}
