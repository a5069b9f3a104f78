//! Compilation contexts: fixed targets plus a module cache.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use lumen_diagnostic::Phase;

use crate::backend::Backend;
use crate::cache::{CacheStats, LoadedModule, ModuleCache, ModuleHandle};
use crate::connection::CompilerConnection;
use crate::errors::ModuleLoadError;
use crate::identity::ModuleIdentity;
use crate::resolver::ModuleResolver;
use crate::target::TargetConfig;

static NEXT_CONTEXT: AtomicU32 = AtomicU32::new(1);

/// Process-unique id of a compilation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u32);

impl ContextId {
    pub(crate) fn fresh() -> Self {
        ContextId(NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn new(raw: u32) -> Self {
        ContextId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Settings a context is built from.
///
/// ```text
/// ContextDesc::new(TargetConfig::new(OutputFormat::Spirv, Profile::new("spirv_1_5")))
///     .with_search_path("/opt/shaders/include")
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextDesc {
    pub(crate) targets: Vec<TargetConfig>,
    pub(crate) search_paths: Vec<PathBuf>,
}

impl ContextDesc {
    /// The common case: a single target.
    pub fn new(target: TargetConfig) -> Self {
        ContextDesc {
            targets: vec![target],
            search_paths: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetConfig) -> Self {
        self.targets.push(target);
        self
    }

    #[must_use]
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn targets(&self) -> &[TargetConfig] {
        &self.targets
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

/// A local session: immutable target settings and the modules loaded
/// under them.
///
/// Borrows its connection. Dropping the context drops its cache; a new
/// context with the same settings starts empty.
pub struct CompilationContext<'conn, B: Backend> {
    connection: &'conn CompilerConnection<B>,
    id: ContextId,
    targets: Vec<TargetConfig>,
    resolver: ModuleResolver,
    cache: RefCell<ModuleCache<B::Module>>,
}

impl<'conn, B: Backend> CompilationContext<'conn, B> {
    pub(crate) fn new(
        connection: &'conn CompilerConnection<B>,
        id: ContextId,
        desc: ContextDesc,
    ) -> Self {
        CompilationContext {
            connection,
            id,
            targets: desc.targets,
            resolver: ModuleResolver::with_search_paths(desc.search_paths),
            cache: RefCell::new(ModuleCache::default()),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn connection(&self) -> &'conn CompilerConnection<B> {
        self.connection
    }

    pub fn targets(&self) -> &[TargetConfig] {
        &self.targets
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Load a module, parsing it only if this context has not seen it.
    ///
    /// Parser output is reported to the connection's sink on the parsing
    /// call only; cache hits report nothing. A failed parse is not cached.
    pub fn load_module(
        &self,
        identity: &ModuleIdentity,
    ) -> Result<ModuleHandle<B::Module>, ModuleLoadError> {
        self.connection.assert_owner();

        let cached = self.cache.borrow_mut().lookup(identity);
        if let Some(module) = cached {
            tracing::trace!(context = %self.id, %identity, "module cache hit");
            return Ok(module);
        }

        tracing::debug!(context = %self.id, %identity, "module cache miss, parsing");
        let backend = self.connection.backend();
        let (parsed, diagnostics) = backend.parse(identity).into_parts();
        self.connection
            .report(Phase::Load, &identity.to_string(), &diagnostics);

        let Some(parsed) = parsed else {
            tracing::debug!(context = %self.id, %identity, "module failed to parse");
            return Err(ModuleLoadError {
                identity: identity.clone(),
                diagnostics,
            });
        };

        let module = Rc::new(LoadedModule::new(
            identity.clone(),
            self.id,
            backend.entry_points(&parsed),
            backend.imports(&parsed),
            parsed,
        ));
        self.cache.borrow_mut().insert(Rc::clone(&module));
        Ok(module)
    }

    /// Resolve an import-style name (or a file path) and load it.
    ///
    /// Returns `Ok(None)` when nothing on disk matches.
    pub fn load_by_name(
        &self,
        name: &str,
        importer: Option<&ModuleIdentity>,
    ) -> Result<Option<ModuleHandle<B::Module>>, ModuleLoadError> {
        match self.resolver.resolve(name, importer) {
            Some(identity) => self.load_module(&identity).map(Some),
            None => Ok(None),
        }
    }

    /// Whether `identity` is already parsed in this context.
    pub fn is_cached(&self, identity: &ModuleIdentity) -> bool {
        self.cache.borrow().contains(identity)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }
}

impl<B: Backend> fmt::Debug for CompilationContext<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationContext")
            .field("id", &self.id)
            .field("targets", &self.targets)
            .field("resolver", &self.resolver)
            .field("cache", &self.cache_stats())
            .finish_non_exhaustive()
    }
}
