//! Per-context module cache.
//!
//! An owning map from identity to module. Entries are only ever added: a
//! parse failure leaves no trace, so loading the same identity again will
//! parse again.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::backend::EntryPointInfo;
use crate::context::ContextId;
use crate::identity::ModuleIdentity;

/// Shared handle to a cached module.
pub type ModuleHandle<M> = Rc<LoadedModule<M>>;

/// A parsed module, as stored in the cache.
///
/// Immutable once inserted. Remembers which context produced it so it
/// cannot be linked through another one.
pub struct LoadedModule<M> {
    identity: ModuleIdentity,
    context: ContextId,
    entry_points: Vec<EntryPointInfo>,
    imports: Vec<String>,
    module: M,
}

impl<M> LoadedModule<M> {
    pub(crate) fn new(
        identity: ModuleIdentity,
        context: ContextId,
        entry_points: Vec<EntryPointInfo>,
        imports: Vec<String>,
        module: M,
    ) -> Self {
        LoadedModule {
            identity,
            context,
            entry_points,
            imports,
            module,
        }
    }

    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn entry_points(&self) -> &[EntryPointInfo] {
        &self.entry_points
    }

    /// Find an exported entry point by exact name.
    pub fn entry_point(&self, name: &str) -> Option<&EntryPointInfo> {
        self.entry_points.iter().find(|e| e.name == name)
    }

    /// Logical import names, in source order.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// The backend's parsed representation.
    pub fn module(&self) -> &M {
        &self.module
    }
}

impl<M> fmt::Debug for LoadedModule<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("identity", &self.identity)
            .field("context", &self.context)
            .field("entry_points", &self.entry_points)
            .field("imports", &self.imports)
            .finish_non_exhaustive()
    }
}

/// Counters for cache behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

pub(crate) struct ModuleCache<M> {
    entries: FxHashMap<ModuleIdentity, ModuleHandle<M>>,
    hits: usize,
    misses: usize,
}

impl<M> Default for ModuleCache<M> {
    fn default() -> Self {
        ModuleCache {
            entries: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<M> ModuleCache<M> {
    /// Look up an identity, counting the hit or miss.
    pub(crate) fn lookup(&mut self, identity: &ModuleIdentity) -> Option<ModuleHandle<M>> {
        if let Some(found) = self.entries.get(identity) {
            self.hits += 1;
            Some(Rc::clone(found))
        } else {
            self.misses += 1;
            None
        }
    }

    pub(crate) fn insert(&mut self, module: ModuleHandle<M>) {
        let previous = self.entries.insert(module.identity.clone(), module);
        debug_assert!(previous.is_none(), "module parsed twice in one context");
    }

    pub(crate) fn contains(&self, identity: &ModuleIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
