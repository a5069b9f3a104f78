//! Test support: an instrumented backend and on-disk module fixtures.
//!
//! Used by this crate's tests and by downstream crates that want to assert
//! on how often the compiler was actually invoked.

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::backend::reference::ReferenceBackend;
use crate::backend::{Backend, Compiled, EntryPointInfo};
use crate::identity::ModuleIdentity;
use crate::target::{Profile, TargetConfig};

/// Wraps a backend and counts calls into it.
#[derive(Debug, Default)]
pub struct CountingBackend<B> {
    inner: B,
    parses: RefCell<FxHashMap<ModuleIdentity, usize>>,
    links: Cell<usize>,
    generates: Cell<usize>,
}

impl CountingBackend<ReferenceBackend> {
    pub fn reference() -> Self {
        Self::new(ReferenceBackend::new())
    }
}

impl<B> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        CountingBackend {
            inner,
            parses: RefCell::new(FxHashMap::default()),
            links: Cell::new(0),
            generates: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Total parse calls.
    pub fn parses(&self) -> usize {
        self.parses.borrow().values().sum()
    }

    /// Parse calls for one identity.
    pub fn parses_of(&self, identity: &ModuleIdentity) -> usize {
        self.parses.borrow().get(identity).copied().unwrap_or(0)
    }

    pub fn links(&self) -> usize {
        self.links.get()
    }

    pub fn generates(&self) -> usize {
        self.generates.get()
    }
}

impl<B: Backend> Backend for CountingBackend<B> {
    type Module = B::Module;
    type Program = B::Program;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(&mut self) -> Result<(), String> {
        self.inner.initialize()
    }

    fn find_profile(&self, name: &str) -> Option<Profile> {
        self.inner.find_profile(name)
    }

    fn check_target(&self, target: &TargetConfig) -> Result<(), String> {
        self.inner.check_target(target)
    }

    fn parse(&self, identity: &ModuleIdentity) -> Compiled<Self::Module> {
        *self.parses.borrow_mut().entry(identity.clone()).or_default() += 1;
        self.inner.parse(identity)
    }

    fn entry_points(&self, module: &Self::Module) -> Vec<EntryPointInfo> {
        self.inner.entry_points(module)
    }

    fn imports(&self, module: &Self::Module) -> Vec<String> {
        self.inner.imports(module)
    }

    fn link(
        &self,
        entry: &EntryPointInfo,
        root: &Self::Module,
        imports: &[&Self::Module],
        targets: &[TargetConfig],
    ) -> Compiled<Self::Program> {
        self.links.set(self.links.get() + 1);
        self.inner.link(entry, root, imports, targets)
    }

    fn generate(&self, program: &Self::Program, target: &TargetConfig) -> Compiled<Vec<u8>> {
        self.generates.set(self.generates.get() + 1);
        self.inner.generate(program, target)
    }
}

/// Write `source` to `dir/rel`, creating parent directories.
pub fn write_module(dir: &Path, rel: &str, source: &str) -> io::Result<PathBuf> {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, source)?;
    Ok(path)
}

/// Write a module and return its canonical identity.
pub fn write_module_identity(dir: &Path, rel: &str, source: &str) -> io::Result<ModuleIdentity> {
    let path = write_module(dir, rel, source)?;
    ModuleIdentity::canonicalize(&path).map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))
}
