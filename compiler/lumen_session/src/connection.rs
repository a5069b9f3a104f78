//! The global session: one compiler connection per thread.

use std::cell::RefCell;
use std::marker::PhantomData;

use lumen_diagnostic::{DiagnosticSink, Phase};

use crate::backend::reference::ReferenceBackend;
use crate::backend::Backend;
use crate::context::{CompilationContext, ContextDesc, ContextId};
use crate::errors::{ConfigurationError, ConnectionError};
use crate::target::Profile;
use crate::thread::ThreadToken;

/// Thread-bound handle to the compiler capability.
///
/// Owns the backend and the diagnostics sink. Contexts borrow the
/// connection, so none can outlive it. Not `Send` or `Sync`: create one per
/// thread that compiles.
pub struct CompilerConnection<B: Backend> {
    backend: B,
    sink: RefCell<DiagnosticSink>,
    token: ThreadToken,
    _not_send: PhantomData<*const ()>,
}

impl CompilerConnection<ReferenceBackend> {
    /// Connection to the built-in reference backend.
    pub fn reference() -> Result<Self, ConnectionError> {
        Self::new(ReferenceBackend::new())
    }
}

impl<B: Backend> CompilerConnection<B> {
    /// Connect with diagnostics going to `tracing`, enabled in debug builds.
    pub fn new(backend: B) -> Result<Self, ConnectionError> {
        Self::with_sink(backend, DiagnosticSink::default())
    }

    /// Connect with an explicit diagnostics sink.
    pub fn with_sink(mut backend: B, sink: DiagnosticSink) -> Result<Self, ConnectionError> {
        backend
            .initialize()
            .map_err(|reason| ConnectionError::Initialization {
                backend: backend.name().to_string(),
                reason,
            })?;
        tracing::debug!(backend = backend.name(), "compiler connection created");

        Ok(CompilerConnection {
            backend,
            sink: RefCell::new(sink),
            token: ThreadToken::current(),
            _not_send: PhantomData,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn thread_token(&self) -> ThreadToken {
        self.token
    }

    /// Look up a profile by name through the backend.
    pub fn find_profile(&self, name: &str) -> Option<Profile> {
        self.assert_owner();
        self.backend.find_profile(name)
    }

    /// Build a compilation context for a fixed set of targets.
    ///
    /// Fails if there are no targets or the backend rejects any of them.
    pub fn create_context(
        &self,
        desc: ContextDesc,
    ) -> Result<CompilationContext<'_, B>, ConfigurationError> {
        self.assert_owner();

        if desc.targets.is_empty() {
            return Err(ConfigurationError::NoTargets);
        }
        for (index, target) in desc.targets.iter().enumerate() {
            self.backend
                .check_target(target)
                .map_err(|reason| ConfigurationError::UnsupportedTarget {
                    index,
                    format: target.format(),
                    profile: target.profile().clone(),
                    backend: self.backend.name().to_string(),
                    reason,
                })?;
        }

        let id = ContextId::fresh();
        tracing::debug!(
            context = %id,
            targets = desc.targets.len(),
            search_paths = desc.search_paths.len(),
            "compilation context created"
        );
        Ok(CompilationContext::new(self, id, desc))
    }

    /// Total diagnostics that reached the sink's emitter.
    pub fn diagnostics_reported(&self) -> usize {
        self.sink.borrow().reported()
    }

    /// Flush the sink's emitter.
    pub fn flush_diagnostics(&self) {
        self.sink.borrow_mut().flush();
    }

    pub(crate) fn report(&self, phase: Phase, origin: &str, text: &str) {
        self.sink.borrow_mut().report(phase, origin, text);
    }

    #[track_caller]
    pub(crate) fn assert_owner(&self) {
        self.token.assert_current("compiler connection");
    }
}

impl<B: Backend> std::fmt::Debug for CompilerConnection<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerConnection")
            .field("backend", &self.backend.name())
            .field("sink", &self.sink)
            .field("token", &self.token)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Compiled, EntryPointInfo};
    use crate::identity::ModuleIdentity;
    use crate::target::{OutputFormat, TargetConfig};

    struct Unavailable;

    impl Backend for Unavailable {
        type Module = ();
        type Program = ();

        fn name(&self) -> &str {
            "unavailable"
        }

        fn initialize(&mut self) -> Result<(), String> {
            Err("runtime library not found".to_string())
        }

        fn find_profile(&self, _: &str) -> Option<Profile> {
            None
        }

        fn check_target(&self, _: &TargetConfig) -> Result<(), String> {
            Ok(())
        }

        fn parse(&self, _: &ModuleIdentity) -> Compiled<()> {
            Compiled::failed("")
        }

        fn entry_points(&self, _: &()) -> Vec<EntryPointInfo> {
            Vec::new()
        }

        fn imports(&self, _: &()) -> Vec<String> {
            Vec::new()
        }

        fn link(
            &self,
            _: &EntryPointInfo,
            _: &(),
            _: &[&()],
            _: &[TargetConfig],
        ) -> Compiled<()> {
            Compiled::failed("")
        }

        fn generate(&self, _: &(), _: &TargetConfig) -> Compiled<Vec<u8>> {
            Compiled::failed("")
        }
    }

    fn spirv() -> TargetConfig {
        TargetConfig::new(OutputFormat::Spirv, Profile::new("spirv_1_5"))
    }

    #[test]
    fn test_initialization_failure_is_connection_error() {
        let err = CompilerConnection::new(Unavailable).err().unwrap();
        assert_eq!(
            err.to_string(),
            "failed to initialize compiler backend 'unavailable': runtime library not found"
        );
    }

    #[test]
    fn test_context_requires_a_target() {
        let connection = CompilerConnection::reference().unwrap();
        let err = connection.create_context(ContextDesc::default()).err().unwrap();
        assert_eq!(err, ConfigurationError::NoTargets);
    }

    #[test]
    fn test_unsupported_target_is_configuration_error() {
        let connection = CompilerConnection::reference().unwrap();
        let bad = TargetConfig::new(OutputFormat::Dxil, Profile::new("spirv_1_5"));
        let err = connection
            .create_context(ContextDesc::new(spirv()).with_target(bad))
            .err()
            .unwrap();
        match err {
            ConfigurationError::UnsupportedTarget { index, format, .. } => {
                assert_eq!(index, 1);
                assert_eq!(format, OutputFormat::Dxil);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_contexts_get_distinct_ids() {
        let connection = CompilerConnection::reference().unwrap();
        let a = connection.create_context(ContextDesc::new(spirv())).unwrap();
        let b = connection.create_context(ContextDesc::new(spirv())).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_find_profile_delegates() {
        let connection = CompilerConnection::reference().unwrap();
        assert_eq!(
            connection.find_profile("spirv_1_4"),
            Some(Profile::new("spirv_1_4"))
        );
        assert_eq!(connection.find_profile("spirv_7_0"), None);
    }

    #[test]
    fn test_each_thread_gets_its_own_connection() {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                std::thread::spawn(|| {
                    let connection = CompilerConnection::reference().unwrap();
                    assert!(connection.thread_token().is_current());
                    connection.create_context(ContextDesc::new(spirv())).is_ok()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
