use std::cell::RefCell;
use std::rc::Rc;

use crate::Diagnostic;

use super::DiagnosticEmitter;

/// Keeps every emitted diagnostic in memory.
///
/// Clones share the same buffer, so a test can hand one clone to a sink and
/// read back through the other.
#[derive(Clone, Debug, Default)]
pub struct CaptureEmitter {
    captured: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CaptureEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything captured so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.captured.borrow().clone()
    }

    /// Remove and return everything captured so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.captured.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.captured.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.borrow().is_empty()
    }
}

impl DiagnosticEmitter for CaptureEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.captured.borrow_mut().push(diagnostic.clone());
    }
}
