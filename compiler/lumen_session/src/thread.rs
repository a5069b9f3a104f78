//! Thread affinity for compiler connections.

use std::thread::{self, ThreadId};

/// Records the thread a connection was created on.
///
/// Native shader compilers keep per-session global state that must not be
/// touched from two threads. The connection types are already `!Send`, but
/// the token is checked at every entry point as well so a violation fails
/// loudly instead of corrupting compiler state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ThreadToken {
    owner: ThreadId,
}

impl ThreadToken {
    /// Bind a token to the calling thread.
    pub fn current() -> Self {
        ThreadToken {
            owner: thread::current().id(),
        }
    }

    pub fn owner(self) -> ThreadId {
        self.owner
    }

    /// Whether the calling thread is the owner.
    pub fn is_current(self) -> bool {
        thread::current().id() == self.owner
    }

    /// Panic unless called from the owning thread.
    ///
    /// Cross-thread use is a programming error, not a recoverable condition.
    #[track_caller]
    pub fn assert_current(self, what: &str) {
        if !self.is_current() {
            let caller = thread::current();
            panic!(
                "{what} is bound to thread {:?} but was used from thread {:?} ({})",
                self.owner,
                caller.id(),
                caller.name().unwrap_or("<unnamed>"),
            );
        }
    }
}
