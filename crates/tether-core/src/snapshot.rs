#![forbid(unsafe_code)]

//! Read-only, versioned views of store state.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// One immutable version of the global state.
///
/// Snapshots are cheap to clone (a reference count bump) and never observe
/// later updates: the store replaces its state wholesale instead of mutating
/// it, so a snapshot taken at the start of a render pass stays consistent for
/// the whole pass.
pub struct Snapshot<S> {
    version: u64,
    state: Rc<S>,
}

impl<S> Snapshot<S> {
    pub(crate) fn new(version: u64, state: Rc<S>) -> Self {
        Self { version, state }
    }

    /// Version counter of the store when this snapshot was current.
    ///
    /// Starts at 0 for the initial state and increases by one per update.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Shared handle to the underlying state value.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &Rc<S> {
        &self.state
    }

    /// Whether both snapshots point at the same state allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            state: Rc::clone(&self.state),
        }
    }
}

impl<S> Deref for Snapshot<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

impl<S: fmt::Debug> fmt::Debug for Snapshot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("version", &self.version)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_state() {
        let a = Snapshot::new(3, Rc::new(String::from("hello")));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(b.version(), 3);
        assert_eq!(&*b, "hello");
    }

    #[test]
    fn distinct_allocations_are_not_ptr_eq() {
        let a = Snapshot::new(1, Rc::new(5));
        let b = Snapshot::new(1, Rc::new(5));
        assert!(!a.ptr_eq(&b));
        assert_eq!(*a, *b);
    }
}
