#![forbid(unsafe_code)]

//! Render scheduling queue.
//!
//! Store listeners never render. They push the id of the component that
//! needs a new render pass into a [`RenderQueue`]; the host drains the queue
//! when it chooses to flush.
//!
//! # Invariants
//!
//! - An id is present at most once; scheduling an already queued id is a no-op.
//! - Ids are drained in first-scheduled order.
//! - `cancel` removes an id without disturbing the order of the others.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use ahash::AHashSet;

/// Host-local identifier of a mounted component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
struct QueueInner {
    order: VecDeque<ComponentId>,
    queued: AHashSet<ComponentId>,
}

/// Shared FIFO of components awaiting a render pass.
///
/// Cloning shares the queue.
#[derive(Clone, Default)]
pub struct RenderQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl RenderQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `id`. Returns `false` if it was already waiting.
    pub fn schedule(&self, id: ComponentId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.queued.insert(id) {
            return false;
        }
        inner.order.push_back(id);
        true
    }

    /// Take the oldest scheduled id.
    pub fn pop(&self) -> Option<ComponentId> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.order.pop_front()?;
        inner.queued.remove(&id);
        Some(id)
    }

    /// Drop `id` from the queue if present.
    pub fn cancel(&self, id: ComponentId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.queued.remove(&id) {
            return false;
        }
        inner.order.retain(|queued| *queued != id);
        true
    }

    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.inner.borrow().queued.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().order.is_empty()
    }
}

impl fmt::Debug for RenderQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderQueue")
            .field("pending", &self.inner.borrow().order)
            .finish()
    }
}
