#![forbid(unsafe_code)]

//! Render context and positional hooks.
//!
//! Every render pass gets a [`RenderCx`] holding one store [`Snapshot`]
//! taken when the pass starts, so all hooks in the pass read the same state.
//!
//! # Selector hook
//!
//! [`RenderCx::use_selector_with`] derives a value from state and keeps it
//! in sync:
//!
//! ```text
//! Unsubscribed --first render--> Subscribed --unmount--> Unsubscribed
//!                                    |
//!                       notification | Recompute
//!                                    v
//!                          Unchanged | Changed --> RenderQueue::schedule
//! ```
//!
//! On a notification the listener recomputes the selection against the new
//! snapshot and compares it with the last value using the hook's equality
//! check. Only a difference schedules the owning component. During a render
//! the hook replaces its selector and equality with the ones passed in,
//! recomputes against the pass snapshot, and returns the latest value; an
//! equal result keeps the previous value.
//!
//! # Invariants
//!
//! 1. Hooks are identified by call position. The same position must hold the
//!    same hook kind and value type on every render, and every render must
//!    call as many hooks as the first one, otherwise the render panics.
//! 2. A selection is never recomputed twice for the same store version from
//!    a notification.
//! 3. Listeners never render; they only enqueue.
//! 4. Dropping the hook slots (unmount) drops every subscription they hold.
//! 5. A selection that changes outside a render marks its slots dirty until
//!    the owner checks them with `take_dirty`.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tether_core::{Equality, Identity, Snapshot, Store, Strict, Subscription};

use crate::queue::{ComponentId, RenderQueue};

/// Lifecycle of a component's store subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribed,
}

/// Result of recomputing a selection against a new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeOutcome {
    Unchanged,
    Changed,
}

struct HookSlot {
    kind: &'static str,
    value_type: &'static str,
    state: Box<dyn Any>,
}

/// Per-instance hook storage, owned by the host.
#[derive(Default)]
pub(crate) struct HookSlots {
    slots: Vec<HookSlot>,
    subscriptions: usize,
    dirty: Rc<Cell<bool>>,
}

impl HookSlots {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether a selection changed since the last call, clearing the mark.
    pub(crate) fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub(crate) fn subscription_state(&self) -> SubscriptionState {
        if self.subscriptions > 0 {
            SubscriptionState::Subscribed
        } else {
            SubscriptionState::Unsubscribed
        }
    }
}

impl fmt::Debug for HookSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().map(|slot| slot.kind))
            .finish()
    }
}

struct Selection<S, T> {
    selector: Box<dyn Fn(&S) -> T>,
    equality: Box<dyn Equality<T>>,
    value: T,
    version: u64,
}

impl<S, T> Selection<S, T> {
    fn recompute(&mut self, snapshot: &Snapshot<S>) -> RecomputeOutcome {
        let next = (self.selector)(snapshot);
        self.version = snapshot.version();
        if self.equality.equals(&self.value, &next) {
            RecomputeOutcome::Unchanged
        } else {
            self.value = next;
            RecomputeOutcome::Changed
        }
    }
}

struct SelectorSlot<S, T> {
    selection: Rc<RefCell<Selection<S, T>>>,
    _subscription: Subscription,
}

/// Context handed to [`Component::render`](crate::component::Component::render).
pub struct RenderCx<'a, S: 'static> {
    id: ComponentId,
    component: &'static str,
    store: &'a Store<S>,
    snapshot: Snapshot<S>,
    queue: &'a RenderQueue,
    hooks: &'a mut HookSlots,
    cursor: usize,
}

impl<'a, S: 'static> RenderCx<'a, S> {
    pub(crate) fn new(
        id: ComponentId,
        component: &'static str,
        store: &'a Store<S>,
        queue: &'a RenderQueue,
        hooks: &'a mut HookSlots,
    ) -> Self {
        Self {
            id,
            component,
            snapshot: store.get_state(),
            store,
            queue,
            hooks,
            cursor: 0,
        }
    }

    /// A context over `hooks` that shares this pass's id and snapshot.
    ///
    /// Used to render a wrapped component with slots of its own.
    pub(crate) fn scoped<'b>(&'b self, hooks: &'b mut HookSlots) -> RenderCx<'b, S> {
        RenderCx {
            id: self.id,
            component: self.component,
            store: self.store,
            snapshot: self.snapshot.clone(),
            queue: self.queue,
            hooks,
            cursor: 0,
        }
    }

    /// End the pass.
    ///
    /// # Panics
    ///
    /// Panics if the pass called fewer hooks than an earlier render did.
    pub(crate) fn finish(self) {
        if let Some(skipped) = self.hooks.slots.get(self.cursor) {
            missing_hooks(self.component, self.cursor, self.hooks.slots.len(), skipped);
        }
    }

    /// Id of the component being rendered.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The snapshot this render pass reads.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot<S> {
        &self.snapshot
    }

    /// Read state without subscribing. Changes will not trigger a render.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.snapshot
    }

    /// Select a value with [`Strict`] (identity) equality.
    pub fn use_selector<T, F>(&mut self, selector: F) -> T
    where
        T: Identity + Clone + 'static,
        F: Fn(&S) -> T + 'static,
    {
        self.use_selector_with(selector, Strict)
    }

    /// Select a value and re-render only when `equality` reports a change.
    ///
    /// # Panics
    ///
    /// Panics if a different hook (or a selector of a different value type)
    /// occupied this position on an earlier render.
    pub fn use_selector_with<T, F, E>(&mut self, selector: F, equality: E) -> T
    where
        T: Clone + 'static,
        F: Fn(&S) -> T + 'static,
        E: Equality<T> + 'static,
    {
        let index = self.next_index();
        if let Some(slot) = self.hooks.slots.get_mut(index) {
            let Some(hook) = slot.state.downcast_mut::<SelectorSlot<S, T>>() else {
                hook_order_violation(
                    self.component,
                    index,
                    slot,
                    "use_selector",
                    std::any::type_name::<T>(),
                );
            };
            let mut selection = hook.selection.borrow_mut();
            selection.selector = Box::new(selector);
            selection.equality = Box::new(equality);
            let outcome = selection.recompute(&self.snapshot);
            tracing::trace!(
                component = self.component,
                id = self.id.id(),
                hook = index,
                version = self.snapshot.version(),
                ?outcome,
                "selector render"
            );
            return selection.value.clone();
        }

        let value = selector(&self.snapshot);
        let selection = Rc::new(RefCell::new(Selection {
            selector: Box::new(selector),
            equality: Box::new(equality),
            value: value.clone(),
            version: self.snapshot.version(),
        }));
        let subscription = self.subscribe_selection(index, &selection);
        tracing::debug!(
            component = self.component,
            id = self.id.id(),
            hook = index,
            listener = subscription.id(),
            "selector subscribed"
        );
        self.hooks.subscriptions += 1;
        self.hooks.slots.push(HookSlot {
            kind: "use_selector",
            value_type: std::any::type_name::<T>(),
            state: Box::new(SelectorSlot {
                selection,
                _subscription: subscription,
            }),
        });
        value
    }

    /// A mutable cell that persists across renders of this component.
    ///
    /// `init` runs on the first render only.
    ///
    /// # Panics
    ///
    /// Panics if a different hook occupied this position on an earlier render.
    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        let index = self.next_index();
        if let Some(slot) = self.hooks.slots.get(index) {
            let Some(cell) = slot.state.downcast_ref::<Rc<RefCell<T>>>() else {
                hook_order_violation(
                    self.component,
                    index,
                    slot,
                    "use_ref",
                    std::any::type_name::<T>(),
                );
            };
            return Rc::clone(cell);
        }

        let cell = Rc::new(RefCell::new(init()));
        self.hooks.slots.push(HookSlot {
            kind: "use_ref",
            value_type: std::any::type_name::<T>(),
            state: Box::new(Rc::clone(&cell)),
        });
        cell
    }

    fn next_index(&mut self) -> usize {
        let index = self.cursor;
        self.cursor += 1;
        index
    }

    fn subscribe_selection<T: 'static>(
        &self,
        hook: usize,
        selection: &Rc<RefCell<Selection<S, T>>>,
    ) -> Subscription {
        let weak = Rc::downgrade(selection);
        let queue = self.queue.clone();
        let id = self.id;
        let component = self.component;
        let dirty = Rc::clone(&self.hooks.dirty);
        self.store.subscribe(move |snapshot| {
            let Some(cell) = weak.upgrade() else {
                return;
            };
            // Busy means the selection is mid-render; let that pass finish
            // and render again against the newer state.
            let Ok(mut selection) = cell.try_borrow_mut() else {
                dirty.set(true);
                queue.schedule(id);
                return;
            };
            if snapshot.version() <= selection.version {
                return;
            }
            let outcome = selection.recompute(snapshot);
            tracing::trace!(
                component,
                id = id.id(),
                hook,
                version = snapshot.version(),
                ?outcome,
                "selector notify"
            );
            if outcome == RecomputeOutcome::Changed {
                dirty.set(true);
                queue.schedule(id);
            }
        })
    }
}

impl<S: 'static> fmt::Debug for RenderCx<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCx")
            .field("id", &self.id)
            .field("component", &self.component)
            .field("version", &self.snapshot.version())
            .field("cursor", &self.cursor)
            .finish()
    }
}

fn hook_order_violation(
    component: &str,
    index: usize,
    found: &HookSlot,
    requested: &str,
    requested_type: &str,
) -> ! {
    panic!(
        "{component}: hook #{index} was {}<{}> on an earlier render but is now \
         {requested}<{requested_type}>; hooks must be called unconditionally and \
         in the same order on every render",
        found.kind, found.value_type,
    );
}

fn missing_hooks(component: &str, called: usize, expected: usize, skipped: &HookSlot) -> ! {
    panic!(
        "{component}: render called {called} hooks but an earlier render called \
         {expected} (hook #{called} was {}<{}>); hooks must be called unconditionally \
         and in the same order on every render",
        skipped.kind, skipped.value_type,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tether_core::Shallow;

    struct Harness {
        store: Store<(u32, String)>,
        queue: RenderQueue,
        hooks: HookSlots,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Store::new((0, String::from("a"))),
                queue: RenderQueue::new(),
                hooks: HookSlots::default(),
            }
        }

        fn cx(&mut self) -> RenderCx<'_, (u32, String)> {
            RenderCx::new(
                ComponentId::new(1),
                "Probe",
                &self.store,
                &self.queue,
                &mut self.hooks,
            )
        }
    }

    #[test]
    fn first_use_subscribes() {
        let mut h = Harness::new();
        assert_eq!(h.hooks.subscription_state(), SubscriptionState::Unsubscribed);
        let value = h.cx().use_selector(|s: &(u32, String)| s.0);
        assert_eq!(value, 0);
        assert_eq!(h.store.subscriber_count(), 1);
        assert_eq!(h.hooks.subscription_state(), SubscriptionState::Subscribed);
    }

    #[test]
    fn changed_selection_schedules_owner() {
        let mut h = Harness::new();
        h.cx().use_selector(|s: &(u32, String)| s.0);
        h.store.replace((1, String::from("a")));
        assert!(h.queue.contains(ComponentId::new(1)));
    }

    #[test]
    fn unchanged_selection_does_not_schedule() {
        let mut h = Harness::new();
        h.cx().use_selector(|s: &(u32, String)| s.1.clone());
        h.store.replace((5, String::from("a")));
        assert!(h.queue.is_empty());
    }

    #[test]
    fn render_returns_latest_value() {
        let mut h = Harness::new();
        h.cx().use_selector(|s: &(u32, String)| s.0);
        h.store.replace((9, String::new()));
        assert_eq!(h.cx().use_selector(|s: &(u32, String)| s.0), 9);
    }

    #[test]
    fn equal_result_keeps_previous_value() {
        let mut h = Harness::new();
        let first = h
            .cx()
            .use_selector_with(|s: &(u32, String)| Rc::new(s.1.clone()), Shallow);
        h.store.replace((1, String::from("a")));
        let second = h
            .cx()
            .use_selector_with(|s: &(u32, String)| Rc::new(s.1.clone()), Shallow);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn dropping_slots_unsubscribes() {
        let mut h = Harness::new();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        h.cx().use_selector(move |s: &(u32, String)| {
            c.set(c.get() + 1);
            s.0
        });
        assert_eq!(calls.get(), 1);

        h.hooks = HookSlots::default();
        h.store.replace((3, String::new()));
        assert_eq!(calls.get(), 1);
        assert_eq!(h.store.subscriber_count(), 0);
    }

    #[test]
    fn use_ref_persists() {
        let mut h = Harness::new();
        let cell = h.cx().use_ref(|| 1_u8);
        *cell.borrow_mut() = 7;
        let again = h.cx().use_ref(|| 1_u8);
        assert_eq!(*again.borrow(), 7);
        assert_eq!(h.hooks.len(), 1);
    }

    #[test]
    #[should_panic(expected = "hooks must be called unconditionally")]
    fn hook_kind_swap_panics() {
        let mut h = Harness::new();
        h.cx().use_ref(|| 0_u32);
        h.cx().use_selector(|s: &(u32, String)| s.0);
    }

    #[test]
    #[should_panic(expected = "render called 1 hooks but an earlier render called 2")]
    fn skipped_trailing_hook_panics() {
        let mut h = Harness::new();
        let mut cx = h.cx();
        cx.use_selector(|s: &(u32, String)| s.0);
        cx.use_selector(|s: &(u32, String)| s.1.clone());
        cx.finish();

        let mut cx = h.cx();
        cx.use_selector(|s: &(u32, String)| s.0);
        cx.finish();
    }

    #[test]
    fn full_pass_finishes_cleanly() {
        let mut h = Harness::new();
        for _ in 0..2 {
            let mut cx = h.cx();
            cx.use_selector(|s: &(u32, String)| s.0);
            cx.use_ref(|| 0_u8);
            cx.finish();
        }
        assert_eq!(h.hooks.len(), 2);
    }

    #[test]
    fn notified_change_marks_slots_dirty() {
        let mut h = Harness::new();
        h.cx().use_selector(|s: &(u32, String)| s.0);
        assert!(!h.hooks.take_dirty());

        h.store.replace((0, String::from("b")));
        assert!(!h.hooks.take_dirty(), "unchanged selection");

        h.store.replace((4, String::from("b")));
        assert!(h.hooks.take_dirty());
        assert!(!h.hooks.take_dirty(), "mark is cleared by the read");
    }

    #[test]
    fn scoped_context_keeps_separate_slots() {
        let mut h = Harness::new();
        let mut inner = HookSlots::default();
        {
            let mut cx = h.cx();
            cx.use_ref(|| 0_u8);
            let mut scoped = cx.scoped(&mut inner);
            assert_eq!(scoped.use_selector(|s: &(u32, String)| s.0), 0);
            scoped.finish();
        }
        assert_eq!(h.hooks.len(), 1);
        assert_eq!(inner.len(), 1);

        h.store.replace((2, String::new()));
        assert!(inner.take_dirty());
        assert!(!h.hooks.take_dirty());
        assert!(h.queue.contains(ComponentId::new(1)));
    }

    #[test]
    #[should_panic(expected = "hook #0")]
    fn selector_type_swap_panics() {
        let mut h = Harness::new();
        h.cx().use_selector(|s: &(u32, String)| s.0);
        h.cx().use_selector(|s: &(u32, String)| s.1.clone());
    }
}
