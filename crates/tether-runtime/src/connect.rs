#![forbid(unsafe_code)]

//! Connect-style binding of presentational components to the store.
//!
//! [`connect`] takes a mapping function `(state, own props) -> mapped props`
//! and returns a [`Connector`]. [`Connector::wrap`] turns a presentational
//! component into a [`Connected`] one whose props are the own props only.
//!
//! # Usage
//!
//! ```ignore
//! struct Title;
//! impl Component<AppState> for Title {
//!     type Props = Merged<TitleOwnProps, TitleProps>;
//!     fn render(&self, props: &Self::Props, _cx: &mut RenderCx<'_, AppState>) -> View {
//!         View::text(props.mapped.title.clone())
//!     }
//! }
//!
//! let title = connect(|state: &AppState, _own: &TitleOwnProps| TitleProps {
//!     title: state.title.clone(),
//! })
//! .wrap(Title);
//! host.mount(title, TitleOwnProps::default());
//! ```
//!
//! # Invariants
//!
//! 1. The merged props are derived through a selector hook with [`Shallow`]
//!    equality, so a store update schedules a render only when some merged
//!    field changed identity.
//! 2. The inner component is rendered only when the merged props differ
//!    (shallowly) from the props of its previous render, or when one of its
//!    own hooks changed since then; otherwise its previous view is reused.
//!    This also covers re-renders triggered by new own props that map to the
//!    same merged set.
//! 3. The inner component keeps hook slots of its own, so skipping its
//!    render never leaves the wrapper's slots half visited.
//! 4. The mapping function always sees the own props of the latest render.
//! 5. Unmounting the connected component drops its store subscription.
//!
//! # Failure Modes
//!
//! - Mapping or merge panic: propagates out of the notification or render
//!   pass that called it.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tether_core::{Shallow, ShallowEq};

use crate::component::Component;
use crate::hooks::{HookSlots, RenderCx};
use crate::view::View;

/// Own props merged with mapped props; the default merge result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Merged<O, M> {
    pub own: O,
    pub mapped: M,
}

impl<O: ShallowEq, M: ShallowEq> ShallowEq for Merged<O, M> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.own.shallow_eq(&other.own) && self.mapped.shallow_eq(&other.mapped)
    }
}

/// Default merge: clone own props next to the mapped ones.
pub type DefaultMerge<O, M> = fn(&O, M) -> Merged<O, M>;

fn merge_default<O: Clone, M>(own: &O, mapped: M) -> Merged<O, M> {
    Merged {
        own: own.clone(),
        mapped,
    }
}

/// Bind a mapping function, merging its result with own props as [`Merged`].
pub fn connect<S, O, M, F>(map_state_to_props: F) -> Connector<F, DefaultMerge<O, M>, O, M>
where
    F: Fn(&S, &O) -> M + 'static,
    O: Clone + 'static,
    M: 'static,
{
    Connector {
        map: Rc::new(map_state_to_props),
        merge: Rc::new(merge_default::<O, M> as DefaultMerge<O, M>),
        _props: PhantomData,
    }
}

/// Bind a mapping function with a custom merge of own and mapped props.
pub fn connect_with<S, O, M, P, F, G>(map_state_to_props: F, merge: G) -> Connector<F, G, O, M>
where
    F: Fn(&S, &O) -> M + 'static,
    G: Fn(&O, M) -> P + 'static,
    O: Clone + 'static,
    M: 'static,
{
    Connector {
        map: Rc::new(map_state_to_props),
        merge: Rc::new(merge),
        _props: PhantomData,
    }
}

/// A mapping function waiting for a component to wrap.
///
/// One connector can wrap any number of components.
pub struct Connector<F, G, O, M> {
    map: Rc<F>,
    merge: Rc<G>,
    _props: PhantomData<fn(&O) -> M>,
}

impl<F, G, O, M> Clone for Connector<F, G, O, M> {
    fn clone(&self) -> Self {
        Self {
            map: Rc::clone(&self.map),
            merge: Rc::clone(&self.merge),
            _props: PhantomData,
        }
    }
}

impl<F, G, O, M> Connector<F, G, O, M> {
    pub fn wrap<C>(&self, inner: C) -> Connected<C, F, G, O, M> {
        Connected {
            inner,
            map: Rc::clone(&self.map),
            merge: Rc::clone(&self.merge),
            _props: PhantomData,
        }
    }
}

impl<F, G, O, M> fmt::Debug for Connector<F, G, O, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector").finish_non_exhaustive()
    }
}

/// A component bound to the store through a mapping function.
pub struct Connected<C, F, G, O, M> {
    inner: C,
    map: Rc<F>,
    merge: Rc<G>,
    _props: PhantomData<fn(&O) -> M>,
}

impl<C, F, G, O, M> Connected<C, F, G, O, M> {
    /// The wrapped presentational component.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<S, C, F, G, O, M> Component<S> for Connected<C, F, G, O, M>
where
    S: 'static,
    C: Component<S>,
    C::Props: ShallowEq + Clone,
    F: Fn(&S, &O) -> M + 'static,
    G: Fn(&O, M) -> C::Props + 'static,
    O: Clone + 'static,
    M: 'static,
{
    type Props = O;

    fn render(&self, own: &O, cx: &mut RenderCx<'_, S>) -> View {
        let map = Rc::clone(&self.map);
        let merge = Rc::clone(&self.merge);
        let own_props = own.clone();
        let merged = cx.use_selector_with(
            move |state: &S| (*merge)(&own_props, (*map)(state, &own_props)),
            Shallow,
        );

        let scope = cx.use_ref(InnerScope::<C::Props>::default);
        let mut scope = scope.borrow_mut();
        let InnerScope { hooks, last } = &mut *scope;
        let hooks_changed = hooks.take_dirty();
        let reused = last
            .as_ref()
            .filter(|(props, _)| !hooks_changed && props.shallow_eq(&merged))
            .map(|(_, view)| view.clone());
        if let Some(view) = reused {
            tracing::trace!(
                component = self.inner.name(),
                id = cx.id().id(),
                "connected props unchanged; reusing view"
            );
            return view;
        }

        let mut inner_cx = cx.scoped(hooks);
        let view = self.inner.render(&merged, &mut inner_cx);
        inner_cx.finish();
        *last = Some((merged, view.clone()));
        view
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Hook slots and last render of the wrapped component.
struct InnerScope<P> {
    hooks: HookSlots,
    last: Option<(P, View)>,
}

impl<P> Default for InnerScope<P> {
    fn default() -> Self {
        Self {
            hooks: HookSlots::default(),
            last: None,
        }
    }
}

impl<C: fmt::Debug, F, G, O, M> fmt::Debug for Connected<C, F, G, O, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connected")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
