#![forbid(unsafe_code)]

//! The component contract.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::hooks::RenderCx;
use crate::view::View;

/// A presentational unit rendered against state `S`.
///
/// `render` is called once per render pass with the component's own props
/// and a [`RenderCx`] through which it reads the store. Hooks on the context
/// are positional: call them unconditionally, in the same order, on every
/// render.
pub trait Component<S: 'static>: 'static {
    type Props: 'static;

    fn render(&self, props: &Self::Props, cx: &mut RenderCx<'_, S>) -> View;

    /// Name used in logs and error messages.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Component backed by a closure.
pub struct FnComponent<F, P> {
    name: &'static str,
    render: F,
    _props: PhantomData<fn(&P)>,
}

/// Wrap a render closure as a [`Component`].
pub fn from_fn<S, P, F>(name: &'static str, render: F) -> FnComponent<F, P>
where
    S: 'static,
    P: 'static,
    F: Fn(&P, &mut RenderCx<'_, S>) -> View + 'static,
{
    FnComponent {
        name,
        render,
        _props: PhantomData,
    }
}

impl<S, P, F> Component<S> for FnComponent<F, P>
where
    S: 'static,
    P: 'static,
    F: Fn(&P, &mut RenderCx<'_, S>) -> View + 'static,
{
    type Props = P;

    fn render(&self, props: &P, cx: &mut RenderCx<'_, S>) -> View {
        (self.render)(props, cx)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl<F, P> fmt::Debug for FnComponent<F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent")
            .field("name", &self.name)
            .finish()
    }
}

/// Type-erased component plus its current props, as held by the host.
pub(crate) trait ErasedComponent<S> {
    fn name(&self) -> &'static str;
    fn props_type(&self) -> &'static str;
    fn render(&self, cx: &mut RenderCx<'_, S>) -> View;
    /// Swap in new props; hands the box back if the type does not match.
    fn replace_props(&mut self, props: Box<dyn Any>) -> Result<(), Box<dyn Any>>;
}

pub(crate) struct Mounted<S: 'static, C: Component<S>> {
    component: C,
    props: C::Props,
    _state: PhantomData<fn(&S)>,
}

impl<S: 'static, C: Component<S>> Mounted<S, C> {
    pub(crate) fn new(component: C, props: C::Props) -> Self {
        Self {
            component,
            props,
            _state: PhantomData,
        }
    }
}

impl<S: 'static, C: Component<S>> ErasedComponent<S> for Mounted<S, C> {
    fn name(&self) -> &'static str {
        self.component.name()
    }

    fn props_type(&self) -> &'static str {
        std::any::type_name::<C::Props>()
    }

    fn render(&self, cx: &mut RenderCx<'_, S>) -> View {
        self.component.render(&self.props, cx)
    }

    fn replace_props(&mut self, props: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        let props = props.downcast::<C::Props>()?;
        self.props = *props;
        Ok(())
    }
}
