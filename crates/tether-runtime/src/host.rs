#![forbid(unsafe_code)]

//! Minimal render host: mount, render, flush, unmount.
//!
//! The host owns mounted component instances and their hook slots. It is
//! the only place renders run:
//!
//! - [`Host::mount`] renders once immediately; hooks subscribe during that
//!   first pass.
//! - Store listeners enqueue component ids into the shared [`RenderQueue`].
//! - [`Host::flush`] drains the queue, rendering each still-mounted
//!   component once per dequeue.
//! - [`Host::unmount`] drops the instance and its hook slots, which drops
//!   every store subscription it held, and cancels any pending render.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Result |
//! |---------|-------|--------|
//! | Unknown id | Component already unmounted | `HostError::UnknownComponent` |
//! | Wrong props type | `set_props` with another type | `HostError::PropsTypeMismatch` |
//! | Render loop | Renders keep re-queueing | `HostError::FlushLimitExceeded` |
//! | Render panic | Selector/mapping/render panicked | Unwinds to the caller |

use std::fmt;

use ahash::AHashMap;
use tether_core::Store;

use crate::component::{Component, ErasedComponent, Mounted};
use crate::config::RuntimeConfig;
use crate::error::HostError;
use crate::hooks::{HookSlots, RenderCx, SubscriptionState};
use crate::queue::{ComponentId, RenderQueue};
use crate::view::View;

struct Instance<S: 'static> {
    component: Box<dyn ErasedComponent<S>>,
    hooks: HookSlots,
    view: View,
    renders: u64,
}

/// What a [`Host::flush`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Components rendered, in render order.
    pub rendered: Vec<ComponentId>,
    /// Queued ids that were no longer mounted.
    pub skipped: usize,
}

impl FlushReport {
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.rendered.len()
    }
}

pub struct Host<S: 'static> {
    store: Store<S>,
    queue: RenderQueue,
    config: RuntimeConfig,
    instances: AHashMap<ComponentId, Instance<S>>,
    next_id: u64,
}

impl<S: 'static> Host<S> {
    #[must_use]
    pub fn new(store: Store<S>) -> Self {
        Self::with_config(store, RuntimeConfig::default())
    }

    /// Host with `config`. A zero render limit is raised to 1.
    #[must_use]
    pub fn with_config(store: Store<S>, mut config: RuntimeConfig) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "invalid runtime config; render limit raised to 1");
            config.max_renders_per_flush = 1;
        }
        Self {
            store,
            queue: RenderQueue::new(),
            config,
            instances: AHashMap::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Mount `component` with `props` and render it once.
    pub fn mount<C: Component<S>>(&mut self, component: C, props: C::Props) -> ComponentId {
        let id = ComponentId::new(self.next_id);
        self.next_id += 1;
        let component: Box<dyn ErasedComponent<S>> = Box::new(Mounted::new(component, props));
        tracing::debug!(id = id.id(), component = component.name(), "mount");
        let instance = self.instances.entry(id).or_insert(Instance {
            component,
            hooks: HookSlots::default(),
            view: View::Empty,
            renders: 0,
        });
        render_instance(&self.store, &self.queue, &self.config, id, instance);
        id
    }

    /// Unmount `id`, releasing its subscriptions and any pending render.
    pub fn unmount(&mut self, id: ComponentId) -> Result<(), HostError> {
        let instance = self
            .instances
            .remove(&id)
            .ok_or(HostError::UnknownComponent(id))?;
        self.queue.cancel(id);
        tracing::debug!(
            id = id.id(),
            component = instance.component.name(),
            hooks = instance.hooks.len(),
            "unmount"
        );
        drop(instance);
        Ok(())
    }

    /// Replace the own props of `id` and schedule a render.
    pub fn set_props<P: 'static>(&mut self, id: ComponentId, props: P) -> Result<(), HostError> {
        let instance = self
            .instances
            .get_mut(&id)
            .ok_or(HostError::UnknownComponent(id))?;
        if instance.component.replace_props(Box::new(props)).is_err() {
            return Err(HostError::PropsTypeMismatch {
                id,
                component: instance.component.name(),
                expected: instance.component.props_type(),
            });
        }
        self.queue.schedule(id);
        Ok(())
    }

    /// Render every queued component.
    ///
    /// Renders that cause further store updates may queue more work; the
    /// flush keeps draining until the queue is empty or the configured
    /// render limit is hit.
    pub fn flush(&mut self) -> Result<FlushReport, HostError> {
        let _span = tracing::debug_span!("flush", pending = self.queue.len()).entered();
        let mut report = FlushReport::default();
        while let Some(id) = self.queue.pop() {
            if report.rendered.len() >= self.config.max_renders_per_flush {
                self.queue.schedule(id);
                tracing::warn!(
                    limit = self.config.max_renders_per_flush,
                    pending = self.queue.len(),
                    "flush limit exceeded"
                );
                return Err(HostError::FlushLimitExceeded {
                    limit: self.config.max_renders_per_flush,
                    pending: self.queue.len(),
                });
            }
            let Some(instance) = self.instances.get_mut(&id) else {
                report.skipped += 1;
                continue;
            };
            render_instance(&self.store, &self.queue, &self.config, id, instance);
            report.rendered.push(id);
        }
        tracing::debug!(
            rendered = report.rendered.len(),
            skipped = report.skipped,
            "flush complete"
        );
        Ok(report)
    }

    /// Latest view of `id`.
    #[must_use]
    pub fn view(&self, id: ComponentId) -> Option<&View> {
        self.instances.get(&id).map(|instance| &instance.view)
    }

    /// Number of completed renders of `id`, including the mount render.
    #[must_use]
    pub fn render_count(&self, id: ComponentId) -> Option<u64> {
        self.instances.get(&id).map(|instance| instance.renders)
    }

    #[must_use]
    pub fn is_mounted(&self, id: ComponentId) -> bool {
        self.instances.contains_key(&id)
    }

    /// Whether `id` holds live store subscriptions.
    #[must_use]
    pub fn subscription_state(&self, id: ComponentId) -> SubscriptionState {
        self.instances
            .get(&id)
            .map_or(SubscriptionState::Unsubscribed, |instance| {
                instance.hooks.subscription_state()
            })
    }

    /// Number of components waiting for a render.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.instances.len()
    }
}

impl<S: 'static> fmt::Debug for Host<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("version", &self.store.version())
            .field("mounted", &self.instances.len())
            .field("pending", &self.queue.len())
            .field("config", &self.config)
            .finish()
    }
}

fn render_instance<S: 'static>(
    store: &Store<S>,
    queue: &RenderQueue,
    config: &RuntimeConfig,
    id: ComponentId,
    instance: &mut Instance<S>,
) {
    let name = instance.component.name();
    let _span = tracing::debug_span!("render", id = id.id(), component = name).entered();

    let mut cx = RenderCx::new(id, name, store, queue, &mut instance.hooks);
    let version = cx.snapshot().version();
    instance.view = instance.component.render(&mut cx);
    cx.finish();
    instance.renders += 1;

    if config.log_renders {
        tracing::info!(id = id.id(), component = name, version, renders = instance.renders, "render");
    } else {
        tracing::debug!(id = id.id(), component = name, version, renders = instance.renders, "render");
    }
}
