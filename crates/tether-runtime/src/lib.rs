#![forbid(unsafe_code)]

//! Store-bound components for Tether.
//!
//! This crate connects presentational components to a [`Store`]:
//!
//! - [`RenderCx::use_selector`] / [`RenderCx::use_selector_with`]: read a
//!   slice of state and re-render only when it changes under an equality
//!   check.
//! - [`connect`] / [`connect_with`]: wrap a component so its props are
//!   derived from `(state, own props)` and it re-renders only when the
//!   merged props change shallowly.
//! - [`Host`]: mounts components, renders them, and flushes the
//!   [`RenderQueue`] that store listeners fill.
//!
//! # Architecture
//!
//! Everything is single-threaded (`Rc`/`RefCell`). Store listeners never
//! render; they enqueue component ids. The host decides when to flush. Each
//! render pass reads one [`Snapshot`](tether_core::Snapshot) taken at its
//! start.
//!
//! [`Store`]: tether_core::Store

pub mod component;
pub mod config;
pub mod connect;
pub mod error;
pub mod hooks;
pub mod host;
pub mod queue;
pub mod view;

pub use component::{Component, FnComponent, from_fn};
pub use config::RuntimeConfig;
pub use connect::{Connected, Connector, DefaultMerge, Merged, connect, connect_with};
pub use error::{ConfigError, HostError};
pub use hooks::{RecomputeOutcome, RenderCx, SubscriptionState};
pub use host::{FlushReport, Host};
pub use queue::{ComponentId, RenderQueue};
pub use view::View;
