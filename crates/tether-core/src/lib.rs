#![forbid(unsafe_code)]

//! State primitives for Tether.
//!
//! This crate provides:
//! - [`Store`]: the process-wide holder of application state, replaced
//!   wholesale on each update and broadcast to subscribers as a versioned
//!   stream of [`Snapshot`]s.
//! - [`Subscription`]: RAII guard that detaches a store listener on drop.
//! - [`Equality`] checks for derived values: [`Strict`] (identity) and
//!   [`Shallow`] (one level of field-by-field identity).

pub mod equality;
pub mod snapshot;
pub mod store;

pub use equality::{
    Equality, Identity, Shallow, ShallowEq, Strict, shallow_equal, strict_equal,
};
pub use snapshot::Snapshot;
pub use store::{Store, Subscription};
