#![forbid(unsafe_code)]

//! Tether public facade.
//!
//! Re-exports the store, the binding runtime and (with the `widgets`
//! feature) the blog cards. Most applications only need the [`prelude`].
//!
//! ```
//! use tether::prelude::*;
//!
//! struct Count;
//! impl Component<u32> for Count {
//!     type Props = ();
//!     fn render(&self, _: &(), cx: &mut RenderCx<'_, u32>) -> View {
//!         View::text(cx.use_selector(|n: &u32| *n).to_string())
//!     }
//! }
//!
//! let store = Store::new(1_u32);
//! let mut host = Host::new(store.clone());
//! let id = host.mount(Count, ());
//! store.replace(2);
//! host.flush().unwrap();
//! assert_eq!(host.view(id), Some(&View::text("2")));
//! ```

pub use tether_core as core;
pub use tether_runtime as runtime;
#[cfg(feature = "widgets")]
pub use tether_widgets as widgets;

pub use tether_core::{
    Equality, Identity, Shallow, ShallowEq, Snapshot, Store, Strict, Subscription, impl_shallow_eq,
    shallow_equal, strict_equal,
};
pub use tether_runtime::{
    Component, ComponentId, ConfigError, Connected, Connector, FlushReport, Host, HostError,
    Merged, RenderCx, RuntimeConfig, View, connect, connect_with,
};

pub mod prelude {
    pub use tether_core::{Shallow, ShallowEq, Store, Strict, impl_shallow_eq};
    pub use tether_runtime::{
        Component, ComponentId, Host, Merged, RenderCx, RuntimeConfig, View, connect,
        connect_with, from_fn,
    };
}
