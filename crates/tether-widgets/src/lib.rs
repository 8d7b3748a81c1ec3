#![forbid(unsafe_code)]

//! Blog card components for Tether.
//!
//! Two ways of reading the store, side by side:
//!
//! - [`posts_card`]: a presentational [`PostsView`] wrapped by `connect`,
//!   with props mapped from [`BlogState`] and the card's own props.
//! - [`PostCard`]: a component that reads the store through selector hooks.
//!
//! The [`views`] module holds the card building blocks both render with.

pub mod post;
pub mod posts;
pub mod state;
pub mod views;

pub use post::{PostCard, PostCardProps};
pub use posts::{PostsCard, PostsOwnProps, PostsProps, PostsView, map_posts_state, posts_card};
pub use state::{BlogState, Post, PostsSummary};
