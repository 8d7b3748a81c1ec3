#![forbid(unsafe_code)]

//! Blog application state.
//!
//! The state is replaced wholesale on every update. Nested parts sit behind
//! `Rc` so an update that leaves a part untouched keeps its identity, which
//! is what the identity and shallow equality checks key on. The `with_*`
//! builders produce the next state from the current one.

use std::collections::HashMap;
use std::rc::Rc;

use tether_core::impl_shallow_eq;

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlogState {
    pub title: String,
    pub is_loading: bool,
    pub posts: Rc<PostsSummary>,
    /// The post currently open.
    pub post: Rc<Post>,
    pub posts_map: Rc<HashMap<u32, Rc<Post>>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PostsSummary {
    pub total: u32,
    /// Teaser text keyed by post id.
    pub text_map: HashMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Post {
    pub title: String,
    pub views_count: u64,
    pub body: String,
}

impl_shallow_eq!(Post {
    title,
    views_count,
    body
});

impl Post {
    pub fn new(title: impl Into<String>, views_count: u64, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            views_count,
            body: body.into(),
        }
    }
}

impl BlogState {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_loading(&self, is_loading: bool) -> Self {
        Self {
            is_loading,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_total(&self, total: u32) -> Self {
        Self {
            posts: Rc::new(PostsSummary {
                total,
                ..(*self.posts).clone()
            }),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_text(&self, id: u32, text: impl Into<String>) -> Self {
        let mut posts = (*self.posts).clone();
        posts.text_map.insert(id, text.into());
        Self {
            posts: Rc::new(posts),
            ..self.clone()
        }
    }

    /// Open `post`. Always installs a new allocation, even for an equal post.
    #[must_use]
    pub fn with_post(&self, post: Post) -> Self {
        Self {
            post: Rc::new(post),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_listed_post(&self, id: u32, post: Post) -> Self {
        let mut map = (*self.posts_map).clone();
        map.insert(id, Rc::new(post));
        Self {
            posts_map: Rc::new(map),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn without_listed_post(&self, id: u32) -> Self {
        let mut map = (*self.posts_map).clone();
        map.remove(&id);
        Self {
            posts_map: Rc::new(map),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{shallow_equal, strict_equal};

    #[test]
    fn with_total_keeps_other_parts() {
        let before = BlogState::new("A")
            .with_text(1, "hello")
            .with_post(Post::new("P", 1, "b"));
        let after = before.with_total(4);
        assert_eq!(after.posts.total, 4);
        assert_eq!(after.posts.text_map.get(&1).map(String::as_str), Some("hello"));
        assert!(strict_equal(&before.post, &after.post));
        assert!(!strict_equal(&before.posts, &after.posts));
    }

    #[test]
    fn with_post_replaces_identity() {
        let before = BlogState::new("A").with_post(Post::new("P", 1, "b"));
        let after = before.with_post(Post::new("P", 1, "b"));
        assert!(!strict_equal(&before.post, &after.post));
        assert!(shallow_equal(&before.post, &after.post));
    }

    #[test]
    fn listed_posts() {
        let state = BlogState::new("A").with_listed_post(2, Post::new("Two", 0, ""));
        assert_eq!(state.posts_map.get(&2).map(|p| p.title.as_str()), Some("Two"));
        assert!(state.without_listed_post(2).posts_map.is_empty());
    }
}
