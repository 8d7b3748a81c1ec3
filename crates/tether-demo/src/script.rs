#![forbid(unsafe_code)]

//! Scripted store updates driven by the demo.

use std::fmt;

use tether_widgets::{BlogState, Post};

/// One scripted update. Each step replaces the state wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Bump the posts total; the posts card re-renders.
    AddPost,
    /// Re-install an equal open post; nothing re-renders.
    RefreshPost,
    /// Flip the loading flag; the posts card re-renders.
    ToggleLoading,
    /// Bump the open post's view count; the post card re-renders.
    ViewPost,
    /// Rename the blog; the posts card re-renders.
    Rename,
}

impl Step {
    pub const CYCLE: [Step; 5] = [
        Step::AddPost,
        Step::RefreshPost,
        Step::ToggleLoading,
        Step::ViewPost,
        Step::Rename,
    ];

    /// The `n`th step of the repeating script.
    pub fn nth(n: usize) -> Self {
        Self::CYCLE[n % Self::CYCLE.len()]
    }

    pub fn apply(self, state: &BlogState) -> BlogState {
        match self {
            Self::AddPost => {
                let id = state.posts.total + 1;
                state
                    .with_total(id)
                    .with_text(id, format!("teaser for post {id}"))
                    .with_listed_post(id, Post::new(format!("Post {id}"), 0, ""))
            }
            Self::RefreshPost => state.with_post((*state.post).clone()),
            Self::ToggleLoading => state.with_loading(!state.is_loading),
            Self::ViewPost => {
                let mut post = (*state.post).clone();
                post.views_count += 1;
                state.with_post(post)
            }
            Self::Rename => state.with_title(format!("{} (edited)", state.title)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AddPost => "add post",
            Self::RefreshPost => "refresh open post",
            Self::ToggleLoading => "toggle loading",
            Self::ViewPost => "view open post",
            Self::Rename => "rename blog",
        };
        f.write_str(label)
    }
}

/// Initial state used when no `--state` file is given.
pub fn seed() -> BlogState {
    BlogState::new("Field Notes")
        .with_total(2)
        .with_text(1, "Why stores replace state wholesale")
        .with_text(2, "Selectors and equality")
        .with_listed_post(1, Post::new("Wholesale replacement", 12, ""))
        .with_listed_post(2, Post::new("Selectors", 7, ""))
        .with_post(Post::new("Selectors", 7, "A selector reads one slice of state."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_cycles() {
        assert_eq!(Step::nth(0), Step::AddPost);
        assert_eq!(Step::nth(6), Step::RefreshPost);
    }

    #[test]
    fn add_post_lists_the_new_post() {
        let next = Step::AddPost.apply(&seed());
        assert_eq!(next.posts.total, 3);
        assert!(next.posts_map.contains_key(&3));
        assert!(next.posts.text_map.contains_key(&3));
    }

    #[test]
    fn refresh_keeps_fields_but_not_identity() {
        let state = seed();
        let next = Step::RefreshPost.apply(&state);
        assert_eq!(next.post, state.post);
        assert!(!std::rc::Rc::ptr_eq(&next.post, &state.post));
    }
}
