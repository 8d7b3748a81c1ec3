#![forbid(unsafe_code)]

//! Posts summary card, bound through [`connect`].
//!
//! [`PostsView`] is purely presentational: it renders whatever merged props
//! it is given. [`posts_card`] binds it to the blog store with
//! [`map_posts_state`], so it re-renders only when one of the mapped fields
//! or its own props change.

use tether_core::impl_shallow_eq;
use tether_runtime::{Component, Connected, DefaultMerge, Merged, RenderCx, View, connect};

use crate::state::BlogState;
use crate::views::{card, card_sub_header, card_title, spinner};

/// Props the parent passes to the posts card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostsOwnProps {
    /// Post whose teaser text is shown.
    pub id: u32,
}
impl_shallow_eq!(PostsOwnProps { id });

/// Props derived from the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostsProps {
    pub title: String,
    pub is_loading: bool,
    pub posts_count: u32,
    /// `None` when the store has no teaser for the own id.
    pub text: Option<String>,
}
impl_shallow_eq!(PostsProps {
    title,
    is_loading,
    posts_count,
    text
});

pub fn map_posts_state(state: &BlogState, own: &PostsOwnProps) -> PostsProps {
    PostsProps {
        title: state.title.clone(),
        is_loading: state.is_loading,
        posts_count: state.posts.total,
        text: state.posts.text_map.get(&own.id).cloned(),
    }
}

type MapPosts = fn(&BlogState, &PostsOwnProps) -> PostsProps;

/// [`PostsView`] bound to the blog store.
pub type PostsCard = Connected<
    PostsView,
    MapPosts,
    DefaultMerge<PostsOwnProps, PostsProps>,
    PostsOwnProps,
    PostsProps,
>;

pub fn posts_card() -> PostsCard {
    connect(map_posts_state as MapPosts).wrap(PostsView)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostsView;

impl Component<BlogState> for PostsView {
    type Props = Merged<PostsOwnProps, PostsProps>;

    fn render(&self, props: &Self::Props, _cx: &mut RenderCx<'_, BlogState>) -> View {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "PostsCard",
            id = props.own.id,
            posts_count = props.mapped.posts_count,
        )
        .entered();

        let mapped = &props.mapped;
        card([
            card_title(mapped.title.clone()),
            card_sub_header(posts_count_label(mapped.posts_count)),
            mapped.text.clone().map(View::text).unwrap_or_default(),
            spinner(mapped.is_loading),
        ])
    }

    fn name(&self) -> &'static str {
        "PostsCard"
    }
}

fn posts_count_label(count: u32) -> String {
    match count {
        1 => "1 post".to_string(),
        n => format!("{n} posts"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{CARD_SUB_HEADER, CARD_TITLE, SPINNER};
    use tether_core::Store;
    use tether_runtime::Host;

    fn blog() -> BlogState {
        BlogState::new("A").with_total(3).with_text(1, "first teaser")
    }

    #[test]
    fn maps_fields_for_own_id() {
        let props = map_posts_state(&blog(), &PostsOwnProps { id: 1 });
        assert_eq!(
            props,
            PostsProps {
                title: "A".into(),
                is_loading: false,
                posts_count: 3,
                text: Some("first teaser".into()),
            }
        );
    }

    #[test]
    fn missing_text_maps_to_none() {
        let props = map_posts_state(&blog(), &PostsOwnProps { id: 42 });
        assert_eq!(props.text, None);
    }

    #[test]
    fn count_label_pluralizes() {
        assert_eq!(posts_count_label(0), "0 posts");
        assert_eq!(posts_count_label(1), "1 post");
        assert_eq!(posts_count_label(4), "4 posts");
    }

    #[test]
    fn renders_card_with_spinner_while_loading() {
        let mut host = Host::new(Store::new(blog().with_loading(true)));
        let id = host.mount(posts_card(), PostsOwnProps { id: 1 });
        let view = host.view(id).cloned().unwrap_or_default();

        assert_eq!(view.text_of(CARD_TITLE).as_deref(), Some("A"));
        assert_eq!(view.text_of(CARD_SUB_HEADER).as_deref(), Some("3 posts"));
        assert!(view.texts().contains(&"first teaser"));
        assert!(view.find(SPINNER).is_some());
    }

    #[test]
    fn total_change_renders_once_with_new_count() {
        let store = Store::new(blog());
        let mut host = Host::new(store.clone());
        let id = host.mount(posts_card(), PostsOwnProps { id: 1 });

        store.update(|s| s.with_total(4));
        let report = host.flush().unwrap();

        assert_eq!(report.rendered, vec![id]);
        let view = host.view(id).cloned().unwrap_or_default();
        assert_eq!(view.text_of(CARD_TITLE).as_deref(), Some("A"));
        assert_eq!(view.text_of(CARD_SUB_HEADER).as_deref(), Some("4 posts"));
    }

    #[test]
    fn unrelated_update_renders_nothing() {
        let store = Store::new(blog());
        let mut host = Host::new(store.clone());
        host.mount(posts_card(), PostsOwnProps { id: 1 });

        store.update(|s| s.with_text(2, "someone else's teaser"));
        assert_eq!(host.flush().unwrap().render_count(), 0);
    }
}
