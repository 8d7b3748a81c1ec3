#![forbid(unsafe_code)]

//! Open-post card, reading the store through selector hooks.
//!
//! Both selections use shallow equality: a new `Rc<Post>` whose fields
//! match the previous one does not re-render the card.

use std::rc::Rc;

use tether_core::Shallow;
use tether_runtime::{Component, RenderCx, View};

use crate::state::{BlogState, Post};
use crate::views::{card, card_sub_header, card_title};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostCardProps {
    /// Key into the listed posts.
    pub id: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostCard;

impl Component<BlogState> for PostCard {
    type Props = PostCardProps;

    fn render(&self, props: &PostCardProps, cx: &mut RenderCx<'_, BlogState>) -> View {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("widget_render", widget = "PostCard", id = props.id).entered();

        let post = cx.use_selector_with(|state: &BlogState| Rc::clone(&state.post), Shallow);
        let id = props.id;
        let listed = cx.use_selector_with(
            move |state: &BlogState| state.posts_map.get(&id).cloned(),
            Shallow,
        );

        card([
            card_title(post.title.clone()),
            card_sub_header(views_label(&post)),
            View::text(post.body.clone()),
            listed
                .map(|entry| View::text(format!("#{id}: {}", entry.title)))
                .unwrap_or_default(),
        ])
    }

    fn name(&self) -> &'static str {
        "PostCard"
    }
}

fn views_label(post: &Post) -> String {
    match post.views_count {
        1 => "1 view".to_string(),
        n => format!("{n} views"),
    }
}
