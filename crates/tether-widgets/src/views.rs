#![forbid(unsafe_code)]

//! Card building blocks shared by the blog components.

use tether_runtime::View;

pub const CARD: &str = "card";
pub const CARD_TITLE: &str = "card-title";
pub const CARD_SUB_HEADER: &str = "card-sub-header";
pub const SPINNER: &str = "spinner";

/// A card holding `children` in order. Empty children are dropped.
pub fn card(children: impl IntoIterator<Item = View>) -> View {
    View::element(CARD, children.into_iter().filter(|child| !child.is_empty()))
}

pub fn card_title(title: impl Into<String>) -> View {
    View::element(CARD_TITLE, [View::text(title)])
}

pub fn card_sub_header(text: impl Into<String>) -> View {
    View::element(CARD_SUB_HEADER, [View::text(text)])
}

/// Loading indicator; renders nothing when `active` is false.
pub fn spinner(active: bool) -> View {
    if active {
        View::element(SPINNER, [])
    } else {
        View::Empty
    }
}
