#![forbid(unsafe_code)]

//! Render output.
//!
//! A [`View`] is the value a component produces for one render pass: a small
//! tree of tagged elements and text. The host keeps the latest view per
//! mounted component; drawing it is left to whoever consumes the host.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Empty,
    Text(String),
    Element {
        tag: &'static str,
        children: Vec<View>,
    },
    Fragment(Vec<View>),
}

impl View {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn element(tag: &'static str, children: impl IntoIterator<Item = View>) -> Self {
        Self::Element {
            tag,
            children: children.into_iter().collect(),
        }
    }

    pub fn fragment(children: impl IntoIterator<Item = View>) -> Self {
        Self::Fragment(children.into_iter().collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// All text leaves in document order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Empty => {}
            Self::Text(text) => out.push(text),
            Self::Element { children, .. } | Self::Fragment(children) => {
                for child in children {
                    child.collect_texts(out);
                }
            }
        }
    }

    /// First element with `tag`, depth-first.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&View> {
        match self {
            Self::Element { tag: own, .. } if *own == tag => Some(self),
            Self::Element { children, .. } | Self::Fragment(children) => {
                children.iter().find_map(|child| child.find(tag))
            }
            _ => None,
        }
    }

    /// Concatenated text of the first element with `tag`.
    #[must_use]
    pub fn text_of(&self, tag: &str) -> Option<String> {
        self.find(tag).map(|view| view.texts().concat())
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = depth * 2;
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => writeln!(f, "{:indent$}{text}", ""),
            Self::Element { tag, children } => {
                writeln!(f, "{:indent$}<{tag}>", "")?;
                for child in children {
                    child.write_outline(f, depth + 1)?;
                }
                Ok(())
            }
            Self::Fragment(children) => {
                for child in children {
                    child.write_outline(f, depth)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for View {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for View {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Indented outline, one node per line.
impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> View {
        View::element(
            "card",
            [
                View::element("card-title", [View::text("Hello")]),
                View::fragment([View::text("a"), View::Empty, View::text("b")]),
            ],
        )
    }

    #[test]
    fn texts_in_order() {
        assert_eq!(sample().texts(), vec!["Hello", "a", "b"]);
    }

    #[test]
    fn find_by_tag() {
        let view = sample();
        assert_eq!(view.text_of("card-title").as_deref(), Some("Hello"));
        assert!(view.find("spinner").is_none());
    }

    #[test]
    fn outline_format() {
        let outline = sample().to_string();
        assert_eq!(outline, "<card>\n  <card-title>\n    Hello\n  a\n  b\n");
    }

    #[test]
    fn default_is_empty() {
        assert!(View::default().is_empty());
        assert_eq!(View::default().to_string(), "");
    }
}
