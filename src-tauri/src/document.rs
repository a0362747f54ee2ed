//! A plain model of the page the reader is looking at.
//!
//! The host fills it from the live page (identifiers and fingerprints are
//! assigned before the bookmark system sees it) and applies it back after
//! the reconciler has annotated it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    models::{fragment, strip_fragment, BookmarkType},
    reconcile::RenderedList,
};

pub const ATTR_BOOKMARKED: &str = "data-bookmarked";
pub const ATTR_BOOKMARK_TYPE: &str = "data-bookmark-type";
pub const ATTR_VISIBILITY: &str = "data-bookmark";
pub const CLASS_PENDING: &str = "bookmark-pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Vertical extent of an element, relative to the top of the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonIcon {
    Bookmark,
    History,
}

impl ButtonIcon {
    pub fn for_type(kind: BookmarkType) -> Self {
        match kind {
            BookmarkType::UserBookmark => ButtonIcon::Bookmark,
            BookmarkType::LastLocation => ButtonIcon::History,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    pub id: Option<String>,
    /// Value of `data-fingerprint`.
    pub fingerprint: Option<String>,
    pub text: String,
    pub parent: Option<NodeId>,
    pub attributes: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
    /// The bookmark action button attached to this element, if any.
    pub button: Option<ButtonIcon>,
    pub rect: Rect,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn at(mut self, top: f64, bottom: f64) -> Self {
        self.rect = Rect { top, bottom };
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn is_bookmarked(&self) -> bool {
        self.attr(ATTR_BOOKMARKED) == Some("true")
    }

    pub fn bookmark_type(&self) -> Option<BookmarkType> {
        self.attr(ATTR_BOOKMARK_TYPE).and_then(BookmarkType::parse)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub url: String,
    pub book_title: String,
    pub page_title: String,
    pub viewport_height: f64,
    pub elements: Vec<Element>,
    pub lists: BTreeMap<BookmarkType, RenderedList>,
    /// Set when the bookmark UI must not be shown at all.
    pub ui_hidden: bool,
}

impl Document {
    pub fn new(url: impl Into<String>, book_title: impl Into<String>, page_title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            book_title: book_title.into(),
            page_title: page_title.into(),
            viewport_height: 800.0,
            ..Self::default()
        }
    }

    pub fn push(&mut self, element: Element) -> NodeId {
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    pub fn page_url(&self) -> &str {
        strip_fragment(&self.url)
    }

    pub fn url_fragment(&self) -> Option<&str> {
        fragment(&self.url)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(node.0)
    }

    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.elements.iter().position(|e| e.id() == Some(id)).map(NodeId)
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.find(id).and_then(|n| self.element(n))
    }

    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        let node = self.find(id)?;
        self.element_mut(node)
    }

    /// Elements carrying an identifier, in document order.
    pub fn identified(&self) -> impl Iterator<Item = (NodeId, &Element)> {
        self.elements.iter().enumerate().filter(|(_, e)| e.id.is_some()).map(|(i, e)| (NodeId(i), e))
    }

    /// The node itself or its nearest ancestor with an identifier.
    pub fn closest_identified(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        let mut hops = 0;
        while let Some(n) = current {
            let element = self.element(n)?;
            if element.id.is_some() {
                return Some(n);
            }
            hops += 1;
            if hops > self.elements.len() {
                return None;
            }
            current = element.parent;
        }
        None
    }

    pub fn list(&self, kind: BookmarkType) -> Option<&RenderedList> {
        self.lists.get(&kind)
    }
}
