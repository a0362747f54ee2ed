//! Applies loaded bookmark records to the page: element annotations and the
//! two list panels.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{format_description, OffsetDateTime};

use crate::{
    document::{ButtonIcon, Document, ATTR_BOOKMARKED, ATTR_BOOKMARK_TYPE, CLASS_PENDING},
    i18n::{self, Localizer},
    models::{BookmarkRecord, BookmarkType, LoadedBookmarks},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub key: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub page_title: String,
    pub description: String,
    pub delete_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedList {
    pub kind: BookmarkType,
    pub heading: String,
    pub items: Vec<ListItem>,
    pub empty_message: Option<String>,
    /// Label of the trailing "delete all" control, scoped to `kind`.
    pub delete_all_label: String,
}

pub struct DomReconciler {
    localizer: Arc<dyn Localizer>,
    locale: String,
    date_format: String,
}

impl DomReconciler {
    pub fn new(localizer: Arc<dyn Localizer>, locale: impl Into<String>, date_format: impl Into<String>) -> Self {
        Self { localizer, locale: locale.into(), date_format: date_format.into() }
    }

    /// Marks and lists in one pass.
    pub fn reconcile(&self, doc: &mut Document, loaded: &LoadedBookmarks) {
        let marked = self.mark_bookmarks(doc, &loaded.all);
        self.list_bookmarks(doc, &loaded.visible);
        tracing::debug!(marked, listed = loaded.visible.len(), "page reconciled");
    }

    /// Re-annotates every element from `records`. Returns how many elements
    /// ended up marked.
    pub fn mark_bookmarks(&self, doc: &mut Document, records: &[BookmarkRecord]) -> usize {
        for element in &mut doc.elements {
            element.remove_attr(ATTR_BOOKMARKED);
            element.remove_attr(ATTR_BOOKMARK_TYPE);
            element.button = element.has_class(CLASS_PENDING).then_some(ButtonIcon::Bookmark);
        }

        let page_url = doc.page_url().to_string();
        let mut marked = 0;
        for record in records.iter().filter(|r| r.page_url() == page_url) {
            let Some(element) = doc.by_id_mut(&record.id) else {
                tracing::debug!(id = %record.id, "bookmarked element not on this page");
                continue;
            };
            match (element.bookmark_type(), record.kind) {
                (Some(BookmarkType::UserBookmark), BookmarkType::LastLocation) => continue,
                (None, _) => marked += 1,
                _ => {}
            }
            element.set_attr(ATTR_BOOKMARKED, "true");
            element.set_attr(ATTR_BOOKMARK_TYPE, record.kind.as_str());
            element.button = Some(ButtonIcon::for_type(record.kind));
        }
        marked
    }

    /// Rebuilds both list panels from the records lists may show.
    pub fn list_bookmarks(&self, doc: &mut Document, visible: &[BookmarkRecord]) {
        doc.lists.clear();
        for kind in BookmarkType::ALL {
            let items = visible.iter().filter(|r| r.kind == kind).map(|r| self.list_item(r)).collect();
            doc.lists.insert(kind, self.list(kind, items));
        }
    }

    fn list(&self, kind: BookmarkType, items: Vec<ListItem>) -> RenderedList {
        let (heading, empty) = match kind {
            BookmarkType::UserBookmark => (i18n::HEADING_BOOKMARKS, i18n::NO_BOOKMARKS),
            BookmarkType::LastLocation => (i18n::HEADING_LAST_LOCATIONS, i18n::NO_LAST_LOCATIONS),
        };
        let empty_message = if items.is_empty() { Some(self.text(empty)) } else { None };
        RenderedList {
            kind,
            heading: self.text(heading),
            items,
            empty_message,
            delete_all_label: self.text(i18n::DELETE_ALL),
        }
    }

    fn list_item(&self, record: &BookmarkRecord) -> ListItem {
        ListItem {
            key: record.key.clone(),
            title: record.book_title.clone(),
            link: record.location.clone(),
            date: self.format_date(&record.session_date),
            page_title: record.page_title.clone(),
            description: record.description.clone(),
            delete_label: self.text(i18n::DELETE),
        }
    }

    /// Human-readable form of a session timestamp, in UTC. Values that are
    /// not timestamps are shown as stored.
    pub fn format_date(&self, session_date: &str) -> String {
        let Ok(millis) = session_date.trim().parse::<i64>() else { return session_date.to_string() };
        let Ok(at) = OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000) else {
            return session_date.to_string();
        };
        let formatted = format_description::parse(&self.date_format)
            .ok()
            .and_then(|fmt| at.format(&fmt).ok());
        formatted.unwrap_or_else(|| session_date.to_string())
    }

    fn text(&self, key: &str) -> String {
        self.localizer.text(&self.locale, key)
    }
}
