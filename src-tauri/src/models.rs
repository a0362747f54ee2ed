use std::fmt;

use serde::{Deserialize, Serialize};

/// Which slot a record occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookmarkType {
    UserBookmark,
    LastLocation,
}

impl BookmarkType {
    pub const ALL: [BookmarkType; 2] = [BookmarkType::UserBookmark, BookmarkType::LastLocation];

    pub fn as_str(self) -> &'static str {
        match self {
            BookmarkType::UserBookmark => "UserBookmark",
            BookmarkType::LastLocation => "LastLocation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UserBookmark" => Some(BookmarkType::UserBookmark),
            "LastLocation" => Some(BookmarkType::LastLocation),
            _ => None,
        }
    }
}

impl fmt::Display for BookmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted bookmark. Stored as JSON under `key` in durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: BookmarkType,
    pub book_title: String,
    pub page_title: String,
    pub description: String,
    pub id: String,
    #[serde(default)]
    pub fingerprint: String,
    pub location: String,
    pub session_date: String,
}

impl BookmarkRecord {
    /// Session timestamp as a number. Unparseable values sort first.
    pub fn session_millis(&self) -> i64 {
        self.session_date.trim().parse().unwrap_or(0)
    }

    /// The record's location without its fragment.
    pub fn page_url(&self) -> &str {
        strip_fragment(&self.location)
    }
}

/// Result of a full load: every parsed record, and the subset shown in lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadedBookmarks {
    pub all: Vec<BookmarkRecord>,
    pub visible: Vec<BookmarkRecord>,
}

/// Where following a bookmark should take the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTarget {
    pub url: String,
    pub id: String,
    pub verified: bool,
}

pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

pub fn fragment(url: &str) -> Option<&str> {
    url.find('#').map(|pos| &url[pos + 1..]).filter(|f| !f.is_empty())
}
