use crate::models::BookmarkType;

/// Session-storage key of the tab's session identifier.
pub const SESSION_DATE_KEY: &str = "sessionDate";
/// Session-storage key of the fingerprint index.
pub const INDEX_KEY: &str = "index-of-bookmarks";

/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single `-`.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Durable key for a record. User bookmarks get one slot per book; last
/// locations get one slot per book and session.
pub fn record_key(prefix: &str, book_title: &str, kind: BookmarkType, session_date: &str) -> String {
    let slug = slugify(book_title);
    match kind {
        BookmarkType::UserBookmark => format!("{prefix}-{slug}-{kind}"),
        BookmarkType::LastLocation => format!("{prefix}-{slug}-{kind}-{session_date}"),
    }
}

pub fn is_record_key(prefix: &str, key: &str) -> bool {
    key.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('-'))
}
