use std::collections::HashMap;

use once_cell::sync::Lazy;

pub const DOMAIN: &str = "bookmarks";

pub const FINGERPRINT_MISMATCH: &str = "fingerprint-mismatch";
pub const CONFIRM_DELETE_ALL_USER: &str = "confirm-delete-all-bookmarks";
pub const CONFIRM_DELETE_ALL_LAST: &str = "confirm-delete-all-last-locations";
pub const CONFIRM_DELETE_ALL: &str = "confirm-delete-all";
pub const DELETE: &str = "delete";
pub const DELETE_ALL: &str = "delete-all";
pub const NO_BOOKMARKS: &str = "no-bookmarks";
pub const NO_LAST_LOCATIONS: &str = "no-last-locations";
pub const HEADING_BOOKMARKS: &str = "bookmarks";
pub const HEADING_LAST_LOCATIONS: &str = "last-locations";

/// Looks up display strings by `(locale, domain, key)`.
pub trait Localizer: Send + Sync {
    fn lookup(&self, locale: &str, domain: &str, key: &str) -> Option<String>;

    /// Bookmark-domain string, falling back to the key itself.
    fn text(&self, locale: &str, key: &str) -> String {
        self.lookup(locale, DOMAIN, key).unwrap_or_else(|| key.to_string())
    }
}

static ENGLISH: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            FINGERPRINT_MISMATCH,
            "This page has changed since this bookmark was saved, so it may not point to the right place.",
        ),
        (CONFIRM_DELETE_ALL_USER, "Delete all your bookmarks? This cannot be undone."),
        (CONFIRM_DELETE_ALL_LAST, "Delete all your last-read locations? This cannot be undone."),
        (CONFIRM_DELETE_ALL, "Delete all bookmarks and last-read locations? This cannot be undone."),
        (DELETE, "Delete"),
        (DELETE_ALL, "Delete all"),
        (NO_BOOKMARKS, "You have no bookmarks yet."),
        (NO_LAST_LOCATIONS, "No previous reading locations."),
        (HEADING_BOOKMARKS, "Bookmarks"),
        (HEADING_LAST_LOCATIONS, "Last read"),
    ])
});

/// English strings; every other locale falls through to English.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLocalizer;

impl Localizer for DefaultLocalizer {
    fn lookup(&self, _locale: &str, domain: &str, key: &str) -> Option<String> {
        if domain != DOMAIN {
            return None;
        }
        ENGLISH.get(key).map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_keys() {
        assert_eq!(DefaultLocalizer.text("en", DELETE), "Delete");
        assert_eq!(DefaultLocalizer.text("de", DELETE), "Delete");
        assert_eq!(DefaultLocalizer.text("en", "nope"), "nope");
        assert_eq!(DefaultLocalizer.lookup("en", "search", DELETE), None);
    }
}
