//! Retention of automatically captured last locations.
//!
//! Per book, the reader keeps the location from the previous session and
//! the one from the current session. Anything older is dropped the next
//! time records are read.

use std::collections::BTreeMap;

use crate::{
    error::Result,
    models::{BookmarkRecord, BookmarkType},
    storage::StorageArea,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LastLocationPolicy;

impl LastLocationPolicy {
    /// Keys of `book_title`'s last-location records that must go.
    ///
    /// Records from any session other than `current_session` count as prior;
    /// only the most recent prior record survives.
    pub fn expired<'a>(records: &'a [BookmarkRecord], book_title: &str, current_session: &str) -> Vec<&'a str> {
        let mut prior: Vec<&BookmarkRecord> = records
            .iter()
            .filter(|r| r.kind == BookmarkType::LastLocation && r.book_title == book_title)
            .filter(|r| r.session_date != current_session)
            .collect();
        if prior.len() <= 1 {
            return Vec::new();
        }
        prior.sort_by_key(|r| r.session_millis());
        prior.pop();
        prior.into_iter().map(|r| r.key.as_str()).collect()
    }

    /// Prunes one book and deletes the expired records from `storage`.
    pub fn prune(
        storage: &dyn StorageArea,
        records: &mut Vec<BookmarkRecord>,
        book_title: &str,
        current_session: &str,
    ) -> Result<usize> {
        let doomed: Vec<String> = Self::expired(records, book_title, current_session)
            .into_iter()
            .map(str::to_string)
            .collect();
        for key in &doomed {
            storage.remove_item(key)?;
        }
        if !doomed.is_empty() {
            records.retain(|r| !doomed.contains(&r.key));
            tracing::info!(book = book_title, removed = doomed.len(), "pruned old last locations");
        }
        Ok(doomed.len())
    }

    /// Prunes every book that has last-location records.
    pub fn prune_all(storage: &dyn StorageArea, records: &mut Vec<BookmarkRecord>, current_session: &str) -> Result<usize> {
        let mut titles: BTreeMap<String, usize> = BTreeMap::new();
        for r in records.iter().filter(|r| r.kind == BookmarkType::LastLocation) {
            *titles.entry(r.book_title.clone()).or_default() += 1;
        }
        let mut removed = 0;
        for (title, count) in titles {
            if count > 1 {
                removed += Self::prune(storage, records, &title, current_session)?;
            }
        }
        Ok(removed)
    }
}
