//! Bookmark records in durable storage.
//!
//! The store never touches the page. Callers hand it plain element data and
//! get records back; re-annotating the page is the reconciler's job.

use std::sync::Arc;

use crate::{
    config::BookmarkConfig,
    document::Element,
    error::{BookmarkError, Result},
    i18n::{self, Localizer},
    keys::{is_record_key, record_key},
    models::{strip_fragment, BookmarkRecord, BookmarkType, LoadedBookmarks},
    policy::LastLocationPolicy,
    prompt::UserPrompt,
    session::SessionManager,
    storage::StorageArea,
    util::excerpt::make_excerpt,
};

/// The page-level facts a capture needs.
#[derive(Debug, Clone, Copy)]
pub struct PageInfo<'a> {
    pub url: &'a str,
    pub book_title: &'a str,
    pub page_title: &'a str,
}

pub struct BookmarkStore {
    local: Arc<dyn StorageArea>,
    session: SessionManager,
    prefix: String,
    excerpt_chars: usize,
}

impl BookmarkStore {
    pub fn new(local: Arc<dyn StorageArea>, session: SessionManager, config: &BookmarkConfig) -> Self {
        Self { local, session, prefix: config.key_prefix.clone(), excerpt_chars: config.excerpt_chars }
    }

    /// Captures `target` and writes it to its slot. A user bookmark replaces
    /// the book's previous one; a last location replaces only this session's.
    pub fn set_bookmark(
        &self,
        kind: BookmarkType,
        page: PageInfo<'_>,
        target: &Element,
        description: Option<&str>,
    ) -> Result<BookmarkRecord> {
        let id = target.id().ok_or(BookmarkError::NoTarget)?;
        let session_date = self.session.session_date()?;
        let description = match description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(selected) => selected.to_string(),
            None => make_excerpt(&target.text, self.excerpt_chars),
        };
        let record = BookmarkRecord {
            key: record_key(&self.prefix, page.book_title, kind, &session_date),
            kind,
            book_title: page.book_title.to_string(),
            page_title: page.page_title.to_string(),
            description,
            id: id.to_string(),
            fingerprint: target.fingerprint.clone().unwrap_or_default(),
            location: format!("{}#{}", strip_fragment(page.url), id),
            session_date,
        };
        self.local.set_item(&record.key, &serde_json::to_string(&record)?)?;
        tracing::info!(key = %record.key, element = %record.id, "bookmark saved");
        Ok(record)
    }

    /// Removes the entry at `key`. Returns whether anything was there.
    /// Keys outside the bookmark namespace are left alone.
    pub fn delete_bookmark(&self, key: &str) -> Result<bool> {
        if !is_record_key(&self.prefix, key) {
            tracing::warn!(key, "refusing to delete a non-bookmark key");
            return Ok(false);
        }
        let existed = self.local.get_item(key)?.is_some();
        self.local.remove_item(key)?;
        if existed {
            tracing::info!(key, "bookmark deleted");
        }
        Ok(existed)
    }

    /// Deletes every record, or every record of `kind`, after the reader
    /// confirms. Returns `false` when they declined.
    pub fn delete_all(
        &self,
        kind: Option<BookmarkType>,
        prompt: &dyn UserPrompt,
        localizer: &dyn Localizer,
        locale: &str,
    ) -> Result<bool> {
        let message_key = match kind {
            Some(BookmarkType::UserBookmark) => i18n::CONFIRM_DELETE_ALL_USER,
            Some(BookmarkType::LastLocation) => i18n::CONFIRM_DELETE_ALL_LAST,
            None => i18n::CONFIRM_DELETE_ALL,
        };
        if !prompt.confirm(&localizer.text(locale, message_key)) {
            tracing::debug!(?kind, "delete all declined");
            return Ok(false);
        }

        let mut removed = 0;
        for key in self.record_keys()? {
            let matches = match kind {
                None => true,
                Some(kind) => self.read(&key)?.is_some_and(|r| r.kind == kind),
            };
            if matches {
                self.local.remove_item(&key)?;
                removed += 1;
            }
        }
        tracing::info!(?kind, removed, "bookmarks cleared");
        Ok(true)
    }

    /// Every stored record after pruning, plus the subset lists should show.
    pub fn load_all(&self) -> Result<LoadedBookmarks> {
        let session_date = self.session.session_date()?;
        let mut all = Vec::new();
        for key in self.record_keys()? {
            if let Some(record) = self.read(&key)? {
                all.push(record);
            }
        }
        LastLocationPolicy::prune_all(self.local.as_ref(), &mut all, &session_date)?;
        all.sort_by(|a, b| b.session_millis().cmp(&a.session_millis()).then_with(|| a.key.cmp(&b.key)));

        let visible = all
            .iter()
            .filter(|r| !(r.kind == BookmarkType::LastLocation && r.session_date == session_date))
            .cloned()
            .collect();
        Ok(LoadedBookmarks { all, visible })
    }

    /// One record by key, read after the same pruning as [`Self::load_all`].
    pub fn get(&self, key: &str) -> Result<Option<BookmarkRecord>> {
        if !is_record_key(&self.prefix, key) {
            return Ok(None);
        }
        Ok(self.load_all()?.all.into_iter().find(|r| r.key == key))
    }

    fn record_keys(&self) -> Result<Vec<String>> {
        Ok(self.local.keys()?.into_iter().filter(|k| is_record_key(&self.prefix, k)).collect())
    }

    /// Malformed entries are logged and skipped, never deleted here.
    fn read(&self, key: &str) -> Result<Option<BookmarkRecord>> {
        let Some(raw) = self.local.get_item(key)? else { return Ok(None) };
        match serde_json::from_str::<BookmarkRecord>(&raw) {
            Ok(mut record) => {
                record.key = key.to_string();
                Ok(Some(record))
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "skipping malformed bookmark record");
                Ok(None)
            }
        }
    }
}
