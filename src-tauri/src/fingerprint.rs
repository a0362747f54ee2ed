//! Fingerprint → identifier snapshot used to notice that a page was
//! reorganised under a bookmark.
//!
//! The index only sees the page as it was when [`FingerprintIndex::build`]
//! last ran. It cannot detect a change that also altered the fingerprint.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    document::Document,
    error::Result,
    i18n::{self, Localizer},
    keys::INDEX_KEY,
    prompt::UserPrompt,
    storage::StorageArea,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No such element, or nothing to compare it against.
    NotFound,
    Verified(String),
    /// The index holds a different identifier for this element's fingerprint.
    Drifted { indexed: String, live: String },
}

impl Resolution {
    pub fn is_verified(&self) -> bool {
        matches!(self, Resolution::Verified(_))
    }
}

pub struct FingerprintIndex {
    storage: Arc<dyn StorageArea>,
}

impl FingerprintIndex {
    pub fn new(storage: Arc<dyn StorageArea>) -> Self {
        Self { storage }
    }

    /// Replaces the stored index with one taken from `doc`. Returns the
    /// number of fingerprints indexed.
    pub fn build(&self, doc: &Document) -> Result<usize> {
        let mut index = BTreeMap::new();
        for (_, element) in doc.identified() {
            if let (Some(fp), Some(id)) = (element.fingerprint.as_deref(), element.id()) {
                index.insert(fp.to_string(), id.to_string());
            }
        }
        self.storage.set_item(INDEX_KEY, &serde_json::to_string(&index)?)?;
        tracing::debug!(entries = index.len(), "fingerprint index built");
        Ok(index.len())
    }

    fn load(&self) -> Result<Option<BTreeMap<String, String>>> {
        let Some(raw) = self.storage.get_item(INDEX_KEY)? else { return Ok(None) };
        match serde_json::from_str(&raw) {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                tracing::warn!(error = %e, "fingerprint index unreadable, ignoring");
                Ok(None)
            }
        }
    }

    /// Checks `element_id` against the index. A drift raises one alert
    /// through `prompt`.
    pub fn resolve(
        &self,
        doc: &Document,
        element_id: &str,
        prompt: &dyn UserPrompt,
        localizer: &dyn Localizer,
        locale: &str,
    ) -> Result<Resolution> {
        let Some(element) = doc.by_id(element_id) else { return Ok(Resolution::NotFound) };
        let Some(fp) = element.fingerprint.as_deref() else { return Ok(Resolution::NotFound) };
        let Some(index) = self.load()? else { return Ok(Resolution::NotFound) };
        let Some(indexed) = index.get(fp) else { return Ok(Resolution::NotFound) };

        if indexed == element_id {
            return Ok(Resolution::Verified(element_id.to_string()));
        }
        tracing::warn!(fingerprint = fp, indexed = %indexed, live = element_id, "bookmark target drifted");
        prompt.alert(&localizer.text(locale, i18n::FINGERPRINT_MISMATCH));
        Ok(Resolution::Drifted { indexed: indexed.clone(), live: element_id.to_string() })
    }
}
