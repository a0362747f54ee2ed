//! Key/value storage areas.
//!
//! Two flavours back the subsystem: a durable per-origin area holding the
//! bookmark records, and a session area that lives as long as one tab and
//! holds the session identifier and the fingerprint index. Both implement
//! [`StorageArea`]; values are opaque strings, usually JSON.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use crate::error::{BookmarkError, Result};

pub trait StorageArea: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
    /// All keys, in ascending order.
    fn keys(&self) -> Result<Vec<String>>;
    fn clear(&self) -> Result<()>;
}

/// In-memory area. Used for session storage and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl StorageArea for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.lock().keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        self.items.lock().clear();
        Ok(())
    }
}

/// Durable area persisted as a single JSON object on disk.
///
/// Every mutation rewrites the file through a temp file and a rename, so a
/// single key is never left half-written.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    let aside = Self::corrupt_path(&path);
                    fs::rename(&path, &aside)?;
                    tracing::warn!(error = %e, path = ?path, moved_to = ?aside, "storage file unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, items: Mutex::new(items) })
    }

    /// Where an unreadable file is kept so later writes cannot clobber it.
    pub fn corrupt_path(path: &Path) -> PathBuf {
        path.with_extension("json.corrupt")
    }

    /// Opens the area for `origin` inside `dir`, one file per origin.
    pub fn for_origin(dir: &Path, origin: &str) -> Result<Self> {
        let name = crate::keys::slugify(origin);
        if name.is_empty() {
            return Err(BookmarkError::Storage(format!("unusable origin {origin:?}")));
        }
        Self::open(dir.join(format!("{name}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StorageArea for JsonFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.lock().keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        let mut items = self.items.lock();
        items.clear();
        self.write_all(&items)
    }
}
