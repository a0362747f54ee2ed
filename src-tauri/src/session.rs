use std::sync::Arc;

use time::OffsetDateTime;

use crate::{error::Result, keys::SESSION_DATE_KEY, storage::StorageArea};

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

/// Hands out the tab's session identifier, a millisecond timestamp created
/// on first access and kept in session storage.
#[derive(Clone)]
pub struct SessionManager {
    storage: Arc<dyn StorageArea>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn StorageArea>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn session_date(&self) -> Result<String> {
        if let Some(existing) = self.storage.get_item(SESSION_DATE_KEY)? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }
        let created = self.clock.now_millis().to_string();
        self.storage.set_item(SESSION_DATE_KEY, &created)?;
        tracing::debug!(session = %created, "new bookmark session");
        Ok(created)
    }
}
