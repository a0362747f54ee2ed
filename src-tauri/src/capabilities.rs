use serde::{Deserialize, Serialize};

use crate::error::{BookmarkError, Result};

/// Host features the subsystem cannot work without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub intersection_observer: bool,
    pub selection_api: bool,
    pub local_storage: bool,
}

impl Capabilities {
    pub const FULL: Capabilities = Capabilities { intersection_observer: true, selection_api: true, local_storage: true };

    pub fn check(&self) -> Result<()> {
        let mut missing = Vec::new();
        if !self.intersection_observer {
            missing.push("IntersectionObserver");
        }
        if !self.selection_api {
            missing.push("Selection API");
        }
        if !self.local_storage {
            missing.push("localStorage");
        }
        if missing.is_empty() { Ok(()) } else { Err(BookmarkError::Unsupported(missing)) }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}
