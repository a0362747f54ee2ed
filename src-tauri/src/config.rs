use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkConfig {
    /// Namespace prefix of every durable storage key.
    pub key_prefix: String,
    /// Upper bound, in characters, of auto-derived descriptions.
    pub excerpt_chars: usize,
    /// Inward viewport margin, as a fraction of the viewport height, applied
    /// top and bottom before testing intersection.
    pub viewport_margin: f64,
    pub locale: String,
    /// `time` format description used for list dates.
    pub date_format: String,
}

impl Default for BookmarkConfig {
    fn default() -> Self {
        Self {
            key_prefix: "bookmark".into(),
            excerpt_chars: 50,
            viewport_margin: 0.1,
            locale: "en".into(),
            date_format: "[day padding:none] [month repr:short] [year], [hour]:[minute]".into(),
        }
    }
}

/// Reads `config.json` from `dir`. A missing file yields defaults silently;
/// an unreadable one yields defaults with a warning.
pub fn load_config(dir: &Path) -> BookmarkConfig {
    let p = dir.join(CONFIG_FILE);
    let bytes = match fs::read(&p) {
        Ok(bytes) => bytes,
        Err(_) => return BookmarkConfig::default(),
    };
    match serde_json::from_slice(&bytes) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, path = ?p, "invalid bookmark config, using defaults");
            BookmarkConfig::default()
        }
    }
}
