//! Client-side bookmarks for web-delivered books.
//!
//! Readers can save one bookmark per book, and the page they leave is
//! remembered as a "last location" for the previous and the current
//! session. Records live in durable per-origin storage; the session
//! identifier and a fingerprint index live in tab-scoped storage.
//!
//! Start-up order: wait for [`Readiness`], then [`UiController::start`]
//! builds the session, the fingerprint index, loads and prunes records and
//! reconciles the page. Afterwards every [`UiEvent`] goes through
//! [`UiController::handle`].

pub mod capabilities;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod fingerprint;
pub mod i18n;
pub mod keys;
pub mod models;
pub mod policy;
pub mod prompt;
pub mod readiness;
pub mod reconcile;
pub mod selection;
pub mod session;
pub mod storage;
pub mod store;
pub mod util;
pub mod visibility;

pub use capabilities::Capabilities;
pub use config::{load_config, BookmarkConfig};
pub use controller::{EventOutcome, Services, Startup, UiController, UiEvent, UiState};
pub use document::{Document, Element, NodeId};
pub use error::{BookmarkError, Result};
pub use fingerprint::{FingerprintIndex, Resolution};
pub use models::{BookmarkRecord, BookmarkType, LoadedBookmarks, OpenTarget};
pub use readiness::Readiness;
pub use storage::{JsonFileStorage, MemoryStorage, StorageArea};
pub use store::BookmarkStore;
