use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookmarkError {
    /// A browser capability the subsystem needs is missing.
    #[error("bookmarks unavailable, missing: {}", .0.join(", "))]
    Unsupported(Vec<&'static str>),

    #[error("no bookmarkable element on this page")]
    NoTarget,

    #[error("no element with id {0:?}")]
    ElementNotFound(String),

    #[error("no stored bookmark at {0:?}")]
    UnknownBookmark(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("bookmarks have not started yet")]
    NotReady,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BookmarkError>;
