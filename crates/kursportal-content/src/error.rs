//! Content loading error types.

/// Result type alias for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Errors surfaced by the JSON content loader.
///
/// The lesson loader deliberately never returns these: missing courses and
/// lessons degrade to empty listings / `None`, and malformed front-matter is
/// swallowed (see [`crate::lessons`]).
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Document not found in either search location.
    #[error("content document not found: {0}")]
    NotFound(String),

    /// Document exists but is not valid JSON. Propagated untouched to the
    /// caller, never swallowed.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure other than not-found.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
