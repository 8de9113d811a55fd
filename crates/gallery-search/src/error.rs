//! Error types for the search crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The index cannot be reached or refused the request.
    #[error("search index unavailable: {0}")]
    Unavailable(String),

    /// The query could not be interpreted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("search index lock poisoned")]
    LockPoisoned,
}

/// Convenience alias for search results.
pub type SearchResult<T> = Result<T, SearchError>;
