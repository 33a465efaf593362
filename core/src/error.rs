use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The document store is unreachable or failed mid-operation. Fatal to
    /// the enclosing request, safe to retry.
    #[error("store unavailable: {0}")]
    Store(#[from] sled::Error),

    /// Persisted postings or documents failed to decode.
    #[error("corrupt persisted state: {0}")]
    Codec(#[from] bincode::Error),

    /// Persisted corpus metadata failed to decode.
    #[error("corrupt persisted metadata: {0}")]
    Meta(#[from] serde_json::Error),

    /// A malformed field or document. Callers log and skip; this never
    /// aborts a batch.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl SearchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::Store(_))
    }
}
