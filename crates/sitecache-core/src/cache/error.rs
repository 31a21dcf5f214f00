use thiserror::Error;

/// Failures the cache manager can observe.
///
/// Payloads are rendered messages so the error can be cloned to every
/// caller waiting on the same in-flight refresh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Failed to read cached content: {0}")]
    StoreRead(String),

    #[error("Failed to persist cached content: {0}")]
    StoreWrite(String),

    #[error("Failed to fetch content: {0}")]
    Fetch(String),
}

impl CacheError {
    /// Build a fetch error keeping the full anyhow context chain.
    pub fn fetch(err: &anyhow::Error) -> Self {
        CacheError::Fetch(format!("{:#}", err))
    }
}
