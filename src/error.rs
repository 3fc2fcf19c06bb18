use thiserror::Error;

/// Failures reported by a catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalog returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
    },

    #[error("record {0} not found")]
    NotFound(i64),
}

/// Cancellation was signalled while a resolution was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("resolution cancelled")]
pub struct Cancelled;

/// Errors that end a resolution. "No match" is not one of them.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The keyword search itself failed; passed through unchanged.
    #[error(transparent)]
    Search(#[from] CatalogError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl ResolveError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Cancelled(_))
    }
}
