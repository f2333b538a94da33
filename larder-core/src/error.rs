use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Catalog unreachable: {0}")]
    Unreachable(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Catalog returned error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),
}

impl CatalogError {
    /// Classify a send failure: connection and timeout errors mean the catalog
    /// could not be reached at all.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            CatalogError::Unreachable(err.to_string())
        } else {
            CatalogError::RequestFailed(err)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CatalogError::RateLimited { .. })
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, CatalogError::Unreachable(_))
    }
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The request could not be issued to the catalog at all.
    #[error("Catalog request failed: {0}")]
    Catalog(#[from] CatalogError),
}
