use crate::store::StoreError;
use thiserror::Error;
use url::Url;

/// Why a fetch attempt (or the whole fetch) failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Status(u16),
    Network,
}

/// Terminal fetch failure, produced only after the retry budget is spent.
#[derive(Error, Debug, Clone)]
#[error("fetch of {url} failed after {attempts} attempt(s): {kind:?}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub url: Url,
    pub attempts: usize,
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The remote flagged the request as automated. Transient at the page
    /// level: the caller drops the current page and moves on.
    #[error("blocked by target site at {0}")]
    Blocked(Url),

    #[error("extraction failed for {url}: missing {field}")]
    Extraction { field: &'static str, url: Url },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("publish error: {0}")]
    Publish(String),
}

impl ScrapeError {
    pub fn is_blocked(&self) -> bool {
        matches!(self, ScrapeError::Blocked(_))
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
