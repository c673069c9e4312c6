use chrono::{DateTime, Utc};
use url::Url;

/// A fetched page, after retries have resolved.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub url: Url,
    pub status: u16,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
    /// Attempts spent on this fetch, successful one included.
    pub attempts: usize,
}
