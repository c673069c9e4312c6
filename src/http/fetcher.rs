use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use super::headers::HeaderRotator;
use super::response::PageResponse;
use crate::core::{FetchError, FetchErrorKind};

/// Retry and timeout policy for a fetcher. `max_retries` is the total
/// attempt budget, not the number of re-tries after the first attempt.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(3),
            timeout: Duration::from_secs(15),
        }
    }
}

impl FetchPolicy {
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &Url) -> Result<PageResponse, FetchError>;
}

/// HTTP fetcher with bounded retries, linear backoff and a fresh rotated
/// header set per attempt. Holds no mutable state across fetches.
pub struct HttpFetcher {
    client: Client,
    headers: HeaderRotator,
    policy: FetchPolicy,
}

impl HttpFetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new()
            .timeout(policy.timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self {
            client,
            headers: HeaderRotator::new(),
            policy,
        })
    }

    async fn attempt(&self, url: &Url) -> Result<(u16, String), FetchErrorKind> {
        let response = self
            .client
            .get(url.clone())
            .headers(self.headers.next())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchErrorKind::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify)?;
        Ok((status.as_u16(), body))
    }
}

fn classify(error: reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else {
        FetchErrorKind::Network
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &Url) -> Result<PageResponse, FetchError> {
        let mut last_kind = FetchErrorKind::Network;

        for attempt in 1..=self.policy.max_retries {
            debug!("Fetching {} (attempt {}/{})", url, attempt, self.policy.max_retries);
            match self.attempt(url).await {
                Ok((status, body)) => {
                    info!(
                        "Fetched {} (status={}, bytes={}, attempts={})",
                        url,
                        status,
                        body.len(),
                        attempt
                    );
                    return Ok(PageResponse {
                        url: url.clone(),
                        status,
                        body,
                        fetched_at: Utc::now(),
                        attempts: attempt,
                    });
                }
                Err(kind) => {
                    warn!(
                        "Attempt {}/{} failed for {}: {:?}",
                        attempt, self.policy.max_retries, url, kind
                    );
                    last_kind = kind;
                    if attempt < self.policy.max_retries {
                        sleep(self.policy.base_delay * attempt as u32).await;
                    }
                }
            }
        }

        Err(FetchError {
            kind: last_kind,
            url: url.clone(),
            attempts: self.policy.max_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quick_policy() -> FetchPolicy {
        FetchPolicy::default().with_base_delay(Duration::from_millis(10))
    }

    async fn setup() -> (HttpFetcher, MockServer) {
        let server = MockServer::start().await;
        let fetcher = HttpFetcher::new(quick_policy()).unwrap();
        (fetcher, server)
    }

    #[tokio::test]
    async fn succeeds_first_attempt() {
        let (fetcher, server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap().join("/page").unwrap();
        let response = fetcher.get(&url).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "hello");
        assert_eq!(response.attempts, 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let (fetcher, server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap().join("/flaky").unwrap();
        let response = fetcher.get(&url).await.unwrap();

        assert_eq!(response.body, "recovered");
        assert_eq!(response.attempts, 3);
    }

    #[tokio::test]
    async fn fails_after_retry_budget() {
        let (fetcher, server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap().join("/down").unwrap();
        let error = fetcher.get(&url).await.unwrap_err();

        assert_eq!(error.attempts, 3);
        assert_eq!(error.kind, FetchErrorKind::Status(500));
    }

    #[tokio::test]
    async fn sends_rotated_browser_headers() {
        let (fetcher, server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header_exists("user-agent"))
            .and(header_exists("accept-language"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let response = fetcher.get(&url).await.unwrap();
        assert_eq!(response.status, 200);
    }
}
