use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER, USER_AGENT};

/// Real browser signatures; the pool must stay non-empty so a rotated
/// header set always carries a User-Agent.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/115.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36 Edg/117.0.2045.60",
];

const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Produces a plausible per-request browser identity. The User-Agent is
/// drawn uniformly at random; the companion headers are constant.
#[derive(Debug, Clone, Default)]
pub struct HeaderRotator;

impl HeaderRotator {
    pub fn new() -> Self {
        Self
    }

    pub fn next(&self) -> HeaderMap {
        let agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(agent));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-IN,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_is_never_empty() {
        let rotator = HeaderRotator::new();
        for _ in 0..100 {
            let headers = rotator.next();
            let agent = headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            assert!(!agent.is_empty());
            assert!(USER_AGENTS.contains(&agent));
        }
    }

    #[test]
    fn companion_headers_are_present() {
        let headers = HeaderRotator::new().next();
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
        assert!(headers.contains_key(REFERER));
        assert!(headers.contains_key(CONNECTION));
    }
}
