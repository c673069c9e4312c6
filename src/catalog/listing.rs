use log::debug;
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

use crate::extract::{self, is_blocked};

/// Parsed listing page: discovered candidate item URLs, the explicit
/// next-page signal, and whether the page was a challenge page.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub candidates: Vec<Url>,
    pub has_next: bool,
    pub blocked: bool,
}

/// Path markers of item types the catalog cannot represent as physical
/// goods; candidates matching any are dropped before fetching.
fn unsupported_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)/ebook/",
            r"(?i)/dp/B0\w+-Kindle",
            r"(?i)/digital/",
            r"(?i)/software/",
            r"(?i)/mp3/",
            r"(?i)/video/",
            r"(?i)/prime-video/",
            r"(?i)/music/",
            r"(?i)/app/",
            r"(?i)/subscription/",
            r"(?i)/streaming/",
            r"(?i)/dgtl/",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
    })
}

pub fn is_supported_product(url: &str) -> bool {
    !unsupported_patterns().iter().any(|re| re.is_match(url))
}

/// Walks the result cards of a listing page and collects candidate item
/// URLs: query-stripped, joined against the base URL, order-preserving
/// deduped, filtered through the content-type allowlist.
pub fn parse_listing(body: &str, base: &Url) -> ListingPage {
    let doc = Html::parse_document(body);

    if is_blocked(&doc) {
        return ListingPage {
            candidates: Vec::new(),
            has_next: false,
            blocked: true,
        };
    }

    let card_selector = extract::sel(r#"div[data-component-type="s-search-result"]"#);
    let link_selector = extract::sel("a.a-link-normal.s-no-outline");

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for card in doc.select(&card_selector) {
        let Some(href) = card
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
        else {
            continue;
        };
        if !href.starts_with('/') {
            continue;
        }

        let path = href.split('?').next().unwrap_or(href);
        let Ok(url) = base.join(path) else {
            continue;
        };

        if !is_supported_product(url.as_str()) {
            debug!("Skipping unsupported item type: {}", url);
            continue;
        }
        if seen.insert(url.to_string()) {
            candidates.push(url);
        }
    }

    ListingPage {
        candidates,
        has_next: has_next_page(&doc),
        blocked: false,
    }
}

fn has_next_page(doc: &Html) -> bool {
    doc.select(&extract::sel(".s-pagination-next"))
        .next()
        .map(|el| {
            !el.value()
                .classes()
                .any(|class| class == "s-pagination-disabled")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.amazon.in").unwrap()
    }

    fn card(href: &str) -> String {
        format!(
            r#"<div data-component-type="s-search-result">
                 <a class="a-link-normal s-no-outline" href="{href}">item</a>
               </div>"#
        )
    }

    #[test]
    fn collects_candidates_and_strips_queries() {
        let body = format!(
            "<html><body>{}{}</body></html>",
            card("/Acme-Widget/dp/B0AAAAAAA1?qid=1&sr=8-1"),
            card("/Other-Widget/dp/B0AAAAAAA2/"),
        );
        let listing = parse_listing(&body, &base());

        assert_eq!(listing.candidates.len(), 2);
        assert_eq!(
            listing.candidates[0].as_str(),
            "https://www.amazon.in/Acme-Widget/dp/B0AAAAAAA1"
        );
        assert!(!listing.blocked);
    }

    #[test]
    fn filters_unsupported_item_types() {
        let body = format!(
            "<html><body>{}{}{}</body></html>",
            card("/Acme-Widget/dp/B0AAAAAAA1/"),
            card("/ebook/dp/B0AAAAAAA2/"),
            card("/Other-Widget/dp/B0AAAAAAA3/"),
        );
        let listing = parse_listing(&body, &base());

        assert_eq!(listing.candidates.len(), 2);
        assert!(listing
            .candidates
            .iter()
            .all(|url| !url.as_str().contains("/ebook/")));
    }

    #[test]
    fn dedupes_repeated_links_preserving_order() {
        let body = format!(
            "<html><body>{}{}{}</body></html>",
            card("/Acme-Widget/dp/B0AAAAAAA1/"),
            card("/Acme-Widget/dp/B0AAAAAAA1/"),
            card("/Other-Widget/dp/B0AAAAAAA2/"),
        );
        let listing = parse_listing(&body, &base());

        assert_eq!(listing.candidates.len(), 2);
        assert!(listing.candidates[0].as_str().contains("B0AAAAAAA1"));
    }

    #[test]
    fn ignores_offsite_and_relative_links() {
        let body = format!(
            "<html><body>{}{}</body></html>",
            card("https://elsewhere.example/dp/B0AAAAAAA1"),
            card("Acme-Widget/dp/B0AAAAAAA2"),
        );
        let listing = parse_listing(&body, &base());
        assert!(listing.candidates.is_empty());
    }

    #[test]
    fn next_page_signal() {
        let with_next = r#"<html><body><a class="s-pagination-next" href="/s?page=2">Next</a></body></html>"#;
        assert!(parse_listing(with_next, &base()).has_next);

        let disabled = r#"<html><body><span class="s-pagination-next s-pagination-disabled">Next</span></body></html>"#;
        assert!(!parse_listing(disabled, &base()).has_next);

        let absent = "<html><body></body></html>";
        assert!(!parse_listing(absent, &base()).has_next);
    }

    #[test]
    fn challenge_page_is_flagged_blocked() {
        let body = "<html><head><title>Robot Check</title></head><body></body></html>";
        let listing = parse_listing(body, &base());
        assert!(listing.blocked);
        assert!(listing.candidates.is_empty());
    }

    #[test]
    fn supported_product_patterns() {
        assert!(is_supported_product(
            "https://www.amazon.in/Acme-Widget/dp/B0AAAAAAA1"
        ));
        assert!(!is_supported_product("https://www.amazon.in/ebook/dp/B0A"));
        assert!(!is_supported_product(
            "https://www.amazon.in/prime-video/detail/X"
        ));
    }
}
