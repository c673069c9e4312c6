mod affiliate;
mod blocked;
mod jsonld;
mod price;
mod product;
mod title;


pub use affiliate::rewrite_affiliate;
pub use blocked::is_blocked;
pub use price::{discount_percent, parse_price};
pub use product::{extract_product, identifier_from_url, ExtractedProduct};
pub use title::clean_title;

use scraper::{ElementRef, Html, Selector};

/// Selectors are static strings; a parse failure is a programming error.
pub(crate) fn sel(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

/// First non-empty text content across an ordered selector chain.
pub(crate) fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        if let Some(element) = doc.select(&sel(selector)).next() {
            let text = element_text(&element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First non-empty attribute value across an ordered selector chain.
pub(crate) fn first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    for selector in selectors {
        if let Some(value) = doc
            .select(&sel(selector))
            .next()
            .and_then(|el| el.value().attr(attr))
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
