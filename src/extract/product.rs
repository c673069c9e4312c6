use log::debug;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

use super::affiliate::rewrite_affiliate;
use super::blocked::is_blocked;
use super::jsonld;
use super::price::{discount_percent, parse_price};
use super::title::clean_title;
use super::{element_text, first_attr, first_text, sel};
use crate::core::{ScrapeError, ScrapeResult};

/// Structured product data recovered from one item page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProduct {
    pub title: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount: u32,
    pub image: String,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub category: String,
    pub features: Vec<String>,
    pub description: String,
    pub identifier: String,
    pub source: String,
    pub source_url: String,
    pub affiliate_url: String,
}

const SOURCE_LABEL: &str = "Amazon";

const TITLE_SELECTORS: &[&str] = &[
    "#productTitle",
    "#title",
    "h1#title",
    "span#productTitle",
    "h1.a-size-large",
    ".product-title-word-break",
    "h1.a-text-normal",
    "#ebooksProductTitle",
    "#gc-title",
];

const META_TITLE_SELECTORS: &[&str] = &[
    r#"meta[property="og:title"]"#,
    r#"meta[name="title"]"#,
    r#"meta[name="twitter:title"]"#,
    r#"meta[itemprop="name"]"#,
];

const PRICE_SELECTORS: &[&str] = &[
    r#"span.a-price[data-a-size="xl"] span.a-offscreen"#,
    ".priceToPay span.a-offscreen",
    "#priceblock_ourprice",
    "#priceblock_dealprice",
    "#priceblock_saleprice",
    ".a-price .a-offscreen",
    "span.aok-offscreen",
    r#"[data-a-color="price"] span"#,
    r#".a-price[data-a-size="xl"] span"#,
];

const ORIGINAL_PRICE_SELECTORS: &[&str] = &[
    ".basisPrice .a-text-price span",
    ".a-price.a-text-price span.a-offscreen",
    "#listPrice",
    "#priceblock_saleprice_row",
    r#".a-text-price[data-a-strike="true"]"#,
    ".a-price.a-text-price .a-offscreen",
    ".wasPrice",
];

const IMAGE_SELECTORS: &[&str] = &[
    "#landingImage",
    "#imgTagWrapperId img",
    "#main-image-container img",
    "#imageBlock img",
    "div.image-wrapper img",
    "img[data-old-hires]",
    r#"img[data-a-image-name="landingImage"]"#,
    "img[data-a-dynamic-image]",
];

const CATEGORY_SELECTORS: &[&str] = &[
    "#wayfinding-breadcrumbs_container ul li:last-child span a",
    "#nav-subnav .nav-a-content",
    "#nav-breadcrumb a",
    ".a-breadcrumb li:last-child a",
    "#dp-title-widget-ays-title",
];

/// Extracts a product from a parsed item page. Block detection runs
/// first; afterwards each field is resolved by its prioritized strategy
/// chain and only the mandatory fields (title, price) can fail the item.
pub fn extract_product(
    doc: &Html,
    source_url: &Url,
    affiliate_tag: &str,
) -> ScrapeResult<ExtractedProduct> {
    if is_blocked(doc) {
        return Err(ScrapeError::Blocked(source_url.clone()));
    }

    let title = extract_title(doc).ok_or_else(|| ScrapeError::Extraction {
        field: "title",
        url: source_url.clone(),
    })?;
    let price = extract_price(doc).ok_or_else(|| ScrapeError::Extraction {
        field: "price",
        url: source_url.clone(),
    })?;

    let original_price = extract_original_price(doc).filter(|original| *original > price);
    let discount = discount_percent(price, original_price);

    Ok(ExtractedProduct {
        title,
        price,
        original_price,
        discount,
        image: extract_image(doc),
        rating: extract_rating(doc),
        review_count: extract_review_count(doc),
        category: extract_category(doc),
        features: extract_features(doc),
        description: extract_description(doc),
        identifier: extract_identifier(doc, source_url),
        source: SOURCE_LABEL.to_string(),
        source_url: source_url.to_string(),
        affiliate_url: rewrite_affiliate(source_url.as_str(), affiliate_tag),
    })
}

/// Title strategies, most precise first; the first one producing a
/// non-empty cleaned title wins.
fn extract_title(doc: &Html) -> Option<String> {
    let strategies: &[fn(&Html) -> Option<String>] = &[
        structural_title,
        meta_title,
        structured_data_title,
        page_title,
    ];
    strategies.iter().find_map(|strategy| strategy(doc))
}

fn structural_title(doc: &Html) -> Option<String> {
    first_text(doc, TITLE_SELECTORS).and_then(|raw| clean_title(&raw))
}

fn meta_title(doc: &Html) -> Option<String> {
    first_attr(doc, META_TITLE_SELECTORS, "content").and_then(|raw| clean_title(&raw))
}

fn structured_data_title(doc: &Html) -> Option<String> {
    jsonld::product_name(doc).and_then(|raw| clean_title(&raw))
}

fn page_title(doc: &Html) -> Option<String> {
    first_text(doc, &["title"])
        .and_then(|raw| clean_title(&raw))
        .filter(|cleaned| !cleaned.to_lowercase().contains("page not found"))
}

fn extract_price(doc: &Html) -> Option<f64> {
    let strategies: &[fn(&Html) -> Option<f64>] =
        &[displayed_price, structured_data_price, data_attribute_price];
    strategies.iter().find_map(|strategy| strategy(doc))
}

fn displayed_price(doc: &Html) -> Option<f64> {
    PRICE_SELECTORS.iter().find_map(|selector| {
        doc.select(&sel(selector))
            .next()
            .and_then(|el| parse_price(&element_text(&el)))
    })
}

fn structured_data_price(doc: &Html) -> Option<f64> {
    jsonld::offer_price(doc)
}

fn data_attribute_price(doc: &Html) -> Option<f64> {
    first_attr(
        doc,
        &["#corePriceDisplay_desktop_feature_div"],
        "data-price-amount",
    )
    .and_then(|raw| parse_price(&raw))
}

fn extract_original_price(doc: &Html) -> Option<f64> {
    ORIGINAL_PRICE_SELECTORS.iter().find_map(|selector| {
        doc.select(&sel(selector))
            .next()
            .and_then(|el| parse_price(&element_text(&el)))
    })
}

fn extract_image(doc: &Html) -> String {
    for selector in IMAGE_SELECTORS {
        let Some(element) = doc.select(&sel(selector)).next() else {
            continue;
        };
        let attrs = element.value();
        let image = attrs
            .attr("data-old-hires")
            .or_else(|| attrs.attr("src"))
            .or_else(|| attrs.attr("data-src"))
            .map(str::to_string)
            .or_else(|| attrs.attr("data-a-dynamic-image").and_then(first_quoted_url));
        if let Some(image) = image.filter(|i| !i.is_empty()) {
            return image;
        }
    }

    first_attr(doc, &[r#"meta[property="og:image"]"#], "content").unwrap_or_default()
}

fn first_quoted_url(dynamic_image: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#""([^"]+)""#).unwrap());
    re.captures(dynamic_image)
        .map(|captures| captures[1].to_string())
}

fn extract_rating(doc: &Html) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+\.?\d*").unwrap());

    let text = first_text(
        doc,
        &["i.a-icon-star span.a-icon-alt, .reviewCountTextLinkedHistogram"],
    )?;
    re.find(&text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|rating| (0.0..=5.0).contains(rating))
}

fn extract_review_count(doc: &Html) -> u32 {
    first_text(doc, &["#acrCustomerReviewText, #acrCustomerReviewLink"])
        .map(|text| text.chars().filter(char::is_ascii_digit).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

fn extract_category(doc: &Html) -> String {
    first_text(doc, CATEGORY_SELECTORS).unwrap_or_else(|| "Unknown".to_string())
}

/// Bullet features from the primary region, hidden entries skipped, then
/// the technical-details region; never empty in the output.
fn extract_features(doc: &Html) -> Vec<String> {
    let mut features: Vec<String> = doc
        .select(&sel("#feature-bullets li, #detailBullets_feature_div li"))
        .filter(|el| !el.value().classes().any(|class| class == "aok-hidden"))
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .collect();

    if features.is_empty() {
        features = doc
            .select(&sel("#prodDetails .a-spacing-small, .product-facts-detail"))
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty())
            .collect();
    }

    if features.is_empty() {
        features.push("No features listed".to_string());
    }
    features
}

fn extract_description(doc: &Html) -> String {
    first_text(doc, &["#productDescription"])
        .or_else(|| first_text(doc, &["#feature-bullets"]).map(|text| truncate(&text, 500)))
        .or_else(|| first_text(doc, &[".productDescriptionWrapper"]).map(|text| truncate(&text, 500)))
        .or_else(|| first_attr(doc, &[r#"meta[name="description"]"#], "content"))
        .unwrap_or_default()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// 10-character item code from the canonical item-page path segment.
pub fn identifier_from_url(url: &Url) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"/(?:dp|gp/product)/([A-Z0-9]{10})(?:/|$)").unwrap());
    re.captures(url.path())
        .map(|captures| captures[1].to_string())
}

fn extract_identifier(doc: &Html, source_url: &Url) -> String {
    if let Some(identifier) = identifier_from_url(source_url) {
        return identifier;
    }
    let hidden = first_attr(doc, &["#ASIN"], "value")
        .or_else(|| first_attr(doc, &[r#"input[name="ASIN"], input[name="asin"]"#], "value"));
    match hidden {
        Some(identifier) => identifier,
        None => {
            debug!("No item identifier found for {}", source_url);
            String::new()
        }
    }
}
