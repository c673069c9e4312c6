use scraper::Html;
use serde_json::Value;

use super::price::parse_price;
use super::sel;

/// All embedded structured-data nodes on the page, with top-level arrays
/// flattened. Blocks are parsed as-is first, then once more with
/// backslashes stripped — the site ships over-escaped JSON in some
/// templates.
pub fn structured_nodes(doc: &Html) -> Vec<Value> {
    let selector = sel(r#"script[type="application/ld+json"]"#);
    let mut nodes = Vec::new();
    for script in doc.select(&selector) {
        let raw = script.text().collect::<String>();
        let Some(parsed) = parse_lenient(&raw) else {
            continue;
        };
        match parsed {
            Value::Array(items) => nodes.extend(items),
            other => nodes.push(other),
        }
    }
    nodes
}

fn parse_lenient(raw: &str) -> Option<Value> {
    serde_json::from_str(raw)
        .ok()
        .or_else(|| serde_json::from_str(&raw.replace('\\', "")).ok())
}

fn is_product(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(kind)) => kind.contains("Product"),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .any(|kind| kind.as_str().is_some_and(|s| s.contains("Product"))),
        _ => false,
    }
}

/// Product name from structured data: a Product node's `name`, or any
/// node's `title` as a weaker fallback.
pub fn product_name(doc: &Html) -> Option<String> {
    let nodes = structured_nodes(doc);
    for node in &nodes {
        if is_product(node) {
            if let Some(name) = node.get("name").and_then(Value::as_str) {
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
    }
    nodes
        .iter()
        .find_map(|node| node.get("title").and_then(Value::as_str))
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}

/// Offer price from structured data; takes the first offer when the
/// `offers` field is an array.
pub fn offer_price(doc: &Html) -> Option<f64> {
    for node in structured_nodes(doc) {
        let Some(offers) = node.get("offers") else {
            continue;
        };
        let offer = match offers {
            Value::Array(list) => list.first(),
            other => Some(other),
        };
        if let Some(price) = offer
            .and_then(|o| o.get("price"))
            .and_then(price_value)
        {
            return Some(price);
        }
    }
    None
}

fn price_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|p| p.is_finite() && *p > 0.0),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(script: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><head><script type="application/ld+json">{script}</script></head><body></body></html>"#
        ))
    }

    #[test]
    fn product_name_from_object() {
        let doc = page(r#"{"@type": "Product", "name": "Widget"}"#);
        assert_eq!(product_name(&doc), Some("Widget".to_string()));
    }

    #[test]
    fn product_name_from_array_block() {
        let doc = page(
            r#"[{"@type": "BreadcrumbList"}, {"@type": ["Thing", "Product"], "name": "Widget"}]"#,
        );
        assert_eq!(product_name(&doc), Some("Widget".to_string()));
    }

    #[test]
    fn over_escaped_block_is_recovered() {
        let doc = page(r#"{"@type": "Product", "name": "Widget\"}"#);
        assert_eq!(product_name(&doc), Some("Widget".to_string()));
    }

    #[test]
    fn offer_price_from_object_and_array() {
        let doc = page(r#"{"@type": "Product", "offers": {"price": "1,299.00"}}"#);
        assert_eq!(offer_price(&doc), Some(1299.0));

        let doc = page(r#"{"@type": "Product", "offers": [{"price": 499}, {"price": 999}]}"#);
        assert_eq!(offer_price(&doc), Some(499.0));
    }

    #[test]
    fn missing_structured_data_is_absent() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert_eq!(product_name(&doc), None);
        assert_eq!(offer_price(&doc), None);
    }
}
