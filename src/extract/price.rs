use regex::Regex;
use std::sync::OnceLock;

fn thousands_group() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",(\d{3})").unwrap())
}

/// Normalizes a displayed price ("₹1,299.00", "$2,599.99") to a number.
/// Keeps `[0-9.,-]`, drops grouping commas before a 3-digit group, then
/// treats a remaining comma as the decimal point. Anything that does not
/// survive as a finite positive number is reported absent.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = thousands_group().replace_all(&cleaned, "$1").replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

/// Percent saved relative to the original price, rounded to the nearest
/// integer. Zero whenever the original price is absent or not above the
/// current price.
pub fn discount_percent(price: f64, original_price: Option<f64>) -> u32 {
    match original_price {
        Some(original) if original > price => {
            (((original - price) / original) * 100.0).round() as u32
        }
        _ => 0,
    }
}
