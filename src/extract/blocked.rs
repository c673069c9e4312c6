use scraper::Html;

use super::sel;

/// Markers of the site's automated-access challenge page. Checked before
/// any field extraction so a challenge page can never produce a
/// partially-populated product.
pub fn is_blocked(doc: &Html) -> bool {
    let title = doc
        .select(&sel("title"))
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();
    if title.contains("Robot Check") {
        return true;
    }

    if doc.select(&sel("#captchacharacters")).next().is_some() {
        return true;
    }

    doc.select(&sel("body"))
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
        .contains("Enter the characters you see below")
}
