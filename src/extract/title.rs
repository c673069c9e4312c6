use regex::Regex;
use std::sync::OnceLock;

fn site_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(Amazon\.(com|co\.uk|ca|de|fr|it|es|jp|in|com\.br|com\.mx|ae|sa|se|nl|com\.tr)| : |\s+-\s+Amazon\.).*",
        )
        .unwrap()
    })
}

fn asides() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").unwrap())
}

fn boilerplate() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:Brand:|by\s+\w+|Visit\s+the\s+\w+\s+Store)\s*").unwrap())
}

fn multi_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").unwrap())
}

/// Deterministic title cleanup: drop site-name suffixes, bracketed and
/// parenthetical asides, storefront boilerplate, then collapse runs of
/// whitespace. Titles that clean down to nothing are reported absent so
/// the next strategy in the chain gets a chance.
pub fn clean_title(raw: &str) -> Option<String> {
    let stripped = site_suffix().replace_all(raw, "");
    let stripped = asides().replace_all(&stripped, "");
    let stripped = boilerplate().replace_all(&stripped, "");
    let cleaned = multi_whitespace().replace_all(&stripped, " ").trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}
