use log::debug;
use url::Url;

/// Rewrites an item URL to carry the tracking tag. The canonical tag is
/// suffixed with the host's top-level domain so per-locale tracking stays
/// distinct; both the overwrite and append paths write the same canonical
/// value, which makes the transform idempotent. Unrecognized domains pass
/// through unchanged — a bad link must not fail the pipeline.
pub fn rewrite_affiliate(original: &str, tag: &str) -> String {
    let Ok(mut url) = Url::parse(original) else {
        debug!("Affiliate rewrite skipped, unparsable URL: {}", original);
        return original.to_string();
    };

    let Some(host) = url.host_str().map(str::to_string) else {
        debug!("Affiliate rewrite skipped, no host: {}", original);
        return original.to_string();
    };
    if !host.contains("amazon.") {
        debug!("Affiliate rewrite skipped, foreign domain: {}", host);
        return original.to_string();
    }

    let canonical = match host.rsplit('.').next() {
        Some(tld) if !tld.is_empty() => format!("{tag}-{tld}"),
        _ => tag.to_string(),
    };

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "tag")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut editor = url.query_pairs_mut();
        editor.clear();
        editor.extend_pairs(retained);
        editor.append_pair("tag", &canonical);
    }

    url.to_string()
}
