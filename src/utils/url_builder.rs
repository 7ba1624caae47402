//! URL assembly: base + relative path + encoded query string.

use crate::types::QueryParams;

/// Join the instance base URL with a request URL.
///
/// Absolute request URLs (`http://`, `https://`) are used unchanged; anything else is
/// appended to the base by plain concatenation.
pub fn join_base(base_url: &str, url: &str) -> String {
    if base_url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}{}", base_url, url)
    }
}

/// Append `params` to `url` as a percent-encoded query string.
///
/// List values become a single comma-joined segment under one key
/// (`ids=a%2Cb`), never repeated keys. Appends with `&` when `url` already
/// carries a query string. Returns `url` unchanged when `params` is `None` or empty.
pub fn build(url: &str, params: Option<&QueryParams>) -> String {
    let Some(params) = params.filter(|p| !p.is_empty()) else {
        return url.to_string();
    };

    let query = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&value.to_query_text())
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    if url.contains('?') {
        format!("{}&{}", url, query)
    } else {
        format!("{}?{}", url, query)
    }
}
