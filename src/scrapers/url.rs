//! Search page URLs

/// Build the URL of one search result page.
///
/// `query` must already be escaped by the caller.
pub fn build_url(base_url: &str, query: &str, category: Option<&str>, page: u32) -> String {
    let mut url = format!("{}/torrents/find/", base_url);

    if let Some(segment) = category {
        url.push_str(&format!("1/{}/", segment));
    }

    format!("{}:{}?title={}", url, page, query)
}
