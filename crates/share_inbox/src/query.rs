//! Share payloads carried in the page URL.

use share_contract::{
    extract_share_payload, parse_request_url, SharePayload, SHARE_SUCCESS_PARAM,
    SHARE_TARGET_MARKER, TEXT_PARAM, TITLE_PARAM, URL_PARAM,
};

const SHARE_QUERY_KEYS: [&str; 5] = [
    TITLE_PARAM,
    TEXT_PARAM,
    URL_PARAM,
    SHARE_TARGET_MARKER,
    SHARE_SUCCESS_PARAM,
];

fn is_share_key(key: &str) -> bool {
    SHARE_QUERY_KEYS.iter().any(|candidate| *candidate == key)
}

fn page_url(pathname: &str, search: &str) -> Option<url::Url> {
    let search = search.trim_start_matches('?');
    if search.is_empty() {
        parse_request_url(pathname)
    } else {
        parse_request_url(&format!("{pathname}?{search}"))
    }
}

/// Reads a share from a page query string. Blank payloads yield `None`.
pub fn share_from_search(search: &str) -> Option<SharePayload> {
    let payload = extract_share_payload(&page_url("/", search)?);
    (!payload.is_blank()).then_some(payload)
}

/// Returns the page URL with share-related parameters removed, or `None` when there is
/// nothing to remove.
pub fn strip_share_params(pathname: &str, search: &str) -> Option<String> {
    let url = page_url(pathname, search)?;
    if !url.query_pairs().any(|(key, _)| is_share_key(&key)) {
        return None;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_share_key(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut cleaned = url.path().to_string();
    if !kept.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish();
        cleaned.push('?');
        cleaned.push_str(&query);
    }
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_share_from_search() {
        assert_eq!(
            share_from_search("?title=Foo&url=https%3A%2F%2Fexample.com%2Fitem"),
            Some(SharePayload::new("Foo", "", "https://example.com/item"))
        );
        assert_eq!(
            share_from_search("text=just%20some%20words"),
            Some(SharePayload::new("", "just some words", ""))
        );
    }

    #[test]
    fn marker_only_and_empty_search_yield_nothing() {
        assert_eq!(share_from_search(""), None);
        assert_eq!(share_from_search("?share-target=true"), None);
        assert_eq!(share_from_search("?share-success=true"), None);
    }

    #[test]
    fn strips_only_share_params() {
        assert_eq!(
            strip_share_params("/", "?share-success=true"),
            Some("/".to_string())
        );
        assert_eq!(
            strip_share_params("/app", "?lang=en&text=hi&share-target=true"),
            Some("/app?lang=en".to_string())
        );
        assert_eq!(strip_share_params("/app", "?lang=en"), None);
        assert_eq!(strip_share_params("/", ""), None);
    }
}
