//! Share-target request classification and payload extraction.
//!
//! Classification is intentionally permissive: any one of four independent signals marks a
//! request as a share. A false positive costs one redirect; a false negative loses the share.

use url::Url;

use crate::SharePayload;

/// Literal marker carried by share-target entry URLs, as a path fragment or query key.
pub const SHARE_TARGET_MARKER: &str = "share-target";

/// Query key of the shared title.
pub const TITLE_PARAM: &str = "title";

/// Query key of the shared text.
pub const TEXT_PARAM: &str = "text";

/// Query key of the shared URL.
pub const URL_PARAM: &str = "url";

/// Query key appended to the redirect answered for every share request.
pub const SHARE_SUCCESS_PARAM: &str = "share-success";

/// Base used to resolve root-relative request URLs; never observable in results.
const RELATIVE_BASE: &str = "http://share-target.invalid/";

/// Parses an absolute or root-relative request URL.
pub fn parse_request_url(raw: &str) -> Option<Url> {
    let base = Url::parse(RELATIVE_BASE).ok()?;
    base.join(raw.trim()).ok()
}

/// Individual share-target signals detected on a request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShareSignals {
    /// The path contains [`SHARE_TARGET_MARKER`].
    pub path_marker: bool,
    /// The query has a [`SHARE_TARGET_MARKER`] key.
    pub query_marker: bool,
    /// The query has a [`TEXT_PARAM`] key.
    pub text_param: bool,
    /// The query has a [`URL_PARAM`] key.
    pub url_param: bool,
}

impl ShareSignals {
    /// Detects every signal on `url`.
    pub fn detect(url: &Url) -> Self {
        let mut signals = Self {
            path_marker: url.path().contains(SHARE_TARGET_MARKER),
            ..Self::default()
        };
        for (key, _) in url.query_pairs() {
            match &*key {
                SHARE_TARGET_MARKER => signals.query_marker = true,
                TEXT_PARAM => signals.text_param = true,
                URL_PARAM => signals.url_param = true,
                _ => {}
            }
        }
        signals
    }

    /// Returns whether at least one signal fired.
    pub const fn any(self) -> bool {
        self.path_marker || self.query_marker || self.text_param || self.url_param
    }
}

/// Returns whether `url` is shaped like a share-target request.
pub fn is_share_target(url: &Url) -> bool {
    ShareSignals::detect(url).any()
}

/// Extracts the payload from `url`'s query. Absent keys become empty strings; when a key
/// repeats, the first value wins.
pub fn extract_share_payload(url: &Url) -> SharePayload {
    let mut title = None;
    let mut text = None;
    let mut shared_url = None;
    for (key, value) in url.query_pairs() {
        let slot = match &*key {
            TITLE_PARAM => &mut title,
            TEXT_PARAM => &mut text,
            URL_PARAM => &mut shared_url,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    SharePayload {
        title: title.unwrap_or_default(),
        text: text.unwrap_or_default(),
        url: shared_url.unwrap_or_default(),
    }
}

/// Classifies a raw request URL and extracts its payload when it is a share-target request.
///
/// Unparseable URLs are never share requests.
pub fn classify_share_request(raw_url: &str) -> Option<SharePayload> {
    let url = parse_request_url(raw_url)?;
    is_share_target(&url).then(|| extract_share_payload(&url))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn signals(raw: &str) -> ShareSignals {
        ShareSignals::detect(&parse_request_url(raw).expect("url"))
    }

    #[test]
    fn url_and_title_query_is_a_share() {
        assert_eq!(
            classify_share_request("/?url=https://example.com/item&title=Foo"),
            Some(SharePayload::new("Foo", "", "https://example.com/item"))
        );
    }

    #[test]
    fn text_query_is_percent_decoded() {
        assert_eq!(
            classify_share_request("/?text=Check%20this%20out%20https://a.co/d/xyz"),
            Some(SharePayload::new("", "Check this out https://a.co/d/xyz", ""))
        );
    }

    #[test]
    fn each_signal_alone_is_sufficient() {
        assert!(signals("/share-target/receive").path_marker);
        assert!(signals("/?share-target").query_marker);
        assert!(signals("/?share-target=true").query_marker);
        assert!(signals("/?text=").text_param);
        assert!(signals("https://app.test/?url=x").url_param);

        for raw in [
            "/share-target/receive",
            "/?share-target",
            "/?text=",
            "/?url=x",
        ] {
            assert!(classify_share_request(raw).is_some(), "{raw} should be a share");
        }
    }

    #[test]
    fn plain_navigation_and_marker_values_are_not_shares() {
        assert_eq!(classify_share_request("/"), None);
        assert_eq!(classify_share_request("/index.html?title=Only%20title"), None);
        assert_eq!(classify_share_request("/?share-success=true"), None);
        assert_eq!(classify_share_request("/?ref=share-target"), None);
    }

    #[test]
    fn marker_only_request_yields_empty_payload() {
        assert_eq!(
            classify_share_request("/?share-target=true"),
            Some(SharePayload::default())
        );
    }

    #[test]
    fn first_repeated_value_wins() {
        assert_eq!(
            classify_share_request("/?url=https://a.test&url=https://b.test"),
            Some(SharePayload::new("", "", "https://a.test"))
        );
    }
}
