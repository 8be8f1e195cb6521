//! Request and response snapshots exchanged between the agent and host network/cache services.

use std::rc::Rc;

/// HTTP method token for the only cacheable request method.
pub const METHOD_GET: &str = "GET";

/// Status code of the only cacheable response status.
pub const STATUS_OK: u16 = 200;

/// Status code used by [`FetchResponse::redirect`], matching the platform `Response.redirect`
/// default.
pub const STATUS_FOUND: u16 = 302;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outgoing request observed by the agent before it decides between cache and network.
pub struct FetchRequest {
    /// Request method as reported by the platform (for example `GET` or `POST`).
    pub method: String,
    /// Request URL, absolute on the web platform and root-relative in tests.
    pub url: String,
    /// Request headers in platform enumeration order.
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Builds a header-less `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(METHOD_GET, url)
    }

    /// Builds a header-less request with an explicit method.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Returns whether the request uses the `GET` method.
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case(METHOD_GET)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Network (or synthesized) response handed back to the requesting page.
///
/// The body is an immutable shared buffer. [`FetchResponse::snapshot`] therefore duplicates the
/// response without copying bytes, and neither copy can observe writes through the other.
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// HTTP status text.
    pub status_text: String,
    /// Response headers in platform enumeration order.
    pub headers: Vec<(String, String)>,
    body: Rc<[u8]>,
}

impl FetchResponse {
    /// Builds a header-less response with the given status and body.
    pub fn new(status: u16, body: impl Into<Rc<[u8]>>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Builds an empty-bodied redirect to `location`.
    pub fn redirect(location: &str) -> Self {
        Self::new(STATUS_FOUND, Vec::new()).with_header("Location", location)
    }

    /// Appends a header and returns the updated response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns whether the status is exactly `200`.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Returns the first header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the response body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Captures an immutable snapshot suitable for storing in an asset cache.
    pub fn snapshot(&self) -> StoredResponse {
        StoredResponse {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: Rc::clone(&self.body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable response snapshot held by an asset cache generation.
pub struct StoredResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body: Rc<[u8]>,
}

impl StoredResponse {
    /// Rebuilds a snapshot from raw parts read back out of a host cache.
    pub fn from_parts(
        status: u16,
        status_text: String,
        headers: Vec<(String, String)>,
        body: impl Into<Rc<[u8]>>,
    ) -> Self {
        Self {
            status,
            status_text,
            headers,
            body: body.into(),
        }
    }

    /// HTTP status code captured at snapshot time.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// HTTP status text captured at snapshot time.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Headers captured at snapshot time.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Body bytes captured at snapshot time.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Produces a fresh response that can be handed to a page.
    pub fn to_response(&self) -> FetchResponse {
        FetchResponse {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: Rc::clone(&self.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_check_is_case_insensitive() {
        assert!(FetchRequest::new("get", "/").is_get());
        assert!(!FetchRequest::new("POST", "/").is_get());
    }

    #[test]
    fn snapshot_shares_body_and_survives_original_drop() {
        let response =
            FetchResponse::new(200, b"<html>".to_vec()).with_header("Content-Type", "text/html");
        let snapshot = response.snapshot();
        drop(response);

        let replay = snapshot.to_response();
        assert_eq!(replay.body(), b"<html>");
        assert_eq!(replay.header("content-type"), Some("text/html"));
        assert!(replay.is_ok());
    }

    #[test]
    fn redirect_carries_location_header() {
        let response = FetchResponse::redirect("/?share-success=true");
        assert_eq!(response.status, STATUS_FOUND);
        assert_eq!(response.header("Location"), Some("/?share-success=true"));
        assert!(response.body().is_empty());
    }
}
