//! auto-check Networking
//!
//! Request description, reusable responses and the fetch capability used by
//! remote validation.

mod fetch;
mod request;

use std::sync::Arc;

pub use fetch::{Fetch, ReqwestFetcher};
pub use request::{Credentials, Method, Request, RequestInit, RequestMode};
pub use url::Url;

/// HTTP Response
///
/// The body is shared, so clones are cheap and every clone can read it again.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Arc<[u8]>,
}

impl Response {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: Arc::from(body.into()),
        }
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if response is OK (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get all headers
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Get body as text
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.body.to_vec()).map_err(|e| NetError::Decode(e.to_string()))
    }

    /// Get body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body).map_err(|e| NetError::Decode(e.to_string()))
    }

    /// The `message` string of a JSON object body, if there is one
    pub fn message(&self) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct Detail {
            message: String,
        }

        self.json::<Detail>().ok().map(|detail| detail.message)
    }
}

/// Network error
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Body decode error: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_ok_range() {
        assert!(Response::new(200, vec![], "").ok());
        assert!(Response::new(204, vec![], "").ok());
        assert!(!Response::new(302, vec![], "").ok());
        assert!(!Response::new(422, vec![], "").ok());
    }

    #[test]
    fn test_body_readable_more_than_once() {
        let response = Response::new(200, vec![], r#"{"message": "taken"}"#);
        let copy = response.clone();

        assert_eq!(response.text().unwrap(), r#"{"message": "taken"}"#);
        assert_eq!(response.text().unwrap(), copy.text().unwrap());
        assert_eq!(copy.message().as_deref(), Some("taken"));
        assert_eq!(response.bytes().len(), copy.bytes().len());
    }

    #[test]
    fn test_message_requires_json_object() {
        assert_eq!(Response::new(422, vec![], "plain text").message(), None);
        assert_eq!(Response::new(422, vec![], r#"{"error": "x"}"#).message(), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = Response::new(
            200,
            vec![("Content-Type".to_string(), "application/json".to_string())],
            "{}",
        );
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("etag"), None);
    }
}
