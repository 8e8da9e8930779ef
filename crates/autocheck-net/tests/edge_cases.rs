//! Edge case tests for autocheck-net
//!
//! Request descriptions, response reuse and the fetch seam.

use std::sync::Mutex;

use async_trait::async_trait;
use autocheck_net::*;

// ============================================================================
// REQUEST TESTS
// ============================================================================

#[test]
fn test_request_get_keeps_query() {
    let url = Url::parse("https://example.com/check?lang=en").unwrap();
    let req = Request::get(url);

    assert_eq!(req.init.method, Method::Get);
    assert_eq!(req.url.query(), Some("lang=en"));
}

#[test]
fn test_request_init_builder() {
    let init = RequestInit::new(Method::Post)
        .with_mode(RequestMode::SameOrigin)
        .with_credentials(Credentials::Include)
        .with_header("X-Requested-With", "XMLHttpRequest");

    assert_eq!(init.method, Method::Post);
    assert_eq!(init.mode, RequestMode::SameOrigin);
    assert_eq!(init.credentials, Credentials::Include);
    assert_eq!(init.header("x-requested-with"), Some("XMLHttpRequest"));
}

// ============================================================================
// RESPONSE TESTS
// ============================================================================

#[test]
fn test_response_json_body() {
    #[derive(serde::Deserialize)]
    struct Body {
        available: bool,
    }

    let response = Response::new(200, vec![], r#"{"available": true}"#);
    let body: Body = response.json().unwrap();
    assert!(body.available);
    // Still readable afterwards
    assert!(response.text().unwrap().contains("available"));
}

#[test]
fn test_response_invalid_utf8() {
    let response = Response::new(200, vec![], vec![0xff, 0xfe]);
    assert!(matches!(response.text(), Err(NetError::Decode(_))));
    assert_eq!(response.bytes(), &[0xff, 0xfe]);
}

// ============================================================================
// FETCH SEAM TESTS
// ============================================================================

struct Recording {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Fetch for Recording {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        self.seen.lock().unwrap().push(request.url.to_string());
        Ok(Response::new(404, vec![], "missing"))
    }
}

#[test]
fn test_fetch_trait_object() {
    let fetcher: Box<dyn Fetch> = Box::new(Recording {
        seen: Mutex::new(Vec::new()),
    });
    let request = Request::get(Url::parse("http://localhost/a").unwrap());

    let response = smol::block_on(fetcher.fetch(&request)).unwrap();
    assert_eq!(response.status(), 404);
    assert!(!response.ok());
}
