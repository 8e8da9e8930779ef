//! Fetch
//!
//! The network-send capability and its reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::{NetError, Request, RequestInit, Response};

const USER_AGENT: &str = concat!("auto-check/", env!("CARGO_PKG_VERSION"));

/// Sends a request and resolves to a response or a transport failure.
///
/// A non-success status is still `Ok`; `Err` means no response was obtained.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError>;
}

/// `Fetch` over a blocking reqwest client, run off the async executor.
///
/// Request mode and credentials policy are browser concepts; there is no
/// cookie store, so they only show up in the request log.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, NetError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| NetError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for ReqwestFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        tracing::debug!(
            method = request.init.method.as_str(),
            url = %request.url,
            mode = ?request.init.mode,
            credentials = ?request.init.credentials,
            "fetch"
        );

        let client = self.client.clone();
        let url = request.url.clone();
        let init = request.init.clone();
        smol::unblock(move || send_blocking(&client, &url, &init)).await
    }
}

fn send_blocking(
    client: &reqwest::blocking::Client,
    url: &Url,
    init: &RequestInit,
) -> Result<Response, NetError> {
    let method = reqwest::Method::from_bytes(init.method.as_str().as_bytes())
        .map_err(|e| NetError::Client(e.to_string()))?;

    let mut builder = client.request(method, url.as_str());
    for (key, value) in &init.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    let response = builder
        .send()
        .map_err(|e| NetError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let body = response
        .bytes()
        .map_err(|e| NetError::Transport(e.to_string()))?;

    tracing::debug!(status, bytes = body.len(), url = %url, "fetch complete");
    Ok(Response::new(status, headers, body.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_builds() {
        assert!(ReqwestFetcher::with_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on loopback is closed on any sane test host.
        let request = Request::get(Url::parse("http://127.0.0.1:9/check").unwrap());

        let result = smol::block_on(fetcher.fetch(&request));
        assert!(matches!(result, Err(NetError::Transport(_))));
    }
}
