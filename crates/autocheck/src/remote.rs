//! Remote Validation
//!
//! Sends the field value to the configured endpoint and classifies the
//! result. Custom validity bookkeeping on the input happens here; turning the
//! outcome into notifications is the element's job.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use autocheck_dom::SharedInput;
use autocheck_net::{Credentials, Fetch, Method, NetError, Request, RequestInit, RequestMode, Response};
use url::Url;

use crate::config::CheckOptions;
use crate::lock;

/// Result of one remote check
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// Success status; the input's custom validity was cleared
    Success(Response),
    /// Failure status; the input carries the fallback message
    Rejected(Response),
    /// No response was obtained
    NetworkError(NetError),
}

/// One validation attempt. It goes stale when a newer attempt begins or the
/// counter is invalidated, e.g. on detach.
#[derive(Debug, Clone)]
pub struct Attempt {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl Attempt {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.id
    }
}

/// Generation counter handing out `Attempt`s
#[derive(Debug, Clone, Default)]
pub struct AttemptCounter {
    latest: Arc<AtomicU64>,
}

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt, making every earlier one stale
    pub fn begin(&self) -> Attempt {
        let id = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        Attempt {
            id,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Make every outstanding attempt stale
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }
}

/// Performs the network half of validation
pub struct RemoteValidator {
    fetcher: Arc<dyn Fetch>,
    pending_message: String,
    fallback_message: String,
}

impl RemoteValidator {
    pub fn new(fetcher: Arc<dyn Fetch>, options: &CheckOptions) -> Self {
        Self {
            fetcher,
            pending_message: options.pending_message.clone(),
            fallback_message: options.fallback_message.clone(),
        }
    }

    /// Build the GET request for a field, keeping any query already on the
    /// endpoint.
    pub fn build_request(endpoint: &Url, field_name: &str, field_value: &str) -> Request {
        let mut url = endpoint.clone();
        url.query_pairs_mut().append_pair(field_name, field_value);

        let init = RequestInit::new(Method::Get)
            .with_mode(RequestMode::Cors)
            .with_credentials(Credentials::SameOrigin)
            .with_header("X-Requested-With", "XMLHttpRequest")
            .with_header("Accept", "*/*");

        Request::new(url, init)
    }

    /// Check `field_value` against `endpoint`.
    ///
    /// Returns `None` without touching the input or the network when there is
    /// no endpoint or the trimmed value is empty. `on_send` sees the request
    /// right before it goes out. Input writes are skipped once `attempt` is
    /// stale; the outcome is still returned.
    pub async fn validate<F>(
        &self,
        input: &SharedInput,
        endpoint: Option<&Url>,
        field_name: &str,
        field_value: &str,
        attempt: &Attempt,
        on_send: F,
    ) -> Option<ValidationOutcome>
    where
        F: FnOnce(&Request) + Send,
    {
        let endpoint = endpoint?;
        let value = field_value.trim();
        if value.is_empty() {
            tracing::trace!(field = field_name, "remote check skipped: empty value");
            return None;
        }

        self.mark(input, attempt, &self.pending_message);

        let request = Self::build_request(endpoint, field_name, value);
        on_send(&request);

        tracing::debug!(url = %request.url, attempt = attempt.id(), "remote check sent");
        let outcome = match self.fetcher.fetch(&request).await {
            Ok(response) if response.ok() => {
                self.mark(input, attempt, "");
                ValidationOutcome::Success(response)
            }
            Ok(response) => {
                tracing::debug!(status = response.status(), "remote check rejected");
                self.mark(input, attempt, &self.fallback_message);
                ValidationOutcome::Rejected(response)
            }
            Err(error) => {
                tracing::warn!(%error, url = %request.url, "remote check failed");
                self.mark(input, attempt, &self.fallback_message);
                ValidationOutcome::NetworkError(error)
            }
        };

        Some(outcome)
    }

    fn mark(&self, input: &SharedInput, attempt: &Attempt, message: &str) {
        let mut input = lock(input);
        if !attempt.is_current() {
            tracing::trace!(attempt = attempt.id(), "stale attempt, custom validity untouched");
            return;
        }
        input.set_custom_validity(message);
    }
}

impl std::fmt::Debug for RemoteValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteValidator")
            .field("pending_message", &self.pending_message)
            .field("fallback_message", &self.fallback_message)
            .finish_non_exhaustive()
    }
}
