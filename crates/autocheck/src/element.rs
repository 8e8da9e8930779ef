//! auto-check Element
//!
//! Wraps an input control and validates it on every input event: native
//! constraints first, then, when an endpoint is configured, a debounced
//! remote check. Progress is reported as bubbling `auto-check:*` events.
//!
//! Event order for a locally valid value with an endpoint:
//! `native-success`, `ajax-start` (cancelable), `ajax-send`, `ajax-end`, then
//! `ajax-success` + `success`, `ajax-error` + `error`, or `network-error`.

use std::sync::{Arc, Mutex, MutexGuard};

use autocheck_dom::{AttributeMap, CustomElement, Event, EventTarget, ListenerId, SharedInput};
use autocheck_net::{Fetch, ReqwestFetcher};
use url::Url;

use crate::config::CheckOptions;
use crate::debounce::Debounce;
use crate::dispatch::DispatchLock;
use crate::events::{CheckDetail, CheckEventKind, INPUT_EVENT};
use crate::message::MessageCache;
use crate::remote::{Attempt, AttemptCounter, RemoteValidator, ValidationOutcome};
use crate::{CheckError, lock};

/// Endpoint attribute; empty or absent disables the remote check
pub const ENDPOINT_ATTR: &str = "endpoint";
/// Message spec attribute
pub const MESSAGE_SPEC_ATTR: &str = "message-spec";

/// Validation state of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    #[default]
    Idle,
    LocalChecking,
    LocalInvalid,
    LocalValid,
    AjaxPending,
    AjaxSuccess,
    AjaxRejected,
    AjaxNetworkError,
}

/// Arguments captured for a debounced remote check
#[derive(Debug, Clone)]
struct RemoteCheck {
    endpoint: Url,
    field_name: String,
    field_value: String,
    attempt: Attempt,
}

#[derive(Debug, Default)]
struct ElementState {
    attributes: AttributeMap,
    messages: MessageCache,
    debounce: Option<Debounce<RemoteCheck>>,
    listener: Option<ListenerId>,
    phase: CheckState,
}

struct Inner {
    target: Arc<EventTarget<CheckDetail>>,
    input: Option<SharedInput>,
    base_url: Option<Url>,
    options: CheckOptions,
    remote: RemoteValidator,
    attempts: AttemptCounter,
    dispatch: DispatchLock,
    state: Mutex<ElementState>,
}

/// The `<auto-check>` element.
///
/// Cloning yields another handle to the same element.
#[derive(Clone)]
pub struct AutoCheckElement {
    inner: Arc<Inner>,
}

impl AutoCheckElement {
    pub fn builder() -> AutoCheckBuilder {
        AutoCheckBuilder::default()
    }

    /// The target the element's events are dispatched on
    pub fn target(&self) -> &Arc<EventTarget<CheckDetail>> {
        &self.inner.target
    }

    pub fn input(&self) -> Option<&SharedInput> {
        self.inner.input.as_ref()
    }

    pub fn options(&self) -> &CheckOptions {
        &self.inner.options
    }

    pub fn state(&self) -> CheckState {
        self.inner.state().phase
    }

    pub fn is_attached(&self) -> bool {
        self.inner.state().listener.is_some()
    }

    /// Bind the input listener and prepare the input. Idempotent.
    pub fn attach(&self) {
        let mut state = self.inner.state();
        if state.listener.is_some() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let listener = self
            .inner
            .target
            .add_event_listener(INPUT_EVENT, move |_: &mut Event<CheckDetail>| {
                if let Some(inner) = weak.upgrade() {
                    inner.validate();
                }
            });
        state.listener = Some(listener);
        state.debounce = Some(self.inner.debounce());
        drop(state);

        if let Some(input) = &self.inner.input {
            let mut input = lock(input);
            input.set_autocomplete(false);
            input.set_spellcheck(false);
        }
        tracing::debug!(element = self.inner.target.id().as_u32(), "attached");
    }

    /// Unbind the listener, drop pending work and clear the input's custom
    /// validity. Responses still in flight are ignored when they arrive.
    pub fn detach(&self) {
        let _dispatch = self.inner.dispatch.acquire();
        let (listener, debounce) = {
            let mut state = self.inner.state();
            state.phase = CheckState::Idle;
            (state.listener.take(), state.debounce.take())
        };
        let Some(listener) = listener else {
            return;
        };

        self.inner.target.remove_event_listener(listener);
        drop(debounce);
        self.inner.attempts.invalidate();

        if let Some(input) = &self.inner.input {
            lock(input).set_custom_validity("");
        }
        tracing::debug!(element = self.inner.target.id().as_u32(), "detached");
    }

    /// Run validation as if an input event arrived. Ignored while detached.
    pub fn handle_input(&self) {
        if !self.is_attached() {
            tracing::trace!("input ignored: element detached");
            return;
        }
        self.inner.validate();
    }

    /// Dispatch an input event on the element
    pub fn dispatch_input(&self) -> bool {
        let mut event = Event::new(INPUT_EVENT, CheckDetail::None);
        self.inner.target.dispatch_event(&mut event)
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.inner.state().attributes.get(name).map(str::to_string)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let change = self.inner.state().attributes.set(name, value);
        if let Some(change) = change {
            self.notify_attribute(&change.name, change.old_value.as_deref(), change.new_value.as_deref());
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        let change = self.inner.state().attributes.remove(name);
        if let Some(change) = change {
            self.notify_attribute(&change.name, change.old_value.as_deref(), change.new_value.as_deref());
        }
    }

    /// The endpoint resolved against the base URL
    pub fn endpoint(&self) -> Option<Url> {
        self.inner.endpoint()
    }

    /// Set the endpoint; `None` or an empty string removes it
    pub fn set_endpoint(&self, endpoint: Option<&str>) {
        match endpoint.filter(|value| !value.is_empty()) {
            Some(value) => self.set_attribute(ENDPOINT_ATTR, value),
            None => self.remove_attribute(ENDPOINT_ATTR),
        }
    }

    pub fn message_spec(&self) -> Option<String> {
        self.get_attribute(MESSAGE_SPEC_ATTR)
    }

    /// Set the message spec; `None` or an empty string removes it
    pub fn set_message_spec(&self, spec: Option<&str>) {
        match spec.filter(|value| !value.is_empty()) {
            Some(value) => self.set_attribute(MESSAGE_SPEC_ATTR, value),
            None => self.remove_attribute(MESSAGE_SPEC_ATTR),
        }
    }

    fn notify_attribute(&self, name: &str, old_value: Option<&str>, new_value: Option<&str>) {
        if Self::observed_attributes().iter().any(|observed| *observed == name) {
            self.attribute_changed_callback(name, old_value, new_value);
        }
    }
}

impl CustomElement for AutoCheckElement {
    const NAME: &'static str = "auto-check";

    fn observed_attributes() -> &'static [&'static str] {
        &[ENDPOINT_ATTR, MESSAGE_SPEC_ATTR]
    }

    fn connected_callback(&self) {
        self.attach();
    }

    fn disconnected_callback(&self) {
        self.detach();
    }

    fn attribute_changed_callback(
        &self,
        name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) {
        if old_value == new_value {
            return;
        }
        match name {
            MESSAGE_SPEC_ATTR => {
                self.inner.state().messages.invalidate();
                tracing::debug!("message spec changed, cache invalidated");
            }
            ENDPOINT_ATTR => tracing::debug!(endpoint = ?new_value, "endpoint changed"),
            _ => {}
        }
    }
}

impl std::fmt::Debug for AutoCheckElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoCheckElement")
            .field("target", &self.inner.target.id())
            .field("state", &self.state())
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, ElementState> {
        lock(&self.state)
    }

    /// Record `phase` only while `attempt` is the live one
    fn set_phase_for(&self, attempt: &Attempt, phase: CheckState) {
        let mut state = self.state();
        if attempt.is_current() {
            tracing::trace!(?phase, "state");
            state.phase = phase;
        }
    }

    fn endpoint(&self) -> Option<Url> {
        let href = self.state().attributes.get(ENDPOINT_ATTR)?.trim().to_string();
        if href.is_empty() {
            return None;
        }

        let resolved = match &self.base_url {
            Some(base) => base.join(&href),
            None => Url::parse(&href),
        };
        match resolved {
            Ok(url) => Some(url),
            Err(error) => {
                tracing::warn!(%error, endpoint = %href, "unresolvable endpoint, remote check disabled");
                None
            }
        }
    }

    fn debounce(self: &Arc<Self>) -> Debounce<RemoteCheck> {
        let weak = Arc::downgrade(self);
        Debounce::new(self.options.debounce(), move |check: RemoteCheck| {
            let inner = weak.upgrade();
            async move {
                if let Some(inner) = inner {
                    inner.run_remote(check).await;
                }
            }
        })
    }

    fn emit(&self, kind: CheckEventKind, detail: CheckDetail) -> bool {
        tracing::debug!(event = kind.name(), "emit");
        let mut event = kind.event(detail);
        self.target.dispatch_event(&mut event)
    }

    /// Emit only while `attempt` is the live one
    fn emit_current(&self, attempt: &Attempt, kind: CheckEventKind, detail: CheckDetail) {
        let _dispatch = self.dispatch.acquire();
        if attempt.is_current() {
            self.emit(kind, detail);
        } else {
            tracing::trace!(event = kind.name(), attempt = attempt.id(), "stale, not emitted");
        }
    }

    /// Local check, then hand off to the debounced remote check
    fn validate(&self) {
        let Some(input) = self.input.as_ref() else {
            tracing::trace!("no input to validate");
            return;
        };
        let _dispatch = self.dispatch.acquire();
        let attempt = self.attempts.begin();
        self.set_phase_for(&attempt, CheckState::LocalChecking);

        let (validity, field_name, field_value) = {
            let mut input = lock(input);
            if input.validity().custom_error {
                input.set_custom_validity("");
            }
            (
                input.validity(),
                input.name().to_string(),
                input.trimmed_value().to_string(),
            )
        };

        if !validity.is_valid() {
            self.set_phase_for(&attempt, CheckState::LocalInvalid);
            let flag = validity.first_failing();
            let message = {
                let mut state = self.state();
                let spec = state.attributes.get(MESSAGE_SPEC_ATTR).map(str::to_string);
                state.messages.resolve(spec.as_deref(), flag)
            };
            match message.filter(|message| !message.is_empty()) {
                Some(message) => {
                    self.emit(CheckEventKind::Error, CheckDetail::Message(message));
                }
                None => tracing::trace!(?flag, "invalid, no message configured"),
            }
            self.set_phase_for(&attempt, CheckState::Idle);
            return;
        }

        self.set_phase_for(&attempt, CheckState::LocalValid);
        let Some(endpoint) = self.endpoint() else {
            self.emit(CheckEventKind::Success, CheckDetail::None);
            self.set_phase_for(&attempt, CheckState::Idle);
            return;
        };

        self.emit(CheckEventKind::NativeSuccess, CheckDetail::None);
        if !self.emit(CheckEventKind::AjaxStart, CheckDetail::None) {
            tracing::debug!("ajax-start canceled");
            self.set_phase_for(&attempt, CheckState::Idle);
            return;
        }

        {
            // A listener may have detached the element or fired another input.
            let mut input = lock(input);
            if !attempt.is_current() {
                return;
            }
            input.set_custom_validity(&self.options.pending_message);
        }
        self.set_phase_for(&attempt, CheckState::AjaxPending);

        let state = self.state();
        if let Some(debounce) = &state.debounce {
            debounce.call(RemoteCheck {
                endpoint,
                field_name,
                field_value,
                attempt,
            });
        }
    }

    async fn run_remote(self: Arc<Self>, check: RemoteCheck) {
        let RemoteCheck {
            endpoint,
            field_name,
            field_value,
            attempt,
        } = check;
        if !attempt.is_current() {
            tracing::trace!(attempt = attempt.id(), "remote check superseded");
            return;
        }
        let Some(input) = self.input.clone() else {
            return;
        };

        let outcome = self
            .remote
            .validate(
                &input,
                Some(&endpoint),
                &field_name,
                &field_value,
                &attempt,
                |request| {
                    self.emit_current(
                        &attempt,
                        CheckEventKind::AjaxSend,
                        CheckDetail::Request(request.clone()),
                    )
                },
            )
            .await;

        // Staleness is decided once; `ajax-end` and the outcome then go out
        // as one group.
        let _dispatch = self.dispatch.acquire();
        if !attempt.is_current() {
            tracing::debug!(attempt = attempt.id(), "discarding stale remote outcome");
            return;
        }

        let Some(outcome) = outcome else {
            // Nothing to send; drop the pending marker set by the local pass.
            lock(&input).set_custom_validity("");
            self.set_phase_for(&attempt, CheckState::Idle);
            return;
        };

        self.emit(CheckEventKind::AjaxEnd, CheckDetail::None);
        match outcome {
            ValidationOutcome::Success(response) => {
                self.set_phase_for(&attempt, CheckState::AjaxSuccess);
                self.emit(CheckEventKind::AjaxSuccess, CheckDetail::Response(response.clone()));
                self.emit(CheckEventKind::Success, CheckDetail::Response(response));
            }
            ValidationOutcome::Rejected(response) => {
                self.set_phase_for(&attempt, CheckState::AjaxRejected);
                self.emit(CheckEventKind::AjaxError, CheckDetail::Response(response.clone()));
                self.emit(CheckEventKind::Error, CheckDetail::Response(response));
            }
            ValidationOutcome::NetworkError(error) => {
                self.set_phase_for(&attempt, CheckState::AjaxNetworkError);
                self.emit(CheckEventKind::NetworkError, CheckDetail::NetworkError(error));
            }
        }
        self.set_phase_for(&attempt, CheckState::Idle);
    }
}

/// Builder for `AutoCheckElement`
#[derive(Default)]
pub struct AutoCheckBuilder {
    input: Option<SharedInput>,
    base_url: Option<String>,
    parent: Option<Arc<EventTarget<CheckDetail>>>,
    fetcher: Option<Arc<dyn Fetch>>,
    options: CheckOptions,
    endpoint: Option<String>,
    message_spec: Option<String>,
}

impl AutoCheckBuilder {
    /// The input control to validate
    pub fn input(mut self, input: SharedInput) -> Self {
        self.input = Some(input);
        self
    }

    /// Base URL relative endpoints are resolved against
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// Ancestor the element's events bubble to
    pub fn parent(mut self, parent: Arc<EventTarget<CheckDetail>>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Network capability; defaults to `ReqwestFetcher`
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn message_spec(mut self, spec: &str) -> Self {
        self.message_spec = Some(spec.to_string());
        self
    }

    pub fn build(self) -> Result<AutoCheckElement, CheckError> {
        let base_url = self.base_url.as_deref().map(Url::parse).transpose()?;
        let fetcher: Arc<dyn Fetch> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(ReqwestFetcher::new()?),
        };

        let inner = Inner {
            target: Arc::new(EventTarget::with_parent(self.parent)),
            input: self.input,
            base_url,
            remote: RemoteValidator::new(fetcher, &self.options),
            options: self.options,
            attempts: AttemptCounter::new(),
            dispatch: DispatchLock::new(),
            state: Mutex::new(ElementState::default()),
        };
        let element = AutoCheckElement {
            inner: Arc::new(inner),
        };

        if let Some(endpoint) = self.endpoint.as_deref() {
            element.set_endpoint(Some(endpoint));
        }
        if let Some(spec) = self.message_spec.as_deref() {
            element.set_message_spec(Some(spec));
        }
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use autocheck_dom::{InputControl, InputElement, InputType, ValidationConstraints};
    use autocheck_net::{NetError, Request, Response};

    struct Unreachable;

    #[async_trait]
    impl Fetch for Unreachable {
        async fn fetch(&self, _: &Request) -> Result<Response, NetError> {
            Err(NetError::Transport("offline".to_string()))
        }
    }

    fn element(input: Option<SharedInput>) -> AutoCheckElement {
        let mut builder = AutoCheckElement::builder()
            .base_url("https://example.com/signup/")
            .fetcher(Arc::new(Unreachable));
        if let Some(input) = input {
            builder = builder.input(input);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_element_name_is_valid() {
        assert!(autocheck_dom::is_valid_custom_element_name(AutoCheckElement::NAME));
    }

    #[test]
    fn test_endpoint_resolution() {
        let element = element(None);
        assert_eq!(element.endpoint(), None);

        element.set_endpoint(Some("check"));
        assert_eq!(element.endpoint().unwrap().as_str(), "https://example.com/signup/check");

        element.set_endpoint(Some("/api/check?x=1"));
        assert_eq!(element.endpoint().unwrap().as_str(), "https://example.com/api/check?x=1");

        element.set_endpoint(Some("https://other.test/v"));
        assert_eq!(element.endpoint().unwrap().as_str(), "https://other.test/v");

        element.set_endpoint(Some(""));
        assert_eq!(element.get_attribute(ENDPOINT_ATTR), None);
        assert_eq!(element.endpoint(), None);
    }

    #[test]
    fn test_relative_endpoint_without_base() {
        let element = AutoCheckElement::builder()
            .fetcher(Arc::new(Unreachable))
            .endpoint("/check")
            .build()
            .unwrap();
        assert_eq!(element.get_attribute(ENDPOINT_ATTR).as_deref(), Some("/check"));
        assert_eq!(element.endpoint(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        let result = AutoCheckElement::builder()
            .base_url("not a url")
            .fetcher(Arc::new(Unreachable))
            .build();
        assert!(matches!(result, Err(CheckError::BaseUrl(_))));
    }

    #[test]
    fn test_message_spec_change_invalidates_cache() {
        let input = InputElement::new("email")
            .with_constraints(ValidationConstraints::new(InputType::Email).required(true))
            .into_shared();
        let element = element(Some(input.clone()));
        element.set_message_spec(Some("first"));
        element.attach();

        element.handle_input();
        assert!(element.inner.state().messages.is_cached());

        element.set_message_spec(Some("second"));
        assert!(!element.inner.state().messages.is_cached());
        assert_eq!(element.message_spec().as_deref(), Some("second"));
    }

    #[test]
    fn test_attach_sets_presentation_hints() {
        let input = InputElement::new("user").into_shared();
        let element = element(Some(input.clone()));
        assert!(!element.is_attached());

        element.attach();
        element.attach();
        assert!(element.is_attached());
        assert_eq!(element.target().listener_count(INPUT_EVENT), 1);
        assert!(!input.lock().unwrap().autocomplete());
        assert!(!input.lock().unwrap().spellcheck());
    }

    #[test]
    fn test_detach_clears_custom_validity() {
        let input = InputElement::new("user").into_shared();
        let element = element(Some(input.clone()));
        element.attach();
        input.lock().unwrap().set_custom_validity("Verifying.....");

        element.detach();
        assert!(!element.is_attached());
        assert_eq!(element.target().listener_count(INPUT_EVENT), 0);
        assert_eq!(input.lock().unwrap().custom_validity(), "");
        assert_eq!(element.state(), CheckState::Idle);
    }

    #[test]
    fn test_input_ignored_while_detached() {
        let input = InputElement::new("user")
            .with_constraints(ValidationConstraints::new(InputType::Text).required(true))
            .into_shared();
        let element = element(Some(input));
        element.set_message_spec(Some("required"));

        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        element
            .target()
            .add_event_listener(CheckEventKind::Error.name(), move |_: &mut Event<CheckDetail>| {
                *counter.lock().unwrap() += 1;
            });

        element.dispatch_input();
        element.handle_input();
        assert_eq!(*fired.lock().unwrap(), 0);

        element.attach();
        element.dispatch_input();
        assert_eq!(*fired.lock().unwrap(), 1);
    }

    #[test]
    fn test_element_without_input() {
        let element = element(None);
        element.attach();
        assert!(element.dispatch_input());
        assert_eq!(element.state(), CheckState::Idle);
    }
}
