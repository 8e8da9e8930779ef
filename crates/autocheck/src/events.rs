//! Notifications
//!
//! The events an auto-check element dispatches and their payloads.

use autocheck_dom::Event;
use autocheck_net::{NetError, Request, Response};

/// Event dispatched by an auto-check element
pub type CheckEvent = Event<CheckDetail>;

/// Name of the input-change event the element listens for
pub const INPUT_EVENT: &str = "input";

/// Notification kinds, in the `auto-check:` namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckEventKind {
    Success,
    NativeSuccess,
    Error,
    AjaxStart,
    AjaxSend,
    AjaxEnd,
    AjaxSuccess,
    AjaxError,
    NetworkError,
}

impl CheckEventKind {
    pub const ALL: [CheckEventKind; 9] = [
        CheckEventKind::Success,
        CheckEventKind::NativeSuccess,
        CheckEventKind::Error,
        CheckEventKind::AjaxStart,
        CheckEventKind::AjaxSend,
        CheckEventKind::AjaxEnd,
        CheckEventKind::AjaxSuccess,
        CheckEventKind::AjaxError,
        CheckEventKind::NetworkError,
    ];

    /// Full event name
    pub fn name(&self) -> &'static str {
        match self {
            CheckEventKind::Success => "auto-check:success",
            CheckEventKind::NativeSuccess => "auto-check:native-success",
            CheckEventKind::Error => "auto-check:error",
            CheckEventKind::AjaxStart => "auto-check:ajax-start",
            CheckEventKind::AjaxSend => "auto-check:ajax-send",
            CheckEventKind::AjaxEnd => "auto-check:ajax-end",
            CheckEventKind::AjaxSuccess => "auto-check:ajax-success",
            CheckEventKind::AjaxError => "auto-check:ajax-error",
            CheckEventKind::NetworkError => "auto-check:network-error",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Only `ajax-start` can be canceled
    pub fn is_cancelable(&self) -> bool {
        matches!(self, CheckEventKind::AjaxStart)
    }

    /// Build a bubbling event of this kind
    pub fn event(self, detail: CheckDetail) -> CheckEvent {
        Event::new(self.name(), detail).with_cancelable(self.is_cancelable())
    }
}

/// Event payload
#[derive(Debug, Clone, Default)]
pub enum CheckDetail {
    #[default]
    None,
    /// Resolved local validation message
    Message(String),
    /// Remote response; the body can be read any number of times
    Response(Response),
    /// The request about to be sent
    Request(Request),
    /// Transport failure
    NetworkError(NetError),
}

impl CheckDetail {
    /// Human readable message carried by the payload: the local message, or
    /// the `message` field of a JSON response body.
    pub fn message(&self) -> Option<String> {
        match self {
            CheckDetail::Message(message) => Some(message.clone()),
            CheckDetail::Response(response) => response.message(),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            CheckDetail::Response(response) => Some(response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in CheckEventKind::ALL {
            assert_eq!(CheckEventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CheckEventKind::from_name("input"), None);
    }

    #[test]
    fn test_only_ajax_start_is_cancelable() {
        let start = CheckEventKind::AjaxStart.event(CheckDetail::None);
        assert!(start.cancelable && start.bubbles);

        let end = CheckEventKind::AjaxEnd.event(CheckDetail::None);
        assert!(!end.cancelable && end.bubbles);
    }

    #[test]
    fn test_detail_message() {
        assert_eq!(
            CheckDetail::Message("type mismatch".into()).message().as_deref(),
            Some("type mismatch")
        );
        let response = Response::new(422, vec![], r#"{"message": "taken"}"#);
        assert_eq!(CheckDetail::Response(response).message().as_deref(), Some("taken"));
        assert_eq!(CheckDetail::None.message(), None);
    }
}
