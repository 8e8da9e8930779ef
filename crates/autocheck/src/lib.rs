//! auto-check
//!
//! Attachable validation for a labeled input: native constraint checks on
//! every input event, an optional debounced remote check, and the outcome
//! reported as bubbling `auto-check:*` events.
//!
//! ```no_run
//! use std::sync::Arc;
//! use autocheck::{AutoCheckElement, CheckEvent, CheckEventKind};
//! use autocheck_dom::{EventTarget, InputElement, InputType, ValidationConstraints};
//!
//! let document = Arc::new(EventTarget::new());
//! let input = InputElement::new("email")
//!     .with_constraints(ValidationConstraints::new(InputType::Email).required(true))
//!     .into_shared();
//! let element = AutoCheckElement::builder()
//!     .input(input.clone())
//!     .parent(Arc::clone(&document))
//!     .base_url("https://example.com/")
//!     .endpoint("/check-email")
//!     .message_spec(r#"{"typeMismatch": "Not an email address"}"#)
//!     .build()?;
//!
//! document.add_event_listener(CheckEventKind::Error.name(), |event: &mut CheckEvent| {
//!     println!("{:?}", event.detail.message());
//! });
//! element.attach();
//! element.dispatch_input();
//! # Ok::<(), autocheck::CheckError>(())
//! ```

pub mod config;
pub mod debounce;
mod dispatch;
pub mod element;
pub mod error;
pub mod events;
pub mod message;
pub mod remote;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use config::CheckOptions;
pub use debounce::Debounce;
pub use element::{AutoCheckBuilder, AutoCheckElement, CheckState, ENDPOINT_ATTR, MESSAGE_SPEC_ATTR};
pub use error::CheckError;
pub use events::{CheckDetail, CheckEvent, CheckEventKind, INPUT_EVENT};
pub use message::{MessageCache, MessageTable, canonical_key, resolve};
pub use remote::{Attempt, AttemptCounter, RemoteValidator, ValidationOutcome};

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
