//! auto-check DOM
//!
//! The slice of the document object model the validation engine talks to:
//! input controls with constraint validation, bubbling custom events,
//! attributes and custom element lifecycle callbacks.

mod attributes;
mod error;
mod event;
mod input;
mod lifecycle;
mod validity;

use std::sync::atomic::{AtomicU32, Ordering};

pub use attributes::{AttributeChange, AttributeMap};
pub use error::DomError;
pub use event::{Event, EventTarget, ListenerId};
pub use input::{InputControl, InputElement, SharedInput};
pub use lifecycle::{CustomElement, is_valid_custom_element_name};
pub use validity::{InputType, ValidationConstraints, ValidityFlag, ValidityState};

/// Node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Allocate a fresh, process-unique node id
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}
