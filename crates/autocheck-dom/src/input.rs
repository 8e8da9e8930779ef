//! Input Control
//!
//! The child input control an auto-check element validates.

use std::sync::{Arc, Mutex};

use crate::validity::{ValidationConstraints, ValidityState};

/// Input control shared between its host and the validation engine
pub type SharedInput = Arc<Mutex<dyn InputControl>>;

/// Capabilities of a validatable text input
pub trait InputControl: Send {
    /// Get the element's name
    fn name(&self) -> &str;

    /// Get the element's value
    fn value(&self) -> &str;

    /// Set the element's value
    fn set_value(&mut self, value: &str);

    /// Value with leading and trailing whitespace removed
    fn trimmed_value(&self) -> &str {
        self.value().trim()
    }

    /// Current validity state, including any custom error
    fn validity(&self) -> ValidityState;

    /// Check validity
    fn check_validity(&self) -> bool {
        self.validity().is_valid()
    }

    /// Set custom validity message. An empty message clears it.
    fn set_custom_validity(&mut self, message: &str);

    /// The custom validity message, empty when none is set
    fn custom_validity(&self) -> &str;

    fn set_autocomplete(&mut self, enabled: bool);

    fn set_spellcheck(&mut self, enabled: bool);
}

/// `<input>` element with native constraint validation
#[derive(Debug, Clone)]
pub struct InputElement {
    name: String,
    value: String,
    constraints: ValidationConstraints,
    custom_message: String,
    autocomplete: bool,
    spellcheck: bool,
}

impl InputElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            constraints: ValidationConstraints::default(),
            custom_message: String::new(),
            autocomplete: true,
            spellcheck: true,
        }
    }

    pub fn with_constraints(mut self, constraints: ValidationConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn constraints(&self) -> &ValidationConstraints {
        &self.constraints
    }

    pub fn autocomplete(&self) -> bool {
        self.autocomplete
    }

    pub fn spellcheck(&self) -> bool {
        self.spellcheck
    }

    /// Wrap into a handle the validation engine can share
    pub fn into_shared(self) -> Arc<Mutex<InputElement>> {
        Arc::new(Mutex::new(self))
    }
}

impl InputControl for InputElement {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn validity(&self) -> ValidityState {
        let mut state = self.constraints.validate(&self.value);
        state.custom_error = !self.custom_message.is_empty();
        state
    }

    fn set_custom_validity(&mut self, message: &str) {
        self.custom_message = message.to_string();
    }

    fn custom_validity(&self) -> &str {
        &self.custom_message
    }

    fn set_autocomplete(&mut self, enabled: bool) {
        self.autocomplete = enabled;
    }

    fn set_spellcheck(&mut self, enabled: bool) {
        self.spellcheck = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validity::InputType;

    #[test]
    fn test_custom_validity() {
        let mut input = InputElement::new("email").with_value("a@b.c");
        assert!(input.check_validity());

        input.set_custom_validity("Custom error");
        assert!(!input.check_validity());
        assert!(input.validity().custom_error);
        assert_eq!(input.custom_validity(), "Custom error");

        input.set_custom_validity("");
        assert!(input.check_validity());
    }

    #[test]
    fn test_required_email() {
        let constraints = ValidationConstraints::new(InputType::Email).required(true);
        let mut input = InputElement::new("email").with_constraints(constraints);

        assert!(input.validity().value_missing);

        input.set_value("email");
        assert!(input.validity().type_mismatch);
    }

    #[test]
    fn test_trimmed_value() {
        let input = InputElement::new("user").with_value("  alice \t");
        assert_eq!(input.trimmed_value(), "alice");
    }

    #[test]
    fn test_shared_handle_coerces() {
        let input = InputElement::new("user").into_shared();
        let shared: SharedInput = input.clone();
        shared.lock().unwrap().set_value("bob");
        assert_eq!(input.lock().unwrap().value(), "bob");
    }

    #[test]
    fn test_presentation_hints_default_on() {
        let mut input = InputElement::new("user");
        assert!(input.autocomplete());
        assert!(input.spellcheck());

        input.set_autocomplete(false);
        input.set_spellcheck(false);
        assert!(!input.autocomplete());
        assert!(!input.spellcheck());
    }
}
