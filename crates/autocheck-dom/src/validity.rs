//! Constraint Validation
//!
//! Validity state, named validity flags and native constraint checks.

use regex::Regex;

use crate::DomError;

/// A named native constraint that can fail.
///
/// `PRIORITY` is the order in which flags are consulted when a single
/// failing flag has to be picked for a message lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidityFlag {
    TypeMismatch,
    BadInput,
    ValueMissing,
    TooShort,
    TooLong,
    RangeUnderflow,
    RangeOverflow,
    StepMismatch,
    PatternMismatch,
}

impl ValidityFlag {
    /// Flags in lookup priority order
    pub const PRIORITY: [ValidityFlag; 9] = [
        ValidityFlag::TypeMismatch,
        ValidityFlag::BadInput,
        ValidityFlag::ValueMissing,
        ValidityFlag::TooShort,
        ValidityFlag::TooLong,
        ValidityFlag::RangeUnderflow,
        ValidityFlag::RangeOverflow,
        ValidityFlag::StepMismatch,
        ValidityFlag::PatternMismatch,
    ];

    /// The flag's name as it appears on a `ValidityState` in script
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidityFlag::TypeMismatch => "typeMismatch",
            ValidityFlag::BadInput => "badInput",
            ValidityFlag::ValueMissing => "valueMissing",
            ValidityFlag::TooShort => "tooShort",
            ValidityFlag::TooLong => "tooLong",
            ValidityFlag::RangeUnderflow => "rangeUnderflow",
            ValidityFlag::RangeOverflow => "rangeOverflow",
            ValidityFlag::StepMismatch => "stepMismatch",
            ValidityFlag::PatternMismatch => "patternMismatch",
        }
    }
}

impl std::fmt::Display for ValidityFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validity state for a form control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityState {
    /// The element's value doesn't match the type
    pub type_mismatch: bool,
    /// The element has a bad input format
    pub bad_input: bool,
    /// The element's value is missing (for required)
    pub value_missing: bool,
    /// The element's value is too short
    pub too_short: bool,
    /// The element's value is too long
    pub too_long: bool,
    /// The element's value is below the minimum
    pub range_underflow: bool,
    /// The element's value is above the maximum
    pub range_overflow: bool,
    /// The element's value doesn't match step
    pub step_mismatch: bool,
    /// The element's value doesn't match the pattern
    pub pattern_mismatch: bool,
    /// Custom validity message set
    pub custom_error: bool,
}

impl ValidityState {
    /// Check if the element is valid
    pub fn is_valid(&self) -> bool {
        !self.custom_error && self.first_failing().is_none()
    }

    /// Whether a given named flag is set
    pub fn is_set(&self, flag: ValidityFlag) -> bool {
        match flag {
            ValidityFlag::TypeMismatch => self.type_mismatch,
            ValidityFlag::BadInput => self.bad_input,
            ValidityFlag::ValueMissing => self.value_missing,
            ValidityFlag::TooShort => self.too_short,
            ValidityFlag::TooLong => self.too_long,
            ValidityFlag::RangeUnderflow => self.range_underflow,
            ValidityFlag::RangeOverflow => self.range_overflow,
            ValidityFlag::StepMismatch => self.step_mismatch,
            ValidityFlag::PatternMismatch => self.pattern_mismatch,
        }
    }

    /// Set a named flag
    pub fn set(&mut self, flag: ValidityFlag) {
        let slot = match flag {
            ValidityFlag::TypeMismatch => &mut self.type_mismatch,
            ValidityFlag::BadInput => &mut self.bad_input,
            ValidityFlag::ValueMissing => &mut self.value_missing,
            ValidityFlag::TooShort => &mut self.too_short,
            ValidityFlag::TooLong => &mut self.too_long,
            ValidityFlag::RangeUnderflow => &mut self.range_underflow,
            ValidityFlag::RangeOverflow => &mut self.range_overflow,
            ValidityFlag::StepMismatch => &mut self.step_mismatch,
            ValidityFlag::PatternMismatch => &mut self.pattern_mismatch,
        };
        *slot = true;
    }

    /// First failing named flag in priority order.
    ///
    /// `custom_error` is not a named flag; a state that is invalid only
    /// because of it yields `None`.
    pub fn first_failing(&self) -> Option<ValidityFlag> {
        ValidityFlag::PRIORITY
            .into_iter()
            .find(|flag| self.is_set(*flag))
    }
}

/// Input type for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    #[default]
    Text,
    Email,
    Url,
    Number,
    Tel,
    Password,
    Search,
}

impl InputType {
    /// Parse an HTML `type` attribute value. Unknown values fall back to text.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => InputType::Email,
            "url" => InputType::Url,
            "number" => InputType::Number,
            "tel" => InputType::Tel,
            "password" => InputType::Password,
            "search" => InputType::Search,
            _ => InputType::Text,
        }
    }
}

/// Validation constraints
#[derive(Debug, Clone, Default)]
pub struct ValidationConstraints {
    pub input_type: InputType,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pattern: Option<Regex>,
}

impl ValidationConstraints {
    pub fn new(input_type: InputType) -> Self {
        Self {
            input_type,
            ..Default::default()
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>, step: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self.step = step;
        self
    }

    /// Set the `pattern` attribute. The pattern must match the whole value.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, DomError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|source| DomError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Validate a value against every constraint
    pub fn validate(&self, value: &str) -> ValidityState {
        let mut state = ValidityState::default();

        if value.is_empty() {
            if self.required {
                state.value_missing = true;
            }
            return state;
        }

        let length = value.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                state.too_short = true;
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                state.too_long = true;
            }
        }

        if let Some(ref pattern) = self.pattern {
            if !pattern.is_match(value) {
                state.pattern_mismatch = true;
            }
        }

        match self.input_type {
            InputType::Email => {
                if !is_valid_email(value) {
                    state.type_mismatch = true;
                }
            }
            InputType::Url => {
                if !is_valid_url(value) {
                    state.type_mismatch = true;
                }
            }
            InputType::Number => match value.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => self.check_number(number, &mut state),
                _ => state.bad_input = true,
            },
            _ => {}
        }

        state
    }

    fn check_number(&self, value: f64, state: &mut ValidityState) {
        if let Some(min) = self.min {
            if value < min {
                state.range_underflow = true;
            }
        }

        if let Some(max) = self.max {
            if value > max {
                state.range_overflow = true;
            }
        }

        if let Some(step) = self.step {
            if step > 0.0 {
                let base = self.min.unwrap_or(0.0);
                let ratio = (value - base) / step;
                if (ratio - ratio.round()).abs() > 1e-10 {
                    state.step_mismatch = true;
                }
            }
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

fn is_valid_url(value: &str) -> bool {
    match value.split_once("://") {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
