//! DOM errors

/// Errors raised while configuring DOM objects
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
