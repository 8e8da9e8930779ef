//! Errors
//!
//! Construction-time failures. Validation failures are notifications, not
//! errors.

use autocheck_net::NetError;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Net(#[from] NetError),

    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("invalid options: {0}")]
    Options(#[source] serde_json::Error),
}
