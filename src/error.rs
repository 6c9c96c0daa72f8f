//! Error types for the conversion flow.
//!
//! Every failure that can reach the user maps to one fixed, human-readable
//! message via [`ConversionError::user_message`]. The `Display` output keeps
//! the technical detail and is meant for logs.

use thiserror::Error;

pub const TRANSPORT_MESSAGE: &str =
    "An error occurred while converting. Please check your connection and try again.";
pub const RESPONSE_FORMAT_MESSAGE: &str = "Failed to convert code. Please try again.";
pub const BUSY_MESSAGE: &str = "A conversion is already in progress";

/// Precondition failures, listed in the order they are checked.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter some code to convert")]
    EmptyCode,

    #[error("Please select both source and target languages")]
    MissingLanguage,

    #[error("Source and target languages must be different")]
    SameLanguage,
}

/// Failures of the network call itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("translation endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response body is not valid JSON: {0}")]
    Body(#[source] serde_json::Error),

    #[error("request timed out")]
    Timeout,

    #[error("request was aborted")]
    Aborted,
}

impl TransportError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Rate limiting (429), server errors (5xx), timeouts and network errors
    /// are transient. Other 4xx statuses and aborts are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) | TransportError::Timeout => true,
            TransportError::Status { status, .. } => *status == 429 || *status >= 500,
            TransportError::Body(_) | TransportError::Aborted => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed response: {0}")]
    ResponseFormat(String),

    /// A request is already outstanding on this controller.
    #[error("a conversion is already in progress")]
    Busy,
}

impl ConversionError {
    /// The fixed message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ConversionError::Validation(err) => err.to_string(),
            ConversionError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            ConversionError::ResponseFormat(_) => RESPONSE_FORMAT_MESSAGE.to_string(),
            ConversionError::Busy => BUSY_MESSAGE.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ConversionError::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ConversionError {
    fn from(err: reqwest::Error) -> Self {
        ConversionError::Transport(err.into())
    }
}
