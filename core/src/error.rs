//! Error types for the news search client.
//!
//! # Design
//! `ValidationError` is raised locally before any request is issued.
//! `TransportError` is the only error shape that crosses the transport
//! boundary: raw reqwest errors are converted at the adapter, and
//! `Cancelled` gets its own variant so the controller can drop it silently
//! instead of reporting it.

use thiserror::Error;

/// A query failed local constraints and never reached the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("search keyword is required")]
    EmptyKeyword,

    #[error("page number must be greater than 0, got {0}")]
    InvalidPage(u32),

    #[error("page size must be between 1 and 50, got {0}")]
    PageSizeOutOfRange(u32),

    /// A page change was requested before any search was submitted.
    #[error("no search has been submitted yet")]
    NoActiveQuery,
}

/// Failures produced by a `SearchTransport` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// DNS failure, refused connection, timeout, or a body that could not
    /// be read.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    ServerError { message: String, status: u16 },

    /// A 2xx response whose body is not a valid search result.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("could not encode request: {0}")]
    Encode(String),

    /// The caller's cancellation token fired before the call settled.
    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::NetworkError(_) => {
                "Unable to reach the news service. Please check your connection and try again."
                    .to_string()
            }
            TransportError::ServerError { message, .. } => message.clone(),
            TransportError::Decode(_) | TransportError::Encode(_) => {
                "Received an unexpected response from the news service.".to_string()
            }
            TransportError::Cancelled => "The search was cancelled.".to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}
