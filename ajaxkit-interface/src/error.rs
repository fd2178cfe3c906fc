//! Error types for ajaxkit requests.

use std::borrow::Cow;

use thiserror::Error;

/// A boxed error from a transport or an interceptor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while preparing, sending or post-processing a request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The merged configuration carries no URL.
    #[error("\"url\" is required")]
    MissingUrl,
    /// The transport does not recognize the input as a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// A connectivity failure reported by the transport.
    #[error("Network Error")]
    Network(#[source] BoxError),
    /// The response status was rejected by the configured status validator.
    #[error("Request failed with status {0}")]
    Status(u16),
    /// An underlying I/O error occurred.
    #[error("IO Error")]
    Io(#[from] std::io::Error),
    /// The response body exceeds the maximum allowed size.
    #[error("Response body size exceeds max limit")]
    ResponseTooLarge,
    /// Error occurred while serializing or deserializing JSON.
    #[error("JSON ser/de Error")]
    Json(#[from] serde_json::Error),
    /// The request did not settle before its timeout elapsed.
    #[error("Request timeout")]
    Timeout,
    /// The request was cancelled through its cancellation token.
    #[error("Request was aborted")]
    Aborted,
    /// An application-level error raised by an interceptor.
    #[error("{0}")]
    Custom(Cow<'static, str>),
    /// Any other error, typically raised by an interceptor.
    #[error(transparent)]
    Other(BoxError),
}

/// The classification of an [`Error`].
///
/// Terminal notification routes on this: [`ErrorKind::Abort`] goes to `on_abort` hooks and
/// everything else goes to `on_fail` hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Anything that is not a transport failure.
    Generic,
    /// A transport-level connectivity failure, including rejected statuses.
    Network,
    /// The timeout timer fired before the request settled.
    Timeout,
    /// The cancellation token fired and caused the request not to complete.
    Abort,
}

impl Error {
    /// Creates an application-level error with the given message.
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(message.into())
    }

    /// Wraps a connectivity failure.
    pub fn network(err: impl Into<BoxError>) -> Self {
        Self::Network(err.into())
    }

    /// Wraps an arbitrary error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Status(_) | Self::Io(_) | Self::ResponseTooLarge => {
                ErrorKind::Network
            }
            Self::Timeout => ErrorKind::Timeout,
            Self::Aborted => ErrorKind::Abort,
            Self::MissingUrl
            | Self::InvalidUrl(_)
            | Self::Json(_)
            | Self::Custom(_)
            | Self::Other(_) => ErrorKind::Generic,
        }
    }

    /// Shorthand for `self.kind() == ErrorKind::Abort`.
    pub fn is_abort(&self) -> bool {
        self.kind() == ErrorKind::Abort
    }

    /// Shorthand for `self.kind() == ErrorKind::Timeout`.
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// Returns the rejected status code, if this error was caused by one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// Result type for ajaxkit operations.
pub type Result<T> = std::result::Result<T, Error>;
