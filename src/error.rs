use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use ajaxkit_interface::{Error, ErrorKind, RequestConfig};

/// The error a request settles with.
///
/// Carries the classified cause together with the merged configuration the request was
/// made with, so callers can tell which call failed.
#[derive(Debug)]
pub struct RequestError {
    error: Error,
    config: Arc<RequestConfig>,
}

/// A `Result` alias where the `Err` case is [`RequestError`].
pub type Result<T, E = RequestError> = std::result::Result<T, E>;

impl RequestError {
    /// Pairs an error with the configuration that produced it.
    pub fn new(error: Error, config: Arc<RequestConfig>) -> Self {
        Self { error, config }
    }

    /// The underlying error.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// The classification of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Whether the request was cancelled through its token.
    pub fn is_abort(&self) -> bool {
        self.error.is_abort()
    }

    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        self.error.is_timeout()
    }

    /// The rejected status code, if the request failed because of one.
    pub fn status(&self) -> Option<u16> {
        self.error.status()
    }

    /// The merged configuration of the failed request.
    pub fn config(&self) -> &Arc<RequestConfig> {
        &self.config
    }

    /// Discards the configuration.
    pub fn into_error(self) -> Error {
        self.error
    }

    /// Splits into the error and the configuration.
    pub fn into_parts(self) -> (Error, Arc<RequestConfig>) {
        (self.error, self.config)
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl StdError for RequestError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        e.error
    }
}
