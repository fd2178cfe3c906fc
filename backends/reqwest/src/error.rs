use ajaxkit_interface::Error as AjaxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReqwestBackendError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("tokio error: {0}")]
    Tokio(#[from] tokio::task::JoinError),
    #[error("response too large")]
    ResponseTooLarge,
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ReqwestBackendError> for AjaxError {
    fn from(err: ReqwestBackendError) -> Self {
        match err {
            ReqwestBackendError::Reqwest(e) if e.is_timeout() => AjaxError::Timeout,
            ReqwestBackendError::Reqwest(e) if e.is_builder() => AjaxError::other(e),
            ReqwestBackendError::Reqwest(e) => AjaxError::network(e),
            ReqwestBackendError::ResponseTooLarge => AjaxError::ResponseTooLarge,
            ReqwestBackendError::InvalidUrl(url) => AjaxError::InvalidUrl(url),
            ReqwestBackendError::Io(e) => AjaxError::Io(e),
            other => AjaxError::other(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReqwestBackendError>;
