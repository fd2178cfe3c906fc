//! The transport contract.
//!
//! A transport performs the actual HTTP exchange for a fully resolved
//! [`RequestConfig`]. It owns nothing of the pipeline: hooks, merging, status validation
//! and body decoding all happen in the `ajaxkit` facade.
//!
//! Transports must watch the [`CancellationToken`] they are given and give up promptly
//! when it fires. The facade races the transport against the token anyway, so a
//! transport that ignores it only wastes work.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, BoxStream};
use futures::TryStreamExt;

mod any;

pub use any::AnyTransport;

use crate::{CancellationToken, Error, Headers, RequestConfig, Result};

/// A response body stream.
pub type BodyStream = BoxStream<'static, Result<Vec<u8>>>;

/// Trait for HTTP transports.
pub trait Transport: Send + Sync + 'static {
    /// Provides a textual description of this transport.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transport")
    }

    /// Sends the request described by `config`.
    ///
    /// Errors must be classified: connectivity failures as [`Error::Network`], an observed
    /// cancellation as the token's reason (see [`CancelReason::into_error`]).
    ///
    /// [`CancelReason::into_error`]: crate::CancelReason::into_error
    fn send(
        &self,
        config: Arc<RequestConfig>,
        token: CancellationToken,
    ) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// What a transport hands back: status, headers and an undecoded body.
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Response body.
    pub body: RawBody,
}

impl RawResponse {
    /// A response with no headers and a buffered body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: RawBody::Bytes(body.into()),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// An undecoded response body.
pub enum RawBody {
    /// A fully buffered body.
    Bytes(Vec<u8>),
    /// A body still being received.
    Stream(BodyStream),
}

impl RawBody {
    /// Buffers the whole body, failing with [`Error::ResponseTooLarge`] past `limit` bytes.
    pub async fn collect(self, limit: Option<u64>) -> Result<Vec<u8>> {
        let exceeds = |len: usize| limit.is_some_and(|limit| len as u64 > limit);
        match self {
            Self::Bytes(bytes) if exceeds(bytes.len()) => Err(Error::ResponseTooLarge),
            Self::Bytes(bytes) => Ok(bytes),
            Self::Stream(mut stream) => {
                let mut buf = Vec::new();
                while let Some(chunk) = stream.try_next().await? {
                    buf.extend_from_slice(&chunk);
                    if exceeds(buf.len()) {
                        return Err(Error::ResponseTooLarge);
                    }
                }
                Ok(buf)
            }
        }
    }

    /// Turns the body into a stream.
    pub fn into_stream(self) -> BodyStream {
        match self {
            Self::Bytes(bytes) if bytes.is_empty() => Box::pin(stream::empty()),
            Self::Bytes(bytes) => Box::pin(stream::once(async move { Ok(bytes) })),
            Self::Stream(stream) => stream,
        }
    }
}

impl fmt::Debug for RawBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Vec<u8>> for RawBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A [`Transport`] backed by a closure. Created by [`transport_fn`].
#[derive(Clone)]
pub struct FnTransport<F>(F);

/// Turns a closure returning a future into a [`Transport`].
///
/// ```
/// use ajaxkit_interface::{transport_fn, RawResponse};
///
/// let transport = transport_fn(|config, _token| async move {
///     Ok(RawResponse::new(200, config.url.clone().unwrap_or_default()))
/// });
/// # let _ = transport;
/// ```
pub fn transport_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(Arc<RequestConfig>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawResponse>> + Send + 'static,
{
    FnTransport(f)
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(Arc<RequestConfig>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawResponse>> + Send + 'static,
{
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FnTransport")
    }

    fn send(
        &self,
        config: Arc<RequestConfig>,
        token: CancellationToken,
    ) -> impl Future<Output = Result<RawResponse>> + Send {
        (self.0)(config, token)
    }
}
