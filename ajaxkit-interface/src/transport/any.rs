//! Type-erased transport.
//!
//! [`AnyTransport`] is implemented automatically for every [`Transport`], so transport
//! authors never implement it directly.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use super::{RawResponse, Transport};
use crate::{CancellationToken, RequestConfig, Result};

/// Object-safe form of [`Transport`].
pub trait AnyTransport: Send + Sync + 'static {
    /// Provides a textual description of this transport.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    /// Sends the request described by `config`.
    fn send(
        &self,
        config: Arc<RequestConfig>,
        token: CancellationToken,
    ) -> BoxFuture<'_, Result<RawResponse>>;
}

impl<T> AnyTransport for T
where
    T: Transport,
{
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Transport::describe(self, f)
    }

    fn send(
        &self,
        config: Arc<RequestConfig>,
        token: CancellationToken,
    ) -> BoxFuture<'_, Result<RawResponse>> {
        Box::pin(Transport::send(self, config, token))
    }
}

impl fmt::Debug for dyn AnyTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f)
    }
}
