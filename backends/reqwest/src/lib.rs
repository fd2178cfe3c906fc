//! A [`Transport`] for `ajaxkit` on top of [`reqwest`].
//!
//! ```no_run
//! # async fn run() -> ajaxkit_interface::Result<()> {
//! use ajaxkit_backend_reqwest::ReqwestTransport;
//!
//! let transport = ReqwestTransport::builder()
//!     .user_agent("my-app/1.0")
//!     .build();
//! # let _ = transport;
//! # Ok(())
//! # }
//! ```
//!
//! The transport honours the URL, `params`, method, headers, body, basic auth,
//! `max_redirects` and `max_response_size` of the resolved configuration, and gives up as
//! soon as the cancellation token fires. Timeouts are enforced by the `ajaxkit`
//! orchestrator through that token. `extensions` are ignored.
//!
//! Requests issued outside of a Tokio runtime run on a single-threaded runtime owned by the
//! transport.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;
mod error;
mod request;
mod response;
mod runtime;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ajaxkit_interface::{CancellationToken, RawResponse, RequestConfig, Result, Transport};
use tracing::debug;

use crate::client::{ClientOptions, ReqwestClient};
use crate::error::ReqwestBackendError;

/// The transport implementation using reqwest.
///
/// Cloning is cheap and shares the underlying connection pools.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

/// Builds a [`ReqwestTransport`].
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ReqwestTransportBuilder {
    options: ClientOptions,
}

impl ReqwestTransport {
    /// A transport with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f)
    }
}

impl ReqwestTransportBuilder {
    /// Sets the `User-Agent` sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = Some(user_agent.into());
        self
    }

    /// Ignores the system proxy settings.
    pub fn no_proxy(mut self) -> Self {
        self.options.use_default_proxy = false;
        self
    }

    /// Bounds the time spent establishing a connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = Some(timeout);
        self
    }

    /// Accepts invalid TLS certificates. Only meant for testing.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.options.ignore_certificate_errors = accept;
        self
    }

    /// Builds the transport. Clients are created lazily on first use.
    pub fn build(self) -> ReqwestTransport {
        ReqwestTransport {
            client: ReqwestClient::new(self.options),
        }
    }
}

impl Transport for ReqwestTransport {
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReqwestTransport")
    }

    async fn send(
        &self,
        config: Arc<RequestConfig>,
        token: CancellationToken,
    ) -> Result<RawResponse> {
        let client = self
            .client
            .client_for(config.max_redirects)
            .map_err(ajaxkit_interface::Error::from)?;
        let request = request::build_request(&client, &config)?;
        debug!(
            max_redirects = config.max_redirects,
            response_type = ?config.effective_response_type(),
            "sending with reqwest"
        );

        runtime::execute_with_runtime(&self.client.managed_runtime, move || async move {
            tokio::select! {
                biased;
                reason = token.cancelled() => Err(reason.into_error()),
                result = exchange(request, &config) => result,
            }
        })
        .await?
    }
}

async fn exchange(request: reqwest::RequestBuilder, config: &RequestConfig) -> Result<RawResponse> {
    let response = request.send().await.map_err(ReqwestBackendError::Reqwest)?;
    Ok(response::into_raw_response(response, config).await?)
}
