use std::fmt;
use std::sync::Arc;

use ajaxkit_interface::{
    AnyTransport, CancelReason, CancellationToken, Error, RequestConfig, Transport,
};
use futures::future;
use tracing::{debug, Instrument};

use crate::hook::HookSet;
use crate::{merge, pipeline, RequestError, Response, Result};

/// Runs requests end to end against one transport.
///
/// For every call the orchestrator merges the configuration layers, runs the
/// `before_request` hooks, sends the request while watching the cancellation token and the
/// timeout, runs the response hooks and finally notifies the terminal hooks.
#[derive(Clone)]
pub struct Orchestrator {
    transport: Arc<dyn AnyTransport>,
}

impl Orchestrator {
    /// Creates an orchestrator sending requests through `transport`.
    pub fn new(transport: impl Transport) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Creates an orchestrator from an already type-erased transport.
    pub fn from_shared(transport: Arc<dyn AnyTransport>) -> Self {
        Self { transport }
    }

    /// Executes one request.
    ///
    /// `layers` are ordered from least to most specific. The returned error carries the
    /// configuration the request was actually made with.
    pub async fn execute<'a, I>(&self, layers: I, hooks: &HookSet) -> Result<Response>
    where
        I: IntoIterator<Item = &'a RequestConfig>,
    {
        let merged = merge(layers);
        let span = tracing::debug_span!(
            "request",
            method = %merged.effective_method(),
            url = merged.url.as_deref().unwrap_or_default(),
        );
        self.run(merged, hooks).instrument(span).await
    }

    async fn run(&self, merged: RequestConfig, hooks: &HookSet) -> Result<Response> {
        let (outcome, config) = match pipeline::before_request(hooks, merged.clone()).await {
            Ok(config) => {
                let config = Arc::new(config);
                (self.dispatch(config.clone()).await, config)
            }
            Err(error) => {
                debug!(%error, "request interceptor failed");
                (Err(error), Arc::new(merged))
            }
        };

        let outcome = pipeline::settle(hooks, outcome, &config).await;
        match &outcome {
            Ok(res) => debug!(status = res.status, "request succeeded"),
            Err(error) => debug!(%error, kind = ?error.kind(), "request failed"),
        }
        pipeline::notify(hooks, &outcome, &config);
        outcome.map_err(|error| RequestError::new(error, config))
    }

    /// Sends the request and races it against cancellation.
    ///
    /// The token handed to the transport fires on the caller's token or on the timeout,
    /// whichever comes first. Once it has fired, its reason decides the outcome. A streamed
    /// body stays tied to the caller's token after this returns; the timeout covers the
    /// exchange only.
    async fn dispatch(&self, config: Arc<RequestConfig>) -> ajaxkit_interface::Result<Response> {
        if config.url.as_deref().map_or(true, str::is_empty) {
            return Err(Error::MissingUrl);
        }

        let timer_token = CancellationToken::new();
        let token = match &config.cancel_token {
            Some(external) => CancellationToken::any_of(external, &timer_token),
            None => timer_token.clone(),
        };
        let timeout = config.effective_timeout();
        if timeout.is_some() && tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::custom("a request timeout requires a Tokio runtime"));
        }

        let exchange = async {
            debug!(transport = ?self.transport, "sending request");
            let raw = self.transport.send(config.clone(), token.clone()).await?;
            debug!(status = raw.status, "received response");
            Response::decode(raw, config.clone()).await
        };
        let timer = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => future::pending().await,
            }
            timer_token.fire_with(CancelReason::Timeout);
        };

        let result = tokio::select! {
            biased;
            reason = token.cancelled() => Err(reason.into_error()),
            result = exchange => result,
            () = timer => Err(Error::Timeout),
        };
        match token.reason() {
            Some(reason) => {
                debug!(?reason, "request cancelled");
                Err(reason.into_error())
            }
            None => result.map(|response| response.cancellable_by(token)),
        }
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("transport", &self.transport)
            .finish()
    }
}
