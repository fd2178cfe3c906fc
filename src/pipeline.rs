//! The interceptor pipeline.
//!
//! Phases run strictly one after another and hooks within a phase run in order:
//!
//! 1. `before_request` hooks thread the configuration through.
//! 2. The caller runs the transport.
//! 3. On success, `before_success` hooks thread the response through. Any error moves on
//!    to the failure path.
//! 4. On failure, `before_fail` hooks are tried in order until one recovers. A hook that
//!    fails replaces the current error for the next one.
//! 5. Terminal hooks observe the outcome: `on_success`, or exactly one of `on_abort` and
//!    `on_fail`. `on_complete` hooks run last, whatever the outcome.

use std::sync::Arc;

use ajaxkit_interface::{Error, RequestConfig, Result};
use tracing::debug;

use crate::hook::HookSet;
use crate::Response;

pub(crate) async fn before_request(
    hooks: &HookSet,
    mut config: RequestConfig,
) -> Result<RequestConfig> {
    for hook in &hooks.before_request {
        config = hook(config).await?;
    }
    Ok(config)
}

/// Runs the success sub-phase, then the failure sub-phase if needed.
pub(crate) async fn settle(
    hooks: &HookSet,
    outcome: Result<Response>,
    config: &Arc<RequestConfig>,
) -> Result<Response> {
    let error = match outcome {
        Ok(res) => match before_success(hooks, res).await {
            Ok(res) => return Ok(res),
            Err(error) => {
                debug!(%error, "response rejected by interceptor");
                error
            }
        },
        Err(error) => error,
    };
    before_fail(hooks, error, config).await
}

async fn before_success(hooks: &HookSet, mut res: Response) -> Result<Response> {
    for hook in &hooks.before_success {
        res = hook(res).await?;
    }
    Ok(res)
}

async fn before_fail(
    hooks: &HookSet,
    mut error: Error,
    config: &Arc<RequestConfig>,
) -> Result<Response> {
    for (index, hook) in hooks.before_fail.iter().enumerate() {
        let kind = error.kind();
        match hook(error, config.clone()).await {
            Ok(res) => {
                debug!(hook = index, ?kind, "request rescued");
                return Ok(res);
            }
            Err(e) => error = e,
        }
    }
    Err(error)
}

/// Runs the terminal hooks for `outcome`.
pub(crate) fn notify(hooks: &HookSet, outcome: &Result<Response>, config: &RequestConfig) {
    match outcome {
        Ok(res) => hooks.on_success.iter().for_each(|hook| hook(res)),
        Err(error) if error.is_abort() => {
            hooks.on_abort.iter().for_each(|hook| hook(error, config))
        }
        Err(error) => hooks.on_fail.iter().for_each(|hook| hook(error, config)),
    }
    for hook in &hooks.on_complete {
        hook(outcome.as_ref(), config);
    }
}
