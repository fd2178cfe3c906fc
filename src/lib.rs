//! A configurable HTTP request library with layered configuration, interceptors and
//! cancellation.
//!
//! ## Overview
//!
//! `ajaxkit` does not talk to the network itself. It wraps a [`Transport`] behind one
//! `RequestConfig -> Response` contract and adds what applications typically rebuild on
//! top of every HTTP client:
//!
//! - Configuration layers (global defaults, per-service defaults, per-call overrides)
//!   merged with field-specific rules. See [`merge`].
//! - An interceptor pipeline with recoverable failures. See [`Hook`].
//! - Cooperative cancellation shared between the request, its timeout and the scope that
//!   started it. See [`CancellationToken`].
//! - Service hierarchies that inherit configuration and interceptors. See [`Service`].
//!
//! ## Transports
//!
//! Any type implementing [`Transport`] can carry requests. The
//! [`ajaxkit-backend-reqwest`](https://docs.rs/ajaxkit-backend-reqwest) crate provides
//! one on top of `reqwest`; tests and adapters can use [`transport_fn`]. Transports are
//! handed to [`Service::builder`] explicitly; there is no global registration.
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run(transport: impl ajaxkit::Transport) -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use ajaxkit::{Error, Service};
//!
//! let api = Service::builder(transport)
//!     .base_url("https://api.example.com/v1")
//!     .header("Accept", "application/json")
//!     .timeout(Duration::from_secs(10))
//!     .before_fail(|error: Error, _config| async move {
//!         tracing::warn!(%error, "request failed");
//!         Err(error)
//!     })
//!     .build();
//!
//! let users = api.extend().base_url("/users").build();
//! let me: serde_json::Value = users.get("me").await?.json()?;
//! # let _ = me;
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime
//!
//! Timeouts rely on `tokio`'s timer, so requests with a timeout must run inside a Tokio
//! runtime with the time driver enabled. Outside a runtime such a request fails with
//! [`Error::Custom`] before reaching the transport.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(missing_docs)]

mod error;
pub mod hook;
pub mod merge;
mod orchestrator;
mod pipeline;
mod response;
mod service;

pub use ajaxkit_interface::{
    transport_fn, AnyTransport, BasicAuth, Body, BoxError, CancelReason, CancellationToken,
    DropGuard, Error, ErrorKind, Extensions, Headers, Method, Params, RawBody, RawResponse,
    RequestConfig, ResponseType, StatusValidator, Transport,
};
pub use error::{RequestError, Result};
pub use hook::{Hook, HookSet, Phase};
pub use merge::{join_url, merge};
pub use orchestrator::Orchestrator;
pub use response::{Response, ResponseData};
pub use service::{Service, ServiceBuilder};
