//! Interface definitions shared by the ajaxkit facade and its transports.
//!
//! This crate holds the data a request is made of and the contract a transport must fulfil.
//! It knows nothing about interceptors or configuration layering; those live in the
//! `ajaxkit` crate.
//!
//! ## Transports
//!
//! A transport implements [`Transport`]: it receives the final, merged [`RequestConfig`]
//! and a [`CancellationToken`], performs the actual exchange and returns a [`RawResponse`]
//! or a classified [`Error`]. Transports are passed explicitly to whoever needs them; there
//! is no process-wide registration.
//!
//! ## Cancellation
//!
//! [`CancellationToken`] is a multicast, fire-once signal that is independent of any
//! particular transport. See the [`cancel`] module.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod body;
pub mod cancel;
pub mod config;
mod error;
pub mod multimap;
mod request;
pub mod transport;

pub use body::Body;
pub use cancel::{Callback, CancelReason, CancellationToken, DropGuard};
pub use config::{BasicAuth, Extensions, RequestConfig, ResponseType, StatusValidator};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use multimap::{Headers, Params};
pub use request::Method;
pub use transport::{
    transport_fn, AnyTransport, BodyStream, FnTransport, RawBody, RawResponse, Transport,
};
