//! rigging - runtime support for generated service bindings
//!
//! `rigging-codegen` turns a `pub trait` into three bindings: a remote handler,
//! a remote client and a local delegating client. The generated code only
//! talks to the types in this crate:
//!
//! - [`Context`] carries the caller's deadline and cancellation.
//! - [`Failure`] is the failure channel every fallible method returns.
//! - [`Reply`] and [`Status`] are one finished exchange.
//! - [`Router`] maps `/{unit}/{Method}` paths to handlers.
//! - [`Transport`] performs one request/response exchange; [`InProcess`]
//!   dispatches straight into a [`Router`], and with the `http` feature
//!   [`HttpTransport`] posts JSON over HTTP to a server built with
//!   [`http::axum_router`].

#![deny(unsafe_code)]

mod context;
mod failure;
mod reply;
mod router;
mod transport;

#[cfg(feature = "http")]
pub mod http;

pub use context::Context;
pub use failure::{Failure, Status};
pub use reply::{Reply, call, decode, encode};
pub use router::{Handler, Router};
pub use transport::{InProcess, Transport};

#[cfg(feature = "http")]
pub use http::HttpTransport;

// Re-exports for generated code. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}
