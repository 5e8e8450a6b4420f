//! # Wraith
//!
//! Composable HTTP request pipeline over pluggable transports.
//!
//! Wraith prepares one logical request at a time: descriptors
//! accumulate URL fragments, query fragments, headers, and a body
//! through cloning builders; typed transformer hooks rewrite each
//! dimension of the request and response at fixed pipeline stages; and
//! execution races the transport against a timeout and a cancellation
//! signal. The transport itself is an injected capability; there is no
//! connection pooling, retrying, caching, or redirect handling here.

pub mod client;
pub mod compose;
pub mod error;
pub mod flow;
pub mod query;
pub mod request;
pub mod resolve;
pub mod response;
pub mod transport;

// Re-exports
pub use client::Client;
pub use compose::Options;
pub use error::{BoxError, Error, ErrorKind, Result};
pub use flow::Transformer;
pub use query::{QueryCodec, QueryFragment, QueryMap};
pub use request::{ContentType, Headers, Patch, Request, ResponseType};
pub use response::{Fetched, Response};
pub use transport::Transport;
