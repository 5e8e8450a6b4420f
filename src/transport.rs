//! The transport capability.
//!
//! The pipeline prepares one logical request and hands it to a
//! transport; everything underneath (sockets, pooling, redirects) is
//! the transport's business.

use std::future::Future;

use futures::future::BoxFuture;

use crate::compose::Options;
use crate::error::BoxError;
use crate::response::Response;

/// An opaque dispatch capability: `(url, options) -> Response`.
///
/// Implemented automatically for async closures of the same shape, so a
/// test or an adapter over any HTTP client is one closure away.
pub trait Transport: Send + Sync + 'static {
    /// Dispatch one request.
    fn call(&self, url: String, options: Options) -> BoxFuture<'static, Result<Response, BoxError>>;

    /// Whether this transport honors `Options::signal` natively.
    ///
    /// When true, the execution engine leaves cancellation entirely to
    /// the transport instead of racing its own abort arm.
    fn supports_signal(&self) -> bool {
        false
    }
}

impl<F, Fut> Transport for F
where
    F: Fn(String, Options) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, BoxError>> + Send + 'static,
{
    fn call(&self, url: String, options: Options) -> BoxFuture<'static, Result<Response, BoxError>> {
        Box::pin(self(url, options))
    }
}
