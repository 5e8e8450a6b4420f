//! Ordered transformer application.
//!
//! A transformer list is applied strictly in registration order, each
//! step awaited before the next begins. The first failing step rejects
//! the whole flow; later steps never run.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;

type TransformFn<T> = dyn Fn(T) -> BoxFuture<'static, Result<T>> + Send + Sync;

/// A single registered transformer over values of type `T`.
///
/// Synchronous and future-returning closures are both accepted; the
/// synchronous form is promoted to an immediately-ready future so the
/// flow engine treats every step uniformly. A transformer may carry a
/// name, which is the handle for later removal.
pub struct Transformer<T> {
    name: Option<String>,
    func: Arc<TransformFn<T>>,
}

impl<T> Clone for Transformer<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<T: Send + 'static> Transformer<T> {
    /// Wrap a synchronous transformer.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(move |value| {
                let result = f(value);
                Box::pin(async move { result })
            }),
        }
    }

    /// Wrap a future-returning transformer.
    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            name: None,
            func: Arc::new(move |value| Box::pin(f(value))),
        }
    }

    /// Attach a removal handle.
    pub fn named(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn apply(&self, value: T) -> BoxFuture<'static, Result<T>> {
        (self.func)(value)
    }
}

impl<T> fmt::Debug for Transformer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Feed `value` through `transformers` in order.
///
/// Operates on a private copy of the list, so registrations made while
/// a flow is in flight never affect it.
pub async fn flow<T: Send + 'static>(value: T, transformers: &[Transformer<T>]) -> Result<T> {
    let queue: Vec<Transformer<T>> = transformers.to_vec();
    let mut value = value;
    for transformer in queue {
        value = transformer.apply(value).await?;
    }
    Ok(value)
}
