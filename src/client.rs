//! Client factory and request execution.
//!
//! Execution composes a snapshot of the descriptor, hands the result to
//! the transport, and walks the response chain (Response hooks, simple
//! check, extraction, ResponseData hooks) while racing a timeout timer
//! and a cancellation signal. Any failure is routed through the Error
//! hooks with the last observed response attached.

use std::sync::{Arc, Mutex};

use crate::compose::Options;
use crate::error::{Error, Result};
use crate::flow::flow;
use crate::request::Request;
use crate::response::{Fetched, Response};
use crate::transport::Transport;

/// Factory for independent request descriptors sharing one transport.
///
/// There is no process-wide default descriptor: every [`Client::request`]
/// call clones the client's base, so derived requests (and their
/// transformer lists) never observe each other.
#[derive(Debug, Clone)]
pub struct Client {
    base: Request,
}

impl Client {
    /// Create a client with an empty base descriptor over `transport`.
    pub fn new(transport: impl Transport) -> Self {
        Self {
            base: Request::new().with_transport(transport),
        }
    }

    /// Create a client from a fully configured base descriptor.
    ///
    /// Every request derived from this client inherits the base's
    /// fields and transformer lists.
    pub fn with_base(base: Request) -> Self {
        Self { base }
    }

    /// Hand out an independent descriptor derived from the base.
    pub fn request(&self) -> Request {
        self.base.clone()
    }

    /// One-shot dispatch of `url` against the base descriptor.
    pub async fn fetch(&self, url: impl Into<String>) -> Result<Fetched> {
        self.request().url(url).fetch().await
    }
}

type ResponseSlot = Arc<Mutex<Option<Response>>>;

impl Request {
    /// Compose and dispatch this request.
    ///
    /// The descriptor itself is never mutated; every call works from a
    /// snapshot, so sequential fetches on one descriptor are
    /// independent and transformers registered mid-flight only affect
    /// later calls.
    pub async fn fetch(&self) -> Result<Fetched> {
        let request = self.clone();
        let slot: ResponseSlot = Arc::default();
        match dispatch(&request, &slot).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let response = slot.lock().expect("response slot mutex poisoned").take();
                let err = err.with_response(response);
                // An error transformer that fails replaces the error.
                let err = match flow(err, &request.transformers.error).await {
                    Ok(transformed) => transformed,
                    Err(replacement) => replacement,
                };
                Err(err)
            }
        }
    }
}

async fn dispatch(request: &Request, slot: &ResponseSlot) -> Result<Fetched> {
    let options = request.compose().await?;
    let transport = request
        .transport
        .clone()
        .ok_or_else(|| Error::config("no transport attached"))?;

    tracing::debug!("dispatching {} {}", options.method, options.url);

    let timeout = options.timeout;
    let signal = if transport.supports_signal() {
        // The transport honors the signal itself; no second race arm.
        None
    } else {
        options.signal.clone()
    };

    let chain = response_chain(request, transport, options, slot.clone());
    tokio::pin!(chain);

    let timer = async {
        match timeout {
            Some(after) => {
                tokio::time::sleep(after).await;
                after
            }
            None => std::future::pending().await,
        }
    };
    tokio::pin!(timer);

    let abort = async {
        match &signal {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(abort);

    // Biased with the chain first: a transport that is ready on its
    // first poll beats a zero timeout and an already-fired signal.
    // Dropping out of the select clears the timer.
    tokio::select! {
        biased;
        result = &mut chain => result,
        after = &mut timer => {
            tracing::debug!("request timed out after {:?}", after);
            Err(Error::timeout(after))
        }
        _ = &mut abort => {
            tracing::debug!("request aborted by signal");
            Err(Error::aborted())
        }
    }
}

/// Transport call plus the ordered response-side pipeline.
async fn response_chain(
    request: &Request,
    transport: Arc<dyn Transport>,
    options: Options,
    slot: ResponseSlot,
) -> Result<Fetched> {
    let url = options.url.clone();
    let simple = options.simple;
    let response_type = options.response_type.clone();

    let response = transport
        .call(url.clone(), options)
        .await
        .map_err(Error::transport)?;
    let response = if response.url.is_none() {
        response.with_url(url)
    } else {
        response
    };
    park(&slot, &response);

    let response = flow(response, &request.transformers.response).await?;
    park(&slot, &response);

    if simple && !response.ok() {
        return Err(Error::status(response.status, response.status_text.clone()));
    }

    let outcome = match &response_type {
        Some(response_type) if response.ok() => match response.extract(response_type)? {
            Some(data) => Fetched::Data(data),
            None => Fetched::Response(response),
        },
        _ => Fetched::Response(response),
    };

    flow(outcome, &request.transformers.response_data).await
}

fn park(slot: &ResponseSlot, response: &Response) {
    *slot.lock().expect("response slot mutex poisoned") = Some(response.clone());
}
