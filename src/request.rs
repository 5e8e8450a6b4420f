//! The request descriptor.
//!
//! A [`Request`] accumulates everything needed to dispatch one logical
//! HTTP request: URL fragments, query fragments, headers, body, method,
//! response-handling policy, and the per-hook transformer lists.
//! Mutation goes through consuming builder methods (or the [`Patch`]
//! enum they wrap); deriving a variant request is a `clone()` plus more
//! builder calls, and never disturbs the original.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::flow::Transformer;
use crate::query::{QueryCodec, QueryFragment, QueryMap};
use crate::response::{Fetched, Response};
use crate::transport::Transport;

/// Request headers as plain string pairs, merged key-wise.
pub type Headers = BTreeMap<String, String>;

/// `Content-Type` shorthand carried by the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Form,
    /// Any other MIME type, used verbatim.
    Other(String),
}

impl ContentType {
    pub fn as_mime(&self) -> &str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
            Self::Other(mime) => mime,
        }
    }
}

/// Named response extraction applied after a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseType {
    /// Parse the body as JSON.
    Json,
    /// Decode the body as UTF-8 text.
    Text,
    /// An extraction this pipeline does not know; the raw response is
    /// passed through untouched.
    Other(String),
}

/// One typed mutation of a [`Request`].
///
/// The builder methods are sugar over these; `Patch` exists so a
/// mutation can be built up, stored, and applied later as a value.
pub enum Patch {
    Method(Method),
    /// Append one URL fragment.
    Url(String),
    /// Append one query fragment.
    Query(QueryFragment),
    Header(String, String),
    /// Merge a header mapping, incoming keys overwriting existing ones.
    Headers(Headers),
    /// Merge (mapping onto mapping) or replace the body.
    Body(Value),
    ContentType(ContentType),
    ResponseType(ResponseType),
    Timeout(Duration),
    Simple(bool),
    Signal(CancellationToken),
    /// Rewrite the accumulated URL fragments through a function.
    MapUrls(Box<dyn FnOnce(Vec<String>) -> Vec<String> + Send>),
    /// Rewrite the accumulated query fragments through a function.
    MapQuery(Box<dyn FnOnce(Vec<QueryFragment>) -> Vec<QueryFragment> + Send>),
    /// Rewrite the header mapping through a function.
    MapHeaders(Box<dyn FnOnce(Headers) -> Headers + Send>),
    /// Rewrite the body through a function.
    MapBody(Box<dyn FnOnce(Option<Value>) -> Option<Value> + Send>),
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Method(_) => "Method",
            Self::Url(_) => "Url",
            Self::Query(_) => "Query",
            Self::Header(..) => "Header",
            Self::Headers(_) => "Headers",
            Self::Body(_) => "Body",
            Self::ContentType(_) => "ContentType",
            Self::ResponseType(_) => "ResponseType",
            Self::Timeout(_) => "Timeout",
            Self::Simple(_) => "Simple",
            Self::Signal(_) => "Signal",
            Self::MapUrls(_) => "MapUrls",
            Self::MapQuery(_) => "MapQuery",
            Self::MapHeaders(_) => "MapHeaders",
            Self::MapBody(_) => "MapBody",
        };
        f.write_str(name)
    }
}

/// Per-hook transformer lists.
///
/// Cloned by value with the descriptor, so a derived request's lists
/// are independent of its origin's.
#[derive(Clone, Default)]
pub(crate) struct Transformers {
    pub(crate) query: Vec<Transformer<QueryMap>>,
    pub(crate) url: Vec<Transformer<String>>,
    pub(crate) body: Vec<Transformer<Value>>,
    pub(crate) headers: Vec<Transformer<Headers>>,
    pub(crate) response: Vec<Transformer<Response>>,
    pub(crate) response_data: Vec<Transformer<Fetched>>,
    pub(crate) error: Vec<Transformer<Error>>,
}

impl Transformers {
    fn extend_from(&mut self, other: &Transformers) {
        self.query.extend(other.query.iter().cloned());
        self.url.extend(other.url.iter().cloned());
        self.body.extend(other.body.iter().cloned());
        self.headers.extend(other.headers.iter().cloned());
        self.response.extend(other.response.iter().cloned());
        self.response_data.extend(other.response_data.iter().cloned());
        self.error.extend(other.error.iter().cloned());
    }
}

/// The request descriptor.
#[derive(Clone)]
pub struct Request {
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) method: Method,
    pub(crate) urls: Vec<String>,
    pub(crate) query: Vec<QueryFragment>,
    pub(crate) headers: Headers,
    pub(crate) body: Option<Value>,
    pub(crate) content_type: Option<ContentType>,
    pub(crate) response_type: Option<ResponseType>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) simple: Option<bool>,
    pub(crate) signal: Option<CancellationToken>,
    pub(crate) codec: QueryCodec,
    pub(crate) transformers: Transformers,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Create an empty descriptor with defaults (`GET`, no URL, no body).
    pub fn new() -> Self {
        Self {
            transport: None,
            method: Method::GET,
            urls: Vec::new(),
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
            content_type: None,
            response_type: None,
            timeout: None,
            simple: None,
            signal: None,
            codec: QueryCodec::default(),
            transformers: Transformers::default(),
        }
    }

    /// Attach the transport used by `fetch`.
    pub fn with_transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Append one URL fragment.
    pub fn url(mut self, fragment: impl Into<String>) -> Self {
        self.urls.push(fragment.into());
        self
    }

    /// Append one query fragment (a raw string or a structured map).
    pub fn query(mut self, fragment: impl Into<QueryFragment>) -> Self {
        self.query.push(fragment.into());
        self
    }

    /// Set one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Merge a header mapping; incoming keys overwrite existing ones.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set or merge the body.
    ///
    /// When both the existing and incoming values are mappings the keys
    /// merge, incoming side winning; anything else replaces.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        let incoming = body.into();
        self.body = Some(match (self.body.take(), incoming) {
            (Some(Value::Object(mut prev)), Value::Object(new)) => {
                prev.extend(new);
                Value::Object(prev)
            }
            (_, incoming) => incoming,
        });
        self
    }

    /// Set the `Content-Type` shorthand.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Set the response extraction applied after a successful dispatch.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Set the execution timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// In simple mode a non-ok response is converted into an error.
    pub fn simple(mut self, simple: bool) -> Self {
        self.simple = Some(simple);
        self
    }

    /// Attach a cancellation signal.
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Override the query stringify capability.
    pub fn query_stringify<F>(mut self, f: F) -> Self
    where
        F: Fn(&QueryMap) -> String + Send + Sync + 'static,
    {
        self.codec = self.codec.with_stringify(f);
        self
    }

    /// Override the query parse capability.
    pub fn query_parse<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> QueryMap + Send + Sync + 'static,
    {
        self.codec = self.codec.with_parse(f);
        self
    }

    /// Rewrite the accumulated URL fragments through a function.
    pub fn map_urls(mut self, f: impl FnOnce(Vec<String>) -> Vec<String>) -> Self {
        self.urls = f(std::mem::take(&mut self.urls));
        self
    }

    /// Rewrite the accumulated query fragments through a function.
    pub fn map_query(mut self, f: impl FnOnce(Vec<QueryFragment>) -> Vec<QueryFragment>) -> Self {
        self.query = f(std::mem::take(&mut self.query));
        self
    }

    /// Rewrite the header mapping through a function.
    pub fn map_headers(mut self, f: impl FnOnce(Headers) -> Headers) -> Self {
        self.headers = f(std::mem::take(&mut self.headers));
        self
    }

    /// Rewrite the body through a function.
    pub fn map_body(mut self, f: impl FnOnce(Option<Value>) -> Option<Value>) -> Self {
        self.body = f(self.body.take());
        self
    }

    /// Apply one typed mutation.
    pub fn set(self, patch: Patch) -> Self {
        match patch {
            Patch::Method(method) => self.method(method),
            Patch::Url(fragment) => self.url(fragment),
            Patch::Query(fragment) => self.query(fragment),
            Patch::Header(name, value) => self.header(name, value),
            Patch::Headers(headers) => self.headers(headers),
            Patch::Body(body) => self.body(body),
            Patch::ContentType(content_type) => self.content_type(content_type),
            Patch::ResponseType(response_type) => self.response_type(response_type),
            Patch::Timeout(timeout) => self.timeout(timeout),
            Patch::Simple(simple) => self.simple(simple),
            Patch::Signal(signal) => self.signal(signal),
            Patch::MapUrls(f) => self.map_urls(f),
            Patch::MapQuery(f) => self.map_query(f),
            Patch::MapHeaders(f) => self.map_headers(f),
            Patch::MapBody(f) => self.map_body(f),
        }
    }

    /// Merge another descriptor into this one.
    ///
    /// URL and query fragments append, headers and mapping bodies merge
    /// key-wise, scalar fields take the other side's value where it is
    /// set, and the other side's transformer lists are appended to this
    /// one's (as independent copies).
    pub fn extend(mut self, other: &Request) -> Self {
        if other.transport.is_some() {
            self.transport = other.transport.clone();
        }
        self.method = other.method.clone();
        self.urls.extend(other.urls.iter().cloned());
        self.query.extend(other.query.iter().cloned());
        self.headers.extend(other.headers.clone());
        if let Some(body) = &other.body {
            self = self.body(body.clone());
        }
        if other.content_type.is_some() {
            self.content_type = other.content_type.clone();
        }
        if other.response_type.is_some() {
            self.response_type = other.response_type.clone();
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.simple.is_some() {
            self.simple = other.simple;
        }
        if other.signal.is_some() {
            self.signal = other.signal.clone();
        }
        self.codec = other.codec.clone();
        self.transformers.extend_from(&other.transformers);
        self
    }
}

macro_rules! transformer_hooks {
    ($($field:ident : $ty:ty => $add:ident, $add_async:ident, $push:ident, $remove:ident;)*) => {
        impl Request {
            $(
                #[doc = concat!("Register a synchronous ", stringify!($field), " transformer.")]
                pub fn $add<F>(mut self, f: F) -> Self
                where
                    F: Fn($ty) -> Result<$ty> + Send + Sync + 'static,
                {
                    self.transformers.$field.push(Transformer::new(f));
                    self
                }

                #[doc = concat!("Register a future-returning ", stringify!($field), " transformer.")]
                pub fn $add_async<F, Fut>(mut self, f: F) -> Self
                where
                    F: Fn($ty) -> Fut + Send + Sync + 'static,
                    Fut: std::future::Future<Output = Result<$ty>> + Send + 'static,
                {
                    self.transformers.$field.push(Transformer::new_async(f));
                    self
                }

                #[doc = concat!("Register a pre-built ", stringify!($field), " transformer, possibly named.")]
                pub fn $push(mut self, transformer: Transformer<$ty>) -> Self {
                    self.transformers.$field.push(transformer);
                    self
                }

                #[doc = concat!("Remove every ", stringify!($field), " transformer registered under `name`.")]
                pub fn $remove(&mut self, name: &str) -> bool {
                    let before = self.transformers.$field.len();
                    self.transformers.$field.retain(|t| t.name() != Some(name));
                    self.transformers.$field.len() != before
                }
            )*
        }
    };
}

transformer_hooks! {
    query: QueryMap => add_query_transformer, add_query_transformer_async, push_query_transformer, remove_query_transformer;
    url: String => add_url_transformer, add_url_transformer_async, push_url_transformer, remove_url_transformer;
    body: Value => add_body_transformer, add_body_transformer_async, push_body_transformer, remove_body_transformer;
    headers: Headers => add_headers_transformer, add_headers_transformer_async, push_headers_transformer, remove_headers_transformer;
    response: Response => add_response_transformer, add_response_transformer_async, push_response_transformer, remove_response_transformer;
    response_data: Fetched => add_response_data_transformer, add_response_data_transformer_async, push_response_data_transformer, remove_response_data_transformer;
    error: Error => add_error_transformer, add_error_transformer_async, push_error_transformer, remove_error_transformer;
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("urls", &self.urls)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("content_type", &self.content_type)
            .field("response_type", &self.response_type)
            .field("timeout", &self.timeout)
            .field("simple", &self.simple)
            .field("has_signal", &self.signal.is_some())
            .field("has_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}
