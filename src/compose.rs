//! Composition: descriptor → transport-ready options.
//!
//! Composition resolves the URL fragments, folds the query fragments
//! into the URL, expands the content-type shorthand, serializes the
//! body, and routes the URL, query, headers, and body through their
//! transformer lists. Nothing here touches the network.

use std::time::Duration;

use http::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::flow::flow;
use crate::query::{QueryCodec, QueryFragment};
use crate::request::{ContentType, Headers, Request, ResponseType};
use crate::resolve::resolve;

const CONTENT_TYPE: &str = "Content-Type";

/// Transport-ready request options produced by [`Request::compose`].
///
/// Descriptor-shaped: every descriptor field survives, with the URL,
/// headers, and body replaced by their final post-transformer values.
/// The body is absent for methods that never carry one.
#[derive(Debug, Clone)]
pub struct Options {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
    pub response_type: Option<ResponseType>,
    pub timeout: Option<Duration>,
    pub simple: bool,
    pub signal: Option<CancellationToken>,
}

impl Request {
    /// Turn this descriptor into transport-ready [`Options`].
    ///
    /// Fails (as an `Err`, never a panic) when no URL fragment has been
    /// supplied or a transformer rejects.
    pub async fn compose(&self) -> Result<Options> {
        let mut headers = self.headers.clone();
        if let Some(content_type) = &self.content_type {
            // The shorthand never clobbers an explicitly different header.
            headers
                .entry(CONTENT_TYPE.to_string())
                .or_insert_with(|| content_type.as_mime().to_string());
        }

        let composed_url = compose_url(&self.urls, &self.query, &self.codec)?;
        let (path, query_map) = split_url(&composed_url, &self.codec);

        let body_eligible = could_have_body(&self.method);
        let serialized = if body_eligible {
            match self.body.clone() {
                Some(body) => Some(serialize_body(body, &headers, &self.codec)?),
                None => None,
            }
        } else {
            None
        };

        // The four dimensions are independent; each list still runs in
        // its own registration order.
        let (query_map, path, headers, body) = tokio::try_join!(
            flow(query_map, &self.transformers.query),
            flow(path, &self.transformers.url),
            flow(headers, &self.transformers.headers),
            async {
                if body_eligible {
                    flow(
                        serialized.unwrap_or(Value::Null),
                        &self.transformers.body,
                    )
                    .await
                } else {
                    Ok(Value::Null)
                }
            },
        )?;

        let query_string = self.codec.stringify(&query_map);
        let url = if query_string.is_empty() {
            path
        } else {
            format!("{}?{}", path, query_string)
        };

        Ok(Options {
            method: self.method.clone(),
            url,
            headers,
            body: if body_eligible && body != Value::Null {
                Some(body)
            } else {
                None
            },
            response_type: self.response_type.clone(),
            timeout: self.timeout,
            simple: self.simple.unwrap_or(false),
            signal: self.signal.clone(),
        })
    }
}

/// `GET`/`HEAD` never carry a body, whatever the spelling.
fn could_have_body(method: &Method) -> bool {
    let name = method.as_str();
    !name.eq_ignore_ascii_case("GET") && !name.eq_ignore_ascii_case("HEAD")
}

/// Resolve the URL fragments and append the accumulated query fragments.
fn compose_url(urls: &[String], query: &[QueryFragment], codec: &QueryCodec) -> Result<String> {
    let prefix = resolve(urls)?;
    let query_string = query
        .iter()
        .map(|fragment| match fragment {
            QueryFragment::Raw(raw) => raw.clone(),
            QueryFragment::Map(map) => codec.stringify(map),
        })
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("&");
    if query_string.is_empty() {
        return Ok(prefix);
    }
    let sep = if prefix.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", prefix, sep, query_string))
}

/// Split a composed URL back into a path and a parsed query mapping, so
/// query transformers observe a structured object however the query was
/// supplied.
fn split_url(url: &str, codec: &QueryCodec) -> (String, crate::query::QueryMap) {
    match url.split_once('?') {
        Some((path, raw_query)) => (path.to_string(), codec.parse(raw_query)),
        None => (url.to_string(), crate::query::QueryMap::new()),
    }
}

/// Serialize a non-string body according to the composed `Content-Type`.
fn serialize_body(body: Value, headers: &Headers, codec: &QueryCodec) -> Result<Value> {
    if body.is_string() {
        return Ok(body);
    }
    match headers.get(CONTENT_TYPE).map(String::as_str) {
        Some(mime) if mime == ContentType::Json.as_mime() => {
            Ok(Value::String(serde_json::to_string(&body)?))
        }
        Some(mime) if mime == ContentType::Form.as_mime() => match body {
            Value::Object(map) => Ok(Value::String(codec.stringify(&map))),
            other => Ok(other),
        },
        _ => Ok(body),
    }
}
