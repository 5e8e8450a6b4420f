//! Response value type returned by transports.
//!
//! A transport produces one of these per dispatched request. The
//! execution engine only relies on the status, the ok predicate, and
//! the `json`/`text` extraction methods; everything else is convenience
//! for callers and response transformers.

use bytes::Bytes;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::request::ResponseType;

/// HTTP response as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    body: Bytes,
    /// The URL that was actually dispatched, stamped by the engine.
    pub url: Option<String>,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: Vec::new(),
            body: body.into(),
            url: None,
        }
    }

    /// Append a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the effective URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// First header with the given name, case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| Error::decode(format!("UTF-8 decode error: {}", e)))
    }

    /// Body deserialized as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Run the named extraction over this response.
    ///
    /// Returns `None` for extraction names this response does not
    /// support; the caller passes the raw response through instead.
    pub(crate) fn extract(&self, response_type: &ResponseType) -> Result<Option<Value>> {
        match response_type {
            ResponseType::Json => self.json::<Value>().map(Some),
            ResponseType::Text => self.text().map(|s| Some(Value::String(s))),
            ResponseType::Other(_) => Ok(None),
        }
    }
}

/// Outcome of a dispatched request: the raw response, or the value a
/// `ResponseType` extraction produced from it.
///
/// ResponseData transformers run over this, whichever side it is.
#[derive(Debug, Clone)]
pub enum Fetched {
    Response(Response),
    Data(Value),
}

impl Fetched {
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Response(res) => Some(res),
            Self::Data(_) => None,
        }
    }

    pub fn into_data(self) -> Option<Value> {
        match self {
            Self::Response(_) => None,
            Self::Data(value) => Some(value),
        }
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Self::Response(_) => None,
            Self::Data(value) => Some(value),
        }
    }

    /// Deserialize the extracted data (or the raw body) into `T`.
    pub fn json<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Data(value) => serde_json::from_value(value).map_err(Error::from),
            Self::Response(res) => res.json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_range() {
        assert!(Response::new(200, "OK", "").ok());
        assert!(Response::new(204, "No Content", "").ok());
        assert!(!Response::new(304, "Not Modified", "").ok());
        assert!(!Response::new(404, "Not Found", "").ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let res = Response::new(200, "OK", "").with_header("Content-Type", "text/plain");
        assert_eq!(res.get_header("content-type"), Some("text/plain"));
        assert_eq!(res.get_header("X-Missing"), None);
    }

    #[test]
    fn test_text_extraction() {
        let res = Response::new(200, "OK", "hello");
        assert_eq!(res.text().unwrap(), "hello");
    }

    #[test]
    fn test_json_extraction() {
        let res = Response::new(200, "OK", r#"{"a":1}"#);
        let value: Value = res.json().unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_unknown_extraction_passes_through() {
        let res = Response::new(200, "OK", "whatever");
        let out = res.extract(&ResponseType::Other("blob".into())).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let res = Response::new(200, "OK", "not json");
        assert!(res.extract(&ResponseType::Json).is_err());
    }
}
