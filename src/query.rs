//! Query fragments and the pluggable query-string codec.
//!
//! Query state accumulates as an ordered list of fragments, either raw
//! pre-encoded strings or structured maps. The codec pair that turns
//! maps into strings and back is injectable per descriptor; the default
//! is built on `url::form_urlencoded`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use url::form_urlencoded;

/// Structured query mapping, as observed by query transformers.
pub type QueryMap = serde_json::Map<String, Value>;

/// One accumulated query fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFragment {
    /// Pre-encoded query string, passed through verbatim.
    Raw(String),
    /// Structured mapping, stringified through the descriptor's codec.
    Map(QueryMap),
}

impl From<&str> for QueryFragment {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for QueryFragment {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<QueryMap> for QueryFragment {
    fn from(map: QueryMap) -> Self {
        Self::Map(map)
    }
}

type StringifyFn = dyn Fn(&QueryMap) -> String + Send + Sync;
type ParseFn = dyn Fn(&str) -> QueryMap + Send + Sync;

/// Injectable stringify/parse capability pair.
///
/// Both sides must agree on the encoding; the compose pipeline round
/// trips the query through `parse` and back through `stringify` so
/// query transformers always observe a structured map.
#[derive(Clone)]
pub struct QueryCodec {
    stringify: Arc<StringifyFn>,
    parse: Arc<ParseFn>,
}

impl QueryCodec {
    /// Replace the stringify half.
    pub fn with_stringify<F>(mut self, f: F) -> Self
    where
        F: Fn(&QueryMap) -> String + Send + Sync + 'static,
    {
        self.stringify = Arc::new(f);
        self
    }

    /// Replace the parse half.
    pub fn with_parse<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> QueryMap + Send + Sync + 'static,
    {
        self.parse = Arc::new(f);
        self
    }

    pub fn stringify(&self, map: &QueryMap) -> String {
        (self.stringify)(map)
    }

    pub fn parse(&self, raw: &str) -> QueryMap {
        (self.parse)(raw)
    }
}

impl Default for QueryCodec {
    fn default() -> Self {
        Self {
            stringify: Arc::new(default_stringify),
            parse: Arc::new(default_parse),
        }
    }
}

impl fmt::Debug for QueryCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCodec").finish_non_exhaustive()
    }
}

/// Default stringify: percent-encoded `key=value` pairs joined by `&`.
///
/// Scalar values render without quoting; compound values fall back to
/// their JSON encoding.
pub fn default_stringify(map: &QueryMap) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in map {
        serializer.append_pair(key, &render_value(value));
    }
    serializer.finish()
}

/// Default parse: split on `&`/`=` with percent-decoding.
///
/// All values come back as strings; a key without `=` maps to the empty
/// string. A repeated key keeps the last occurrence.
pub fn default_parse(raw: &str) -> QueryMap {
    form_urlencoded::parse(raw.as_bytes())
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
