//! Composition behavior: URL resolution through descriptors, query
//! folding, header shorthand, and body serialization.

use http::Method;
use serde_json::{json, Value};
use wraith::{ContentType, QueryMap, Request};

const HOST: &str = "http://host";

fn query_map(pairs: &[(&str, &str)]) -> QueryMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[tokio::test]
async fn composes_a_single_url_fragment() {
    let options = Request::new().url(format!("{HOST}/foo/bar")).compose().await.unwrap();
    assert_eq!(options.url, format!("{HOST}/foo/bar"));
}

#[tokio::test]
async fn preserves_a_trailing_slash() {
    let options = Request::new().url(format!("{HOST}/foo/bar/")).compose().await.unwrap();
    assert_eq!(options.url, format!("{HOST}/foo/bar/"));
}

#[tokio::test]
async fn composes_a_bare_slash() {
    let options = Request::new().url("/").compose().await.unwrap();
    assert_eq!(options.url, "/");
}

#[tokio::test]
async fn extends_the_url_across_fragments() {
    let options = Request::new()
        .url(HOST)
        .url("/foo/bar")
        .compose()
        .await
        .unwrap();
    assert_eq!(options.url, format!("{HOST}/foo/bar"));
}

#[tokio::test]
async fn a_later_absolute_url_overrides_prior_fragments() {
    let options = Request::new()
        .url("http://elsewhere.example")
        .url(HOST)
        .url("/foo/bar")
        .compose()
        .await
        .unwrap();
    assert_eq!(options.url, format!("{HOST}/foo/bar"));
}

#[tokio::test]
async fn resolves_parent_segments() {
    let options = Request::new()
        .url(HOST)
        .url("/foo/bar/")
        .url("../baz")
        .compose()
        .await
        .unwrap();
    assert_eq!(options.url, format!("{HOST}/foo/baz"));
}

#[tokio::test]
async fn map_urls_rewrites_the_fragment_list() {
    let options = Request::new()
        .url(HOST)
        .map_urls(|mut urls| {
            urls.push("/foo/bar".to_string());
            urls
        })
        .compose()
        .await
        .unwrap();
    assert_eq!(options.url, format!("{HOST}/foo/bar"));
}

#[tokio::test]
async fn folds_map_and_string_query_fragments() {
    let options = Request::new()
        .url(HOST)
        .query("hello=world")
        .query(query_map(&[("it", "works")]))
        .compose()
        .await
        .unwrap();
    assert_eq!(options.url, format!("{HOST}?hello=world&it=works"));
}

#[tokio::test]
async fn appends_query_to_an_existing_search() {
    let options = Request::new()
        .url(format!("{HOST}?foo=bar"))
        .query("hello=world")
        .compose()
        .await
        .unwrap();
    assert_eq!(options.url, format!("{HOST}?foo=bar&hello=world"));
}

#[tokio::test]
async fn map_query_replaces_accumulated_fragments() {
    let options = Request::new()
        .url(HOST)
        .query("hello=world")
        .map_query(|_| vec![query_map(&[("hello", "chris")]).into()])
        .compose()
        .await
        .unwrap();
    assert_eq!(options.url, format!("{HOST}?hello=chris"));
}

#[tokio::test]
async fn merges_headers_across_set_calls() {
    let options = Request::new()
        .url(HOST)
        .header("hello", "world")
        .header("it", "works")
        .header("hello", "chris")
        .compose()
        .await
        .unwrap();
    assert_eq!(options.headers.get("hello").map(String::as_str), Some("chris"));
    assert_eq!(options.headers.get("it").map(String::as_str), Some("works"));
}

#[tokio::test]
async fn json_shorthand_expands_to_a_content_type_header() {
    let options = Request::new()
        .url(HOST)
        .content_type(ContentType::Json)
        .compose()
        .await
        .unwrap();
    assert_eq!(
        options.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
}

#[tokio::test]
async fn form_shorthand_expands_and_encodes_the_body() {
    let options = Request::new()
        .url(HOST)
        .method(Method::POST)
        .body(json!({"hello": "world"}))
        .content_type(ContentType::Form)
        .compose()
        .await
        .unwrap();
    assert_eq!(
        options.headers.get("Content-Type").map(String::as_str),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(options.body, Some(json!("hello=world")));
}

#[tokio::test]
async fn json_shorthand_serializes_a_mapping_body() {
    let options = Request::new()
        .url(HOST)
        .method(Method::POST)
        .body(json!({"a": 1}))
        .content_type(ContentType::Json)
        .compose()
        .await
        .unwrap();
    assert_eq!(options.body, Some(json!(r#"{"a":1}"#)));
}

#[tokio::test]
async fn body_without_shorthand_stays_structured() {
    let options = Request::new()
        .url(HOST)
        .method(Method::POST)
        .body(json!({"hello": "world"}))
        .body(json!({"it": "works"}))
        .compose()
        .await
        .unwrap();
    assert_eq!(options.body, Some(json!({"hello": "world", "it": "works"})));
}

#[tokio::test]
async fn get_requests_never_carry_a_body() {
    let options = Request::new()
        .url(HOST)
        .body(json!({"a": 1}))
        .compose()
        .await
        .unwrap();
    assert!(options.body.is_none());
}

#[tokio::test]
async fn custom_stringify_drives_form_encoding() {
    let options = Request::new()
        .url("/")
        .method(Method::POST)
        .body(json!({"hello": "world"}))
        .content_type(ContentType::Form)
        .query_stringify(|_| "foo=bar".to_string())
        .compose()
        .await
        .unwrap();
    assert_eq!(options.body, Some(json!("foo=bar")));
}

#[tokio::test]
async fn custom_parse_feeds_query_transformers() {
    let options = Request::new()
        .url("/")
        .query(query_map(&[("hello", "world")]))
        .query_parse(|_| query_map(&[("foo", "bar")]))
        .add_query_transformer(|q| {
            assert_eq!(q.get("foo"), Some(&json!("bar")));
            Ok(q)
        })
        .compose()
        .await
        .unwrap();
    assert_eq!(options.url, "/?foo=bar");
}

#[tokio::test]
async fn composing_twice_yields_equal_options() {
    let req = Request::new()
        .url(format!("{HOST}/ok"))
        .method(Method::POST)
        .query("hello=world")
        .body(json!({"a": 1}))
        .content_type(ContentType::Json);
    let first = req.compose().await.unwrap();
    let second = req.compose().await.unwrap();
    assert_eq!(first.url, second.url);
    assert_eq!(first.method, second.method);
    assert_eq!(first.headers, second.headers);
    assert_eq!(first.body, second.body);
}
