use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::json;
use wraith::{BoxError, Options, Response, Transport};

/// Transport-level fake mirroring the routes a fixture server would
/// serve, with call recording for assertions.
///
/// Routes:
/// - `/ok`    → 200, JSON body echoing the request method
/// - `/text`  → 200, plain `ok`
/// - `/404`   → 404 Not Found
/// - `/delay` → 200 after 100ms
/// - anything else → 200 with an empty body
#[derive(Clone, Default)]
pub struct MockTransport {
    calls: Arc<Mutex<Vec<(String, Options)>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(url, options)` pair dispatched so far.
    pub fn calls(&self) -> Vec<(String, Options)> {
        self.calls.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn call(&self, url: String, options: Options) -> BoxFuture<'static, Result<Response, BoxError>> {
        let calls = Arc::clone(&self.calls);
        Box::pin(async move {
            calls.lock().unwrap().push((url.clone(), options.clone()));
            let path = route_path(&url);
            let response = match path.as_str() {
                "/ok" => Response::new(
                    200,
                    "OK",
                    json!({ "method": options.method.as_str() }).to_string(),
                ),
                "/text" => Response::new(200, "OK", "ok"),
                "/404" => Response::new(404, "Not Found", ""),
                "/delay" => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Response::new(200, "OK", json!({ "delayed": true }).to_string())
                }
                _ => Response::new(200, "OK", ""),
            };
            Ok(response)
        })
    }
}

/// Path portion of a URL, without scheme, authority, or query.
fn route_path(url: &str) -> String {
    let rest = url.split("://").nth(1).unwrap_or(url);
    let path = match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => "/",
    };
    path.split('?').next().unwrap_or("/").to_string()
}
