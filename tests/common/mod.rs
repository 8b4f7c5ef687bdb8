//! Shared helpers for the integration tests: an in-process HTTP server on
//! an ephemeral port, and a request recorder.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;
use axum::Router;

/// Serve `app` on `127.0.0.1:0` and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// What the server saw for one request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: Option<String>,
    pub authorization: Option<String>,
    pub api_key: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone, Default)]
pub struct Recorder {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Recorder {
    pub fn record(&self, headers: &HeaderMap, body: serde_json::Value) {
        self.push(None, headers, body);
    }

    /// Like [`Recorder::record`], also keeping the path parameter the
    /// route matched.
    pub fn record_at(&self, path: &str, headers: &HeaderMap, body: serde_json::Value) {
        self.push(Some(path.to_string()), headers, body);
    }

    fn push(&self, path: Option<String>, headers: &HeaderMap, body: serde_json::Value) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(Recorded {
            path,
            authorization: header("authorization"),
            api_key: header("xi-api-key"),
            body,
        });
    }

    pub fn all(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}
