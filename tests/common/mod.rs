//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Router,
};
use tokio::net::TcpListener;

use html_precompressor::{Dictionary, HttpServer, PrecompressorConfig, Shutdown};

/// One request as seen by the mock storage service.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub request_id: Option<String>,
    pub body: serde_json::Value,
}

/// Programmable stand-in for the HTML storage service.
#[derive(Clone)]
pub struct MockDownstream {
    pub addr: SocketAddr,
    status: StatusCode,
    delay: Duration,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockDownstream {
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Poll until at least `n` requests arrived or `timeout` passes.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.count() >= n {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.count() >= n
    }
}

/// Start a mock storage service that answers every request with `status`.
pub async fn start_mock_downstream(status: u16) -> MockDownstream {
    start_slow_downstream(status, Duration::ZERO).await
}

/// Like [`start_mock_downstream`], recording the request and then waiting `delay` before answering.
pub async fn start_slow_downstream(status: u16, delay: Duration) -> MockDownstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mock = MockDownstream {
        addr: listener.local_addr().unwrap(),
        status: StatusCode::from_u16(status).unwrap(),
        delay,
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new().fallback(record).with_state(mock.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    mock
}

async fn record(State(mock): State<MockDownstream>, uri: Uri, headers: HeaderMap, body: Bytes) -> StatusCode {
    let request = RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        request_id: headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    };
    mock.requests.lock().unwrap().push(request);

    if !mock.delay.is_zero() {
        tokio::time::sleep(mock.delay).await;
    }
    mock.status
}

/// An address nothing is listening on.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Raw-content dictionary shared by the tests.
pub fn test_dictionary() -> Arc<Dictionary> {
    let corpus = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title></title></head>\
                  <body><div class=\"post\"><p></p></div></body></html>"
        .repeat(8);
    Arc::new(Dictionary::load(corpus.as_bytes(), 9).unwrap())
}

/// A running precompressor relaying to `endpoint`.
pub struct Precompressor {
    pub addr: SocketAddr,
    pub dictionary: Arc<Dictionary>,
    shutdown: Shutdown,
}

impl Precompressor {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Precompressor {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_precompressor(endpoint: &str) -> Precompressor {
    let mut config = PrecompressorConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.downstream.endpoint = endpoint.to_string();

    let dictionary = test_dictionary();
    let server = HttpServer::new(config, dictionary.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Precompressor {
        addr,
        dictionary,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Decode a relayed `body` field back into HTML.
pub fn decode_body(dictionary: &Dictionary, value: &serde_json::Value) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let frame = STANDARD.decode(value.as_str().unwrap()).unwrap();
    dictionary.decompress(&frame).unwrap()
}
