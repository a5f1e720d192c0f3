//! Scripted local HTTP server standing in for the Open5E API.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper::Response;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use open5e_client::rate_limit::RetryConfig;
use open5e_client::Open5eClient;

/// One scripted response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

#[derive(Default)]
struct MockState {
    /// Scripted responses per request path. Responses are consumed in
    /// order; the final one repeats for any further requests.
    routes: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    /// Full path-and-query of every request received, in arrival order.
    hits: Mutex<Vec<String>>,
}

/// A loopback HTTP server serving scripted JSON responses.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    accept_task: tokio::task::JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Self {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        let state = Arc::new(MockState::default());

        let loop_state = state.clone();
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let io = TokioIo::new(stream);
                let conn_state = loop_state.clone();
                let service = service_fn(move |req: Request<Incoming>| {
                    let state = conn_state.clone();
                    async move { handle(state, req).await }
                });
                tokio::spawn(async move {
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self {
            addr,
            state,
            accept_task,
        }
    }

    /// Base URL for pointing a client at this server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Builds a deterministic client against this server: zero queue and
    /// backoff delays, an in-memory cache, and the given retry count.
    pub fn client(&self, retries: u32) -> Open5eClient {
        Open5eClient::builder()
            .base_url(self.url())
            .batch_delay(Duration::ZERO)
            .retry_config(
                RetryConfig::default()
                    .max_retries(retries)
                    .base_delay(Duration::ZERO),
            )
            .cache(open5e_client::cache::InMemoryCache::new())
            .build()
    }

    /// Appends a scripted response for a path (e.g. `"/spells/"`).
    pub async fn respond(&self, path: &str, response: MockResponse) {
        self.state
            .routes
            .lock()
            .await
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    /// Appends a sequence of scripted responses for a path.
    pub async fn respond_seq(&self, path: &str, responses: Vec<MockResponse>) {
        let mut routes = self.state.routes.lock().await;
        let queue = routes.entry(path.to_string()).or_default();
        queue.extend(responses);
    }

    /// Number of requests received for a path, ignoring the query string.
    pub async fn hit_count(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .await
            .iter()
            .filter(|hit| hit.split('?').next() == Some(path))
            .count()
    }

    /// Full path-and-query log, in arrival order.
    pub async fn hits(&self) -> Vec<String> {
        self.state.hits.lock().await.clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn handle(
    state: Arc<MockState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();
    let full = req
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| path.clone());
    state.hits.lock().await.push(full);

    let mut routes = state.routes.lock().await;
    let response = match routes.get_mut(&path) {
        Some(queue) if !queue.is_empty() => {
            if queue.len() > 1 {
                queue.pop_front().expect("non-empty queue")
            } else {
                queue.front().cloned().expect("non-empty queue")
            }
        }
        _ => MockResponse::new(404, r#"{"detail":"Not found."}"#),
    };

    Ok(Response::builder()
        .status(response.status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(response.body)))
        .expect("build mock response"))
}
