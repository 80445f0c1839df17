//! Minimal HTTP stub server for exercising the client against canned
//! vendor responses. Records every request so tests can assert on call
//! counts and write payloads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned response for one exact path (query strings are ignored).
pub(crate) struct StubRoute {
    status: u16,
    body: String,
    delay_ms: u64,
}

impl StubRoute {
    pub(crate) fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay_ms: 0,
        }
    }

    pub(crate) fn json(body: &str) -> Self {
        Self::new(200, body)
    }

    /// Delay the response; combined with a short client timeout this
    /// simulates a hung endpoint
    pub(crate) fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

pub(crate) struct StubServer {
    base_url: String,
    hits: Arc<Mutex<Vec<(String, String)>>>,
}

impl StubServer {
    pub(crate) async fn start(routes: Vec<(&'static str, StubRoute)>) -> Self {
        Self::start_deferred(move |_| routes).await
    }

    /// Like `start`, but the route table may reference the server's own
    /// base URL (needed when a canned response advertises the transport
    /// URL).
    pub(crate) async fn start_deferred<F>(make_routes: F) -> Self
    where
        F: FnOnce(&str) -> Vec<(&'static str, StubRoute)>,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let routes: Arc<HashMap<String, StubRoute>> = Arc::new(
            make_routes(&base_url)
                .into_iter()
                .map(|(path, route)| (path.to_string(), route))
                .collect(),
        );
        let hits = Arc::new(Mutex::new(Vec::new()));

        let task_hits = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(handle_connection(
                    stream,
                    Arc::clone(&routes),
                    Arc::clone(&task_hits),
                ));
            }
        });

        Self { base_url, hits }
    }

    pub(crate) fn url(&self) -> String {
        self.base_url.clone()
    }

    /// Total number of requests received, regardless of path
    pub(crate) fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    pub(crate) fn hits_for(&self, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .count()
    }

    /// Request bodies received for a path, in arrival order
    pub(crate) fn bodies_for(&self, path: &str) -> Vec<String> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    routes: Arc<HashMap<String, StubRoute>>,
    hits: Arc<Mutex<Vec<(String, String)>>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        if buf.len() > 65_536 {
            return;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let request_target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let path = request_target.split('?').next().unwrap_or("/").to_string();

    let mut content_length = 0;
    for line in head.lines().skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    while buf.len() < header_end + content_length {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    hits.lock().unwrap().push((path.clone(), body));

    let (status, response_body, delay_ms) = match routes.get(&path) {
        Some(route) => (route.status, route.body.clone(), route.delay_ms),
        None => (404, "{}".to_string(), 0),
    };
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        response_body.len(),
        response_body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// A well-formed JWT issuance response with an expiry one hour out
pub(crate) fn jwt_response_body(jwt: &str, user_id: &str) -> String {
    let expiry = (Utc::now() + chrono::Duration::hours(1))
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        r#"{{"jwt": "{}", "claims": {{"expirationTime": "{}", "subject": {{"nestId": {{"id": "{}"}}}}}}}}"#,
        jwt, expiry, user_id
    )
}
