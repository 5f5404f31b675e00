//! Minimal HTTP/1.1 responder for client tests.
//!
//! Serves canned responses keyed by method and path (query string ignored)
//! and records every request it receives.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub(crate) struct Route {
    method: &'static str,
    path: String,
    status: u16,
    body: String,
    /// Announced `Content-Length` when it differs from the body, to
    /// simulate a peer that hangs up mid-response.
    declared_len: Option<usize>,
}

impl Route {
    pub(crate) fn new(method: &'static str, path: &str, status: u16, body: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
            declared_len: None,
        }
    }

    pub(crate) fn json(method: &'static str, path: &str, body: serde_json::Value) -> Self {
        Self::new(method, path, 200, &body.to_string())
    }

    /// 200 response that announces `declared_len` bytes, sends `body`, and
    /// closes the connection.
    pub(crate) fn truncated(method: &'static str, path: &str, body: &str, declared_len: usize) -> Self {
        Self {
            declared_len: Some(declared_len),
            ..Self::new(method, path, 200, body)
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Header lookup by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) struct TestServer {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestServer {
    pub(crate) fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                handle(stream, &routes, &recorded);
            }
        });

        Self { port, requests }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &[Route],
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> Option<()> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if name == "content-length" {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((name, value));
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;

    let path = target.split('?').next().unwrap_or_default();
    let (status, payload, declared_len) = routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .map(|r| (r.status, r.body.as_str(), r.declared_len))
        .unwrap_or((404, r#"{"message":"no route"}"#, None));

    // Record before answering so the client never observes a response
    // whose request is not yet visible.
    recorded.lock().unwrap().push(RecordedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        declared_len.unwrap_or(payload.len()),
        payload
    );
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()
}
