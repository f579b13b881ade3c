//! Local mock of the bot service for integration tests, on `tiny_http`.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tiny_http::{Header, Response, Server};

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    /// All values of a header, matched case-insensitively.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

type Handler = dyn Fn(&Recorded) -> (u16, String) + Send + Sync;

/// Serves every request through `handler` until dropped.
pub struct MockServer {
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    port: u16,
}

impl MockServer {
    pub fn start(handler: impl Fn(&Recorded) -> (u16, String) + Send + Sync + 'static) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock server"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("mock server listens on TCP")
            .port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                while let Ok(mut request) = server.recv() {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let recorded = Recorded {
                        method: request.method().as_str().to_string(),
                        url: request.url().to_string(),
                        headers: request
                            .headers()
                            .iter()
                            .map(|h| (h.field.as_str().to_string(), h.value.as_str().to_string()))
                            .collect(),
                        body,
                    };
                    let (status, payload) = handler(&recorded);
                    requests.lock().unwrap().push(recorded);

                    let response = Response::from_string(payload)
                        .with_status_code(status)
                        .with_header(
                            Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                                .unwrap(),
                        );
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            server,
            handle: Some(handle),
            requests,
            port,
        }
    }

    /// Base URL including the `/api` prefix.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Raw TCP server that drops its first `drops` connections without answering
/// and serves `body` as a 200 JSON response on every later one.
pub struct DroppingServer {
    connections: Arc<AtomicUsize>,
    port: u16,
}

impl DroppingServer {
    pub fn start(drops: usize, body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind dropping server");
        let port = listener.local_addr().expect("dropping server address").port();
        let connections = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&connections);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                if counter.fetch_add(1, Ordering::SeqCst) < drops {
                    drop(stream);
                    continue;
                }

                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                let mut line = String::new();
                while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }
                let _ = write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
            }
        });

        Self { connections, port }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// A base URL nothing is listening on.
pub fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind unused port");
    let port = listener.local_addr().expect("unused port address").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api")
}

pub fn status_json(state: &str) -> serde_json::Value {
    serde_json::json!({
        "status": state,
        "last_updated": "2025-01-15T10:30:00Z",
        "monitoring_channels": ["general"],
        "ai_features": {
            "sentiment_analysis": true,
            "anomaly_detection": true,
            "auto_reports": false
        }
    })
}

pub fn ok(data: serde_json::Value) -> (u16, String) {
    (200, serde_json::json!({"success": true, "data": data}).to_string())
}
