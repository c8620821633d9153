//! Minimal HTTP/1.1 server for redirect-chain integration tests.
//!
//! Each path maps to a canned response. Unknown paths get 404. `{base}` in a
//! header value is replaced by the server's base URL. Every request
//! line and its Host header are recorded so tests can assert which hops ran.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Route {
    /// Redirect with `status` ("301 Moved Permanently", "302 Found") to `location`.
    pub fn redirect(status: &'static str, location: &str, max_age_secs: Option<u64>) -> Self {
        let mut headers = vec![("Location".to_string(), location.to_string())];
        if let Some(secs) = max_age_secs {
            headers.push(("Cache-Control".to_string(), format!("max-age={secs}")));
        }
        Self {
            status,
            headers,
            body: b"moved".to_vec(),
        }
    }

    pub fn ok(body: &[u8], max_age_secs: u64) -> Self {
        Self {
            status: "200 OK",
            headers: vec![
                ("Cache-Control".to_string(), format!("max-age={max_age_secs}")),
                ("Content-Type".to_string(), "text/plain".to_string()),
            ],
            body: body.to_vec(),
        }
    }
}

/// One request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub path: String,
    pub host: Option<String>,
}

pub struct RedirectServer {
    pub base: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl RedirectServer {
    /// Absolute URL for `path` (which must start with '/').
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    pub fn seen_paths(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

/// Starts the server in a background thread. Runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> RedirectServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    let base = format!("http://127.0.0.1:{}/", port);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_srv = Arc::clone(&seen);
    let base_srv = Arc::new(base.clone());
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let seen = Arc::clone(&seen_srv);
            let base = Arc::clone(&base_srv);
            thread::spawn(move || handle(stream, &routes, &seen, &base));
        }
    });
    RedirectServer { base, seen }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    seen: &Mutex<Vec<SeenRequest>>,
    base: &str,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let parsed = parse_request(request);
    seen.lock().unwrap().push(parsed.clone());

    let not_found = Route {
        status: "404 Not Found",
        headers: Vec::new(),
        body: Vec::new(),
    };
    let route = routes.get(&parsed.path).unwrap_or(&not_found);
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status,
        route.body.len()
    );
    for (name, value) in &route.headers {
        let value = value.replace("{base}", base.trim_end_matches('/'));
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&route.body);
}

fn parse_request(request: &str) -> SeenRequest {
    let mut lines = request.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    let host = lines
        .take_while(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("host"))
        .map(|(_, value)| value.trim().to_string());
    SeenRequest { path, host }
}
