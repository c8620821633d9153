//! libcurl-backed transport.
//!
//! Each fetch runs one `Easy2` handle on its own thread. curl's own redirect
//! handling is off: a 3xx is delivered to the sink like any other response,
//! which is what lets `RedirectFollowingFetcher` sit on top.

mod parse;

use std::str;
use std::thread;
use std::time::Duration;

use curl::easy::{Easy2, Handler, List, WriteError};

use crate::config::TransportConfig;
use crate::fetch::{AsyncFetch, UrlFetcher};

/// Transport that performs one HTTP GET per fetch with libcurl.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: Option<String>,
}

impl CurlFetcher {
    pub fn new(cfg: &TransportConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }

    fn configure(
        &self,
        easy: &mut Easy2<SinkHandler>,
        url: &str,
        headers: List,
    ) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(false)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }
        easy.http_headers(headers)?;
        Ok(())
    }

    /// Runs one transfer to completion on the current thread.
    fn perform(&self, url: &str, fetch: Box<dyn AsyncFetch>) {
        // Build curl list for request headers (e.g. "Host: value").
        let mut headers = List::new();
        let mut header_error = None;
        for (name, value) in fetch.request_headers().headers().iter() {
            if let Err(e) = headers.append(&format!("{}: {}", name.trim(), value.trim())) {
                header_error = Some(e);
            }
        }

        let mut easy = Easy2::new(SinkHandler::new(fetch));
        let result = match header_error {
            Some(e) => Err(e),
            None => self
                .configure(&mut easy, url, headers)
                .and_then(|_| easy.perform()),
        };

        let handler = easy.get_mut();
        if result.is_ok() || !handler.header_lines.is_empty() {
            handler.complete_headers();
        }
        let write_failed = handler.write_failed;
        let Some(fetch) = handler.fetch.take() else {
            return;
        };
        match result {
            Ok(()) => {
                tracing::debug!(url, status = fetch.response_headers().status_code(), "fetch done");
                fetch.done(!write_failed);
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "fetch failed");
                fetch.done(false);
            }
        }
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl UrlFetcher for CurlFetcher {
    fn fetch(&self, url: &str, fetch: Box<dyn AsyncFetch>) {
        let this = self.clone();
        let url = url.to_string();
        thread::spawn(move || this.perform(&url, fetch));
    }

    fn supports_https(&self) -> bool {
        curl::Version::get().feature_ssl()
    }
}

/// Easy2 handler forwarding curl callbacks to an `AsyncFetch`.
struct SinkHandler {
    fetch: Option<Box<dyn AsyncFetch>>,
    header_lines: Vec<String>,
    headers_sent: bool,
    write_failed: bool,
}

impl SinkHandler {
    fn new(fetch: Box<dyn AsyncFetch>) -> Self {
        Self {
            fetch: Some(fetch),
            header_lines: Vec::new(),
            headers_sent: false,
            write_failed: false,
        }
    }

    /// Publishes collected headers to the sink, once.
    fn complete_headers(&mut self) {
        if self.headers_sent {
            return;
        }
        self.headers_sent = true;
        if let Some(fetch) = self.fetch.as_mut() {
            parse::apply_header_lines(&self.header_lines, fetch.response_headers_mut());
            fetch.headers_complete();
        }
    }
}

impl Handler for SinkHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if !line.is_empty() {
                self.header_lines.push(line.to_string());
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.complete_headers();
        let accepted = self.fetch.as_mut().is_some_and(|fetch| fetch.write(data));
        if accepted {
            Ok(data.len())
        } else {
            self.write_failed = true;
            Ok(0)
        }
    }
}
