//! Caller-side sink that buffers a whole response.

use std::sync::mpsc::{self, Receiver, Sender};

use super::AsyncFetch;
use crate::http::{HeaderList, RequestHeaders, ResponseHeaders};

/// Final result of a fetch as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub success: bool,
    pub status_code: u16,
    pub headers: HeaderList,
    pub body: Vec<u8>,
    /// Number of `headers_complete` notifications received.
    pub headers_completed: usize,
    /// Number of `flush` notifications received.
    pub flushes: usize,
}

/// [`AsyncFetch`] that accumulates the body and sends a [`FetchOutcome`] on
/// a channel when the fetch completes.
#[derive(Debug)]
pub struct CollectingFetch {
    request: RequestHeaders,
    response: ResponseHeaders,
    body: Vec<u8>,
    headers_completed: usize,
    flushes: usize,
    tx: Sender<FetchOutcome>,
}

impl CollectingFetch {
    /// Returns the sink and the receiving end of its outcome channel.
    pub fn new(request: RequestHeaders) -> (Self, Receiver<FetchOutcome>) {
        let (tx, rx) = mpsc::channel();
        (Self::with_sender(request, tx), rx)
    }

    /// Sink reporting into an existing channel (e.g. one shared by many fetches).
    pub fn with_sender(request: RequestHeaders, tx: Sender<FetchOutcome>) -> Self {
        Self {
            request,
            response: ResponseHeaders::new(),
            body: Vec::new(),
            headers_completed: 0,
            flushes: 0,
            tx,
        }
    }
}

impl AsyncFetch for CollectingFetch {
    fn request_headers(&self) -> &RequestHeaders {
        &self.request
    }

    fn request_headers_mut(&mut self) -> &mut RequestHeaders {
        &mut self.request
    }

    fn response_headers(&self) -> &ResponseHeaders {
        &self.response
    }

    fn response_headers_mut(&mut self) -> &mut ResponseHeaders {
        &mut self.response
    }

    fn headers_complete(&mut self) {
        self.headers_completed += 1;
    }

    fn write(&mut self, content: &[u8]) -> bool {
        self.body.extend_from_slice(content);
        true
    }

    fn flush(&mut self) -> bool {
        self.flushes += 1;
        true
    }

    fn done(self: Box<Self>, success: bool) {
        let this = *self;
        let outcome = FetchOutcome {
            success,
            status_code: this.response.status_code(),
            headers: this.response.headers().clone(),
            body: this.body,
            headers_completed: this.headers_completed,
            flushes: this.flushes,
        };
        // The receiver may have given up waiting; nothing left to notify then.
        if this.tx.send(outcome).is_err() {
            tracing::debug!("fetch outcome dropped: receiver gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::status;

    #[test]
    fn collects_body_and_status() {
        let (mut sink, rx) = CollectingFetch::new(RequestHeaders::new());
        sink.response_headers_mut().set_status_code(status::OK);
        sink.response_headers_mut().add("Content-Type", "text/plain");
        sink.headers_complete();
        assert!(sink.write(b"hello "));
        assert!(sink.write(b"world"));
        assert!(sink.flush());
        Box::new(sink).done(true);

        let out = rx.recv().unwrap();
        assert!(out.success);
        assert_eq!(out.status_code, 200);
        assert_eq!(out.body, b"hello world");
        assert_eq!(out.headers.lookup1("content-type"), Some("text/plain"));
        assert_eq!(out.headers_completed, 1);
        assert_eq!(out.flushes, 1);
    }

    #[test]
    fn done_after_receiver_dropped_does_not_panic() {
        let (sink, rx) = CollectingFetch::new(RequestHeaders::new());
        drop(rx);
        Box::new(sink).done(false);
    }
}
