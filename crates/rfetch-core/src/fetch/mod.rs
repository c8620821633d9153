//! Asynchronous fetch contract.
//!
//! A transport ([`UrlFetcher`]) is handed a URL and a boxed sink
//! ([`AsyncFetch`]). It fills in the sink's response headers and then
//! delivers, in order: one `headers_complete`, zero or more `write`s,
//! optional `flush`es, and exactly one `done`. `done` consumes the sink, so
//! nothing can be delivered after completion.

mod collect;

pub use collect::{CollectingFetch, FetchOutcome};

use crate::http::{RequestHeaders, ResponseHeaders};

/// Callback sink for one fetch.
///
/// Transports may deliver callbacks on any thread, hence `Send`.
pub trait AsyncFetch: Send {
    fn request_headers(&self) -> &RequestHeaders;
    fn request_headers_mut(&mut self) -> &mut RequestHeaders;
    fn response_headers(&self) -> &ResponseHeaders;
    fn response_headers_mut(&mut self) -> &mut ResponseHeaders;

    /// Response status and headers are final.
    fn headers_complete(&mut self);

    /// A chunk of response body. Returns false if the sink could not accept it.
    fn write(&mut self, content: &[u8]) -> bool;

    /// Returns false if the sink failed to flush.
    fn flush(&mut self) -> bool {
        true
    }

    /// Terminal notification; the sink is dropped once this returns.
    fn done(self: Box<Self>, success: bool);
}

/// Something that can fetch one URL at a time.
pub trait UrlFetcher: Send + Sync {
    /// Starts fetching `url`, delivering results to `fetch`. Returns as soon
    /// as the fetch has been issued.
    fn fetch(&self, url: &str, fetch: Box<dyn AsyncFetch>);

    /// Whether https URLs can be fetched.
    fn supports_https(&self) -> bool {
        true
    }
}
