pub mod config;
pub mod curl_fetcher;
pub mod fetch;
pub mod http;
pub mod logging;
pub mod policy;
pub mod redirect;
pub mod url_util;

pub use curl_fetcher::CurlFetcher;
pub use fetch::{AsyncFetch, CollectingFetch, FetchOutcome, UrlFetcher};
pub use redirect::{RedirectError, RedirectFollowingFetcher};
