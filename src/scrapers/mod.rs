//! Scraping layer: HTTP policy enforcement and page parsing.

pub mod dates;
pub mod detail;
pub mod http_client;
pub mod listing;
pub mod rate_limiter;
pub mod robots;

pub use http_client::{FetchError, HttpClient, HttpSettings};
pub use rate_limiter::RateLimiter;
