//! HTTP policy layer: robots compliance, rate limiting, bounded retries.
//!
//! Every outbound request in the pipeline goes through [`HttpClient`].
//! The robots cache and the rate limiter are shared across clones, so
//! one client instance defines one policy domain.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::rate_limiter::RateLimiter;
use super::robots::{self, RobotsPolicy};

/// Settings the policy layer needs from configuration.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// User agent sent with every request and matched against robots.txt.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum interval between consecutive outbound requests.
    pub min_interval: Duration,
    /// Retries after the first attempt; total attempts are one more.
    pub retry_total: u32,
    /// Base backoff in seconds, doubled on each further retry.
    pub retry_backoff: f64,
    /// Whether to fetch and honor robots.txt.
    pub respect_robots: bool,
}

/// Errors from the HTTP policy layer.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// robots.txt disallows the URL. No request was issued for it.
    #[error("robots.txt disallows {url}")]
    RobotsDenied { url: String },
    /// Non-2xx status that is not worth retrying.
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    /// Transient statuses kept coming back until the attempt budget ran out.
    #[error("{url} still failing after {attempts} attempts (last status {last_status})")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_status: StatusCode,
    },
    /// Connection, timeout, or protocol failure.
    #[error("transport error fetching {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The URL could not be parsed.
    #[error("invalid url: {url}")]
    InvalidUrl { url: String },
    /// Downloaded bytes could not be written to disk.
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one attempt that may still be retried.
enum Transient {
    Status(StatusCode),
    Transport(reqwest::Error),
}

/// HTTP client enforcing the acquisition policy.
///
/// Cloning is cheap and shares the robots cache and rate limiter, so a
/// clone obeys the same floor and the same cached policies.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    settings: Arc<HttpSettings>,
    rate_limiter: RateLimiter,
    robots: Arc<Mutex<HashMap<String, RobotsPolicy>>>,
}

impl HttpClient {
    /// Create a client from policy settings.
    pub fn new(settings: HttpSettings) -> Self {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            rate_limiter: RateLimiter::new(settings.min_interval),
            robots: Arc::new(Mutex::new(HashMap::new())),
            settings: Arc::new(settings),
        }
    }

    /// Fetch a URL's body as bytes, subject to the full policy.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if self.settings.respect_robots {
            self.check_robots(url).await?;
        }

        let response = self.request_with_retries(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        Ok(bytes.to_vec())
    }

    /// Fetch a URL's body as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        if self.settings.respect_robots {
            self.check_robots(url).await?;
        }

        let response = self.request_with_retries(url).await?;
        response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })
    }

    /// Fetch a URL and write the body to `path`, creating parent
    /// directories. Returns the downloaded bytes so callers can hash
    /// them without re-reading the file.
    pub async fn download(&self, url: &str, path: &Path) -> Result<Vec<u8>, FetchError> {
        let bytes = self.fetch(url).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| FetchError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(bytes)
    }

    /// Apply the origin's robots policy, fetching and caching
    /// robots.txt on first encounter of the origin.
    async fn check_robots(&self, url: &str) -> Result<(), FetchError> {
        let origin = robots::origin_of(url).ok_or_else(|| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        let mut cache = self.robots.lock().await;
        if !cache.contains_key(&origin) {
            let policy = self.fetch_robots(&origin).await;
            cache.insert(origin.clone(), policy);
        }

        if cache[&origin].allows(&self.settings.user_agent, url) {
            Ok(())
        } else {
            debug!("robots.txt denies {}", url);
            Err(FetchError::RobotsDenied {
                url: url.to_string(),
            })
        }
    }

    /// Fetch robots.txt for an origin: one plain GET, rate limited like
    /// any other request but never retried. Every failure mode
    /// (transport error, non-2xx, unreadable body) degrades to
    /// allow-all for that origin.
    async fn fetch_robots(&self, origin: &str) -> RobotsPolicy {
        let url = robots::robots_url(origin);
        self.rate_limiter.acquire().await;

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => {
                    debug!("Fetched robots.txt for {}", origin);
                    RobotsPolicy::from_body(body)
                }
                Err(e) => {
                    warn!("Unreadable robots.txt for {}: {}", origin, e);
                    RobotsPolicy::allow_all()
                }
            },
            Ok(response) => {
                debug!(
                    "robots.txt for {} returned {}, allowing all",
                    origin,
                    response.status()
                );
                RobotsPolicy::allow_all()
            }
            Err(e) => {
                warn!("Failed to fetch robots.txt for {}: {}", origin, e);
                RobotsPolicy::allow_all()
            }
        }
    }

    /// Issue a GET with the rate floor applied, retrying transient
    /// failures (429, 500, 502, 503, 504, timeouts, connection errors)
    /// up to the configured budget with doubling backoff.
    async fn request_with_retries(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let max_attempts = self.settings.retry_total + 1;
        let mut attempt = 0;

        loop {
            self.rate_limiter.acquire().await;
            attempt += 1;

            let failure = match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if !is_transient(status) {
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status,
                        });
                    }
                    Transient::Status(status)
                }
                Err(e) if e.is_timeout() || e.is_connect() => Transient::Transport(e),
                Err(e) => {
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        source: e,
                    })
                }
            };

            if attempt >= max_attempts {
                return Err(match failure {
                    Transient::Status(last_status) => FetchError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: max_attempts,
                        last_status,
                    },
                    Transient::Transport(source) => FetchError::Transport {
                        url: url.to_string(),
                        source,
                    },
                });
            }

            let backoff = self.settings.retry_backoff * f64::powi(2.0, attempt as i32 - 1);
            match &failure {
                Transient::Status(status) => {
                    warn!("{} returned {}, retrying in {:.1}s", url, status, backoff)
                }
                Transient::Transport(e) => {
                    warn!("Transport failure for {} ({}), retrying in {:.1}s", url, e, backoff)
                }
            }
            tokio::time::sleep(Duration::from_secs_f64(backoff.max(0.0))).await;
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}
