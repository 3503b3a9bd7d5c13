//! Configuration from environment variables.
//!
//! Every setting has a default; a `.env` file is honored because `main`
//! calls `dotenvy::dotenv()` before anything reads the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::scrapers::HttpSettings;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "bulletins.db";

/// Default listing seed.
const DEFAULT_SEED_URL: &str = "https://www.mospi.gov.in/press-release";

/// Default base origin for resolving relative links.
const DEFAULT_BASE_URL: &str = "https://www.mospi.gov.in";

/// Subdirectory of the data dir that holds downloaded PDFs.
const PDF_SUBDIR: &str = "raw/pdf";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listing seed URLs, iterated in order.
    pub seed_urls: Vec<String>,
    /// Base origin for resolving relative links.
    pub base_url: String,
    /// Highest `?page=` offset fetched per seed (inclusive).
    pub max_pages: u32,
    /// Minimum interval between any two outbound requests.
    pub rate_limit: Duration,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Whether robots.txt is consulted before requests.
    pub respect_robots: bool,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retries after the first attempt for transient failures.
    pub retry_total: u32,
    /// Exponential backoff factor between retries, in seconds.
    pub retry_backoff: f64,
    /// Base data directory (database and downloads).
    pub data_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed_urls: vec![DEFAULT_SEED_URL.to_string()],
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: 3,
            rate_limit: Duration::from_secs_f64(1.0),
            user_agent: "statacquire/0.1 (+https://example.org/statacquire; contact@example.org)"
                .to_string(),
            respect_robots: true,
            request_timeout: Duration::from_secs(30),
            retry_total: 3,
            retry_backoff: 0.6,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed_urls = match lookup("SEED_URLS") {
            Some(raw) => {
                let seeds: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if seeds.is_empty() {
                    defaults.seed_urls
                } else {
                    seeds
                }
            }
            None => defaults.seed_urls,
        };

        Self {
            seed_urls,
            base_url: lookup("BASE_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.base_url),
            max_pages: env_parse(&lookup, "MAX_PAGES", defaults.max_pages),
            rate_limit: Duration::from_secs_f64(
                env_parse(&lookup, "RATE_LIMIT_SECONDS", 1.0f64).max(0.0),
            ),
            user_agent: lookup("USER_AGENT")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.user_agent),
            respect_robots: env_bool(&lookup, "RESPECT_ROBOTS", defaults.respect_robots),
            request_timeout: Duration::from_secs(env_parse(&lookup, "REQUEST_TIMEOUT", 30u64)),
            retry_total: env_parse(&lookup, "RETRY_TOTAL", defaults.retry_total),
            retry_backoff: env_parse(&lookup, "RETRY_BACKOFF", defaults.retry_backoff),
            data_dir: lookup("DATA_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    /// Create settings with a custom data directory.
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// Get the full path to the database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_DATABASE_FILENAME)
    }

    /// Get the directory downloaded PDFs are written to.
    pub fn download_dir(&self) -> PathBuf {
        self.data_dir.join(PDF_SUBDIR)
    }

    /// Deterministic download path for a file row.
    pub fn download_path(&self, file_id: i64) -> PathBuf {
        self.download_dir().join(format!("{}.pdf", file_id))
    }

    /// Ensure the data and download directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        create_dir_with_context(&self.data_dir)?;
        create_dir_with_context(&self.download_dir())?;
        Ok(())
    }

    /// HTTP policy settings derived from these settings.
    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            user_agent: self.user_agent.clone(),
            timeout: self.request_timeout,
            min_interval: self.rate_limit,
            retry_total: self.retry_total,
            retry_backoff: self.retry_backoff,
            respect_robots: self.respect_robots,
        }
    }
}

fn create_dir_with_context(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to create directory '{}': {}", dir.display(), e),
        )
    })
}

/// Parse a numeric environment value, falling back to the default on error.
fn env_parse<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("Ignoring malformed {}={:?}, using default", key, raw);
                default
            }
        },
        None => default,
    }
}

/// Parse a boolean environment value (1/true/yes/on vs 0/false/no/off).
fn env_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!("Ignoring malformed {}={:?}, using default", key, raw);
                default
            }
        },
        None => default,
    }
}
