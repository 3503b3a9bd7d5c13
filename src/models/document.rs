//! Bulletin document models.
//!
//! A document is one press release or publication: either a detail page
//! with metadata and attached PDFs, or a PDF linked straight from a
//! listing page. Documents are keyed by canonical URL and fingerprinted
//! with a SHA-256 of that URL.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Category assigned to bulletins discovered from press release listings.
pub const CATEGORY_PRESS_RELEASE: &str = "Press Release";

/// Compute the hex SHA-256 of arbitrary content.
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// A stored bulletin document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Database row ID.
    pub id: i64,
    /// Document title.
    pub title: String,
    /// Canonical URL (detail page, or the PDF itself for direct links).
    pub url: String,
    /// Publication date as scraped, unparsed.
    pub date_published: Option<String>,
    /// Publication date normalized to ISO (YYYY-MM-DD).
    pub date_published_norm: Option<NaiveDate>,
    /// Lead paragraph or summary text.
    pub summary: Option<String>,
    /// Coarse category ("Press Release", ...).
    pub category: Option<String>,
    /// Subject or taxonomy term from the detail page.
    pub subject: Option<String>,
    /// SHA-256 of the canonical URL.
    pub hash: String,
    /// When a crawl last saw this document.
    pub last_seen: DateTime<Utc>,
}

/// Metadata for a document about to be registered.
///
/// The store upserts these by URL: a fresh crawl refreshes `last_seen`
/// and fills in fields the stored row is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDocument {
    pub url: String,
    pub title: String,
    pub date_published: Option<String>,
    pub date_published_norm: Option<NaiveDate>,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub subject: Option<String>,
}

impl NewDocument {
    /// Create a document registration with just a URL and title.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Registration for a PDF linked directly from a listing page.
    pub fn direct_pdf(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            category: Some(CATEGORY_PRESS_RELEASE.to_string()),
            ..Self::new(url, title)
        }
    }

    /// SHA-256 fingerprint of the canonical URL.
    pub fn url_hash(&self) -> String {
        sha256_hex(self.url.as_bytes())
    }
}
