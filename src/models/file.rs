//! Downloadable file models.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File type recorded for PDF attachments.
pub const FILE_TYPE_PDF: &str = "pdf";

/// A downloadable file attached to a bulletin document.
///
/// Registered at crawl time with just its URL; download, hashing and
/// extraction fill in the rest during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletinFile {
    /// Database row ID.
    pub id: i64,
    /// Owning document row ID.
    pub document_id: i64,
    /// Absolute URL of the file.
    pub file_url: String,
    /// Local path the bytes were written to, once downloaded.
    pub file_path: Option<PathBuf>,
    /// SHA-256 of the downloaded bytes.
    pub file_hash: Option<String>,
    /// File type ("pdf").
    pub file_type: Option<String>,
    /// Page count reported by the PDF parser.
    pub pages: Option<u32>,
    /// Extracted full text, one page per newline-terminated chunk.
    pub text: Option<String>,
    /// Whether ingestion has completed for this file.
    pub processed: bool,
    /// When the file row was registered.
    pub created_at: DateTime<Utc>,
}

/// A file row claimed for ingestion: not yet processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub id: i64,
    pub document_id: i64,
    pub file_url: String,
}
