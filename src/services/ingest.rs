//! Ingestion service: download, hash, extract, persist.
//!
//! Claims pending file rows and drives each one through download,
//! hashing, and PDF extraction. A row that fails to download stays
//! unprocessed and is picked up again by a later run.

use tracing::{info, warn};

use crate::config::Settings;
use crate::extract;
use crate::models::sha256_hex;
use crate::repository::ContentStore;
use crate::scrapers::HttpClient;

/// Counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Files downloaded, extracted, and marked processed.
    pub processed: u32,
    /// Files whose first page yielded a table.
    pub tables_found: u32,
    /// Files skipped because the download failed.
    pub failures: u32,
}

/// Service that turns registered file rows into local PDFs with
/// extracted text and tables.
pub struct IngestService {
    store: ContentStore,
    client: HttpClient,
    settings: Settings,
}

impl IngestService {
    pub fn new(store: ContentStore, client: HttpClient, settings: Settings) -> Self {
        Self {
            store,
            client,
            settings,
        }
    }

    /// Process up to `limit` pending files, oldest first.
    pub async fn run(&self, limit: u32) -> anyhow::Result<IngestSummary> {
        let pending = self.store.unprocessed_files(limit)?;
        info!("Ingesting {} pending file(s)", pending.len());

        let mut summary = IngestSummary::default();
        for file in pending {
            let path = self.settings.download_path(file.id);

            let bytes = match self.client.download(&file.file_url, &path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping file {} ({}): {}", file.id, file.file_url, e);
                    summary.failures += 1;
                    continue;
                }
            };
            let file_hash = sha256_hex(&bytes);

            let extract_path = path.clone();
            let extraction =
                tokio::task::spawn_blocking(move || extract::extract(&extract_path)).await?;

            if let Some(table) = &extraction.table {
                self.store.insert_table(file.document_id, file.id, table)?;
                summary.tables_found += 1;
            }

            self.store
                .finish_file(file.id, &path, &file_hash, extraction.pages, &extraction.text)?;
            summary.processed += 1;
        }

        info!(
            "Ingest finished: {} processed, {} tables, {} failures",
            summary.processed, summary.tables_found, summary.failures
        );
        Ok(summary)
    }
}
