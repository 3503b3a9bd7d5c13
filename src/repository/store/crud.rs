//! Document, file, and table reads and writes.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::ContentStore;
use crate::models::{BulletinFile, Document, ExtractedTable, NewDocument, PendingFile};
use crate::repository::{parse_datetime, parse_naive_date_opt, Result};

impl ContentStore {
    /// Insert a document or refresh the stored row with the same URL.
    ///
    /// `last_seen` is always refreshed. Metadata fields only move in one
    /// direction: a non-empty incoming title replaces the stored title,
    /// and incoming `Some` values replace stored optionals, but `None`
    /// and `""` never clobber data a previous crawl already captured.
    ///
    /// Returns the row id whether the document was inserted or updated.
    pub fn upsert_document(&self, doc: &NewDocument) -> Result<i64> {
        let hash = doc.url_hash();
        let norm = doc.date_published_norm.map(|d| d.to_string());

        crate::repository::with_retry(|| {
            let conn = self.connect()?;

            conn.execute(
                r#"
                INSERT INTO documents
                    (title, url, date_published, date_published_norm,
                     summary, category, subject, hash, last_seen)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(url) DO UPDATE SET
                    title = CASE WHEN excluded.title != ''
                                 THEN excluded.title ELSE documents.title END,
                    date_published =
                        COALESCE(excluded.date_published, documents.date_published),
                    date_published_norm =
                        COALESCE(excluded.date_published_norm, documents.date_published_norm),
                    summary = COALESCE(excluded.summary, documents.summary),
                    category = COALESCE(excluded.category, documents.category),
                    subject = COALESCE(excluded.subject, documents.subject),
                    hash = excluded.hash,
                    last_seen = excluded.last_seen
                "#,
                params![
                    doc.title,
                    doc.url,
                    doc.date_published,
                    norm,
                    doc.summary,
                    doc.category,
                    doc.subject,
                    hash,
                    Utc::now().to_rfc3339(),
                ],
            )?;

            let id: i64 = conn.query_row(
                "SELECT id FROM documents WHERE url = ?",
                params![doc.url],
                |row| row.get(0),
            )?;

            Ok(id)
        })
    }

    /// Get a document by canonical URL.
    pub fn get_document_by_url(&self, url: &str) -> Result<Option<Document>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE url = ?")?;

        let doc = stmt
            .query_row(params![url], row_to_document)
            .optional()?;

        Ok(doc)
    }

    /// Get a document by row id.
    pub fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE id = ?")?;

        let doc = stmt
            .query_row(params![id], row_to_document)
            .optional()?;

        Ok(doc)
    }

    /// Register a downloadable file for a document.
    ///
    /// Keyed by `file_url`; returns the new row id, or `None` when a row
    /// for that URL already exists (from this run or an earlier one).
    pub fn register_file(
        &self,
        document_id: i64,
        file_url: &str,
        file_type: &str,
    ) -> Result<Option<i64>> {
        crate::repository::with_retry(|| {
            let conn = self.connect()?;

            let inserted = conn.execute(
                r#"
                INSERT OR IGNORE INTO files (document_id, file_url, file_type, created_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![document_id, file_url, file_type, Utc::now().to_rfc3339()],
            )?;

            if inserted > 0 {
                Ok(Some(conn.last_insert_rowid()))
            } else {
                Ok(None)
            }
        })
    }

    /// Get a file by row id.
    pub fn get_file(&self, id: i64) -> Result<Option<BulletinFile>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM files WHERE id = ?")?;

        let file = stmt.query_row(params![id], row_to_file).optional()?;

        Ok(file)
    }

    /// Files still waiting for download and extraction, oldest first.
    pub fn unprocessed_files(&self, limit: u32) -> Result<Vec<PendingFile>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, document_id, file_url FROM files
            WHERE processed = 0 OR processed IS NULL
            ORDER BY id
            LIMIT ?
            "#,
        )?;

        let files = stmt
            .query_map(params![limit], |row| {
                Ok(PendingFile {
                    id: row.get(0)?,
                    document_id: row.get(1)?,
                    file_url: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(files)
    }

    /// Record the results of a completed ingestion and mark the file done.
    pub fn finish_file(
        &self,
        file_id: i64,
        file_path: &Path,
        file_hash: &str,
        pages: u32,
        text: &str,
    ) -> Result<()> {
        crate::repository::with_retry(|| {
            let conn = self.connect()?;

            conn.execute(
                r#"
                UPDATE files
                SET file_path = ?1, file_hash = ?2, pages = ?3, text = ?4, processed = 1
                WHERE id = ?5
                "#,
                params![
                    file_path.to_string_lossy(),
                    file_hash,
                    pages as i64,
                    text,
                    file_id
                ],
            )?;

            Ok(())
        })
    }

    /// Store a table extracted from a file's first page.
    ///
    /// Re-inserting for the same file replaces rather than duplicates.
    pub fn insert_table(
        &self,
        document_id: i64,
        source_file_id: i64,
        table: &ExtractedTable,
    ) -> Result<i64> {
        let table_json = table.to_json()?;

        crate::repository::with_retry(|| {
            let conn = self.connect()?;

            conn.execute(
                "DELETE FROM tables WHERE source_file_id = ?",
                params![source_file_id],
            )?;
            conn.execute(
                r#"
                INSERT INTO tables
                    (document_id, source_file_id, table_json, n_rows, n_cols, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    document_id,
                    source_file_id,
                    table_json,
                    table.n_rows() as i64,
                    table.n_cols() as i64,
                    Utc::now().to_rfc3339(),
                ],
            )?;

            Ok(conn.last_insert_rowid())
        })
    }
}

fn row_to_document(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get("id")?,
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        url: row.get::<_, Option<String>>("url")?.unwrap_or_default(),
        date_published: row.get("date_published")?,
        date_published_norm: parse_naive_date_opt(row.get("date_published_norm")?),
        summary: row.get("summary")?,
        category: row.get("category")?,
        subject: row.get("subject")?,
        hash: row.get::<_, Option<String>>("hash")?.unwrap_or_default(),
        last_seen: parse_datetime(
            &row.get::<_, Option<String>>("last_seen")?.unwrap_or_default(),
        ),
    })
}

fn row_to_file(row: &Row) -> rusqlite::Result<BulletinFile> {
    Ok(BulletinFile {
        id: row.get("id")?,
        document_id: row.get("document_id")?,
        file_url: row.get::<_, Option<String>>("file_url")?.unwrap_or_default(),
        file_path: row
            .get::<_, Option<String>>("file_path")?
            .map(PathBuf::from),
        file_hash: row.get("file_hash")?,
        file_type: row.get("file_type")?,
        pages: row.get::<_, Option<i64>>("pages")?.map(|p| p as u32),
        text: row.get("text")?,
        processed: row.get::<_, Option<i64>>("processed")?.unwrap_or(0) != 0,
        created_at: parse_datetime(
            &row.get::<_, Option<String>>("created_at")?.unwrap_or_default(),
        ),
    })
}
