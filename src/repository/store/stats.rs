//! Corpus counting and recency queries for reporting.

use chrono::NaiveDate;
use rusqlite::params;

use super::ContentStore;
use crate::repository::{parse_naive_date_opt, Result};

/// Row counts summarizing the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub documents: u64,
    pub files: u64,
    pub processed_files: u64,
    pub tables: u64,
    pub undated_documents: u64,
}

/// A recently registered document, as shown in report output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentDocument {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub date_published_norm: Option<NaiveDate>,
}

impl ContentStore {
    /// Count rows across all corpus tables.
    pub fn counts(&self) -> Result<StoreCounts> {
        let conn = self.connect()?;

        let count = |sql: &str| -> Result<u64> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        };

        Ok(StoreCounts {
            documents: count("SELECT COUNT(*) FROM documents")?,
            files: count("SELECT COUNT(*) FROM files")?,
            processed_files: count("SELECT COUNT(*) FROM files WHERE processed = 1")?,
            tables: count("SELECT COUNT(*) FROM tables")?,
            undated_documents: count(
                "SELECT COUNT(*) FROM documents WHERE date_published_norm IS NULL",
            )?,
        })
    }

    /// The most recently registered documents, newest row first.
    pub fn recent_documents(&self, limit: u32) -> Result<Vec<RecentDocument>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, url, date_published_norm
            FROM documents
            ORDER BY id DESC
            LIMIT ?
            "#,
        )?;

        let docs = stmt
            .query_map(params![limit], |row| {
                Ok(RecentDocument {
                    id: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    url: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    date_published_norm: parse_naive_date_opt(row.get(3)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(docs)
    }
}
