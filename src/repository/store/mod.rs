//! Content store for bulletins, files, and extracted tables.
//!
//! Split into submodules:
//! - `schema`: table creation and versioned migrations
//! - `crud`: document/file/table reads and writes
//! - `stats`: counts and recency queries for reporting
//!
//! All writes are idempotent by unique URL keys, so crawl and ingest
//! runs can be repeated without duplicating rows.

mod crud;
mod schema;
mod stats;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::Result;

pub use stats::{RecentDocument, StoreCounts};

/// Current schema format version. Increment when altering tables.
pub(crate) const FORMAT_VERSION: i32 = 2;

/// SQLite-backed store for documents, files, and tables.
///
/// Holds only the database path; every operation opens its own
/// connection, so clones are independent handles to the same store.
#[derive(Debug, Clone)]
pub struct ContentStore {
    db_path: PathBuf,
}

impl ContentStore {
    /// Open (creating and migrating as needed) the store at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        store.init_schema()?;
        store.migrate()?;
        Ok(store)
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    /// Get the database path.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }
}
