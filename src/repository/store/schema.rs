//! Schema initialization and versioned migrations.

use rusqlite::params;
use tracing::info;

use super::{ContentStore, FORMAT_VERSION};
use crate::repository::Result;

impl ContentStore {
    /// Create tables and indexes if they do not exist.
    ///
    /// Column names and types are a compatibility surface shared with
    /// earlier snapshots of this corpus; they must stay stable.
    pub(crate) fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                url TEXT UNIQUE,
                date_published TEXT,
                date_published_norm TEXT,
                summary TEXT,
                category TEXT,
                subject TEXT,
                hash TEXT,
                last_seen TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER REFERENCES documents(id),
                file_url TEXT UNIQUE,
                file_path TEXT,
                file_hash TEXT,
                file_type TEXT,
                pages INTEGER,
                text TEXT,
                processed INTEGER DEFAULT 0,
                created_at TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS tables (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER REFERENCES documents(id),
                source_file_id INTEGER REFERENCES files(id),
                table_json TEXT,
                n_rows INTEGER,
                n_cols INTEGER,
                created_at TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS store_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_files_document
                ON files(document_id);
            CREATE INDEX IF NOT EXISTS idx_files_processed
                ON files(processed);
            CREATE INDEX IF NOT EXISTS idx_tables_document
                ON tables(document_id);
        "#,
        )?;
        Ok(())
    }

    /// Run pending migrations, recorded in `store_meta.format_version`.
    pub(crate) fn migrate(&self) -> Result<()> {
        let conn = self.connect()?;

        let current_version: i32 = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'format_version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        if current_version >= FORMAT_VERSION {
            return Ok(());
        }

        info!(
            "Migrating store from version {} to {}",
            current_version, FORMAT_VERSION
        );

        if current_version < 2 {
            // Pre-versioning snapshots were created without these columns.
            // ALTER fails harmlessly when the column already exists.
            let _ = conn.execute("ALTER TABLE files ADD COLUMN text TEXT", []);
            let _ = conn.execute("ALTER TABLE files ADD COLUMN processed INTEGER DEFAULT 0", []);
            info!("Added files.text and files.processed columns");
        }

        conn.execute(
            "INSERT OR REPLACE INTO store_meta (key, value) VALUES ('format_version', ?)",
            params![FORMAT_VERSION.to_string()],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn column_names(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", table))
            .unwrap();
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        names
    }

    #[test]
    fn fresh_store_has_current_format_version() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bulletins.db");
        let store = ContentStore::open(&db_path).unwrap();

        let conn = store.connect().unwrap();
        let version: String = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'format_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, FORMAT_VERSION.to_string());
    }

    #[test]
    fn legacy_files_table_gains_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bulletins.db");

        // Simulate a snapshot from before files.text/processed existed.
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE documents (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT,
                    url TEXT UNIQUE,
                    date_published TEXT,
                    date_published_norm TEXT,
                    summary TEXT,
                    category TEXT,
                    subject TEXT,
                    hash TEXT,
                    last_seen TEXT DEFAULT (datetime('now'))
                );
                CREATE TABLE files (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    document_id INTEGER REFERENCES documents(id),
                    file_url TEXT UNIQUE,
                    file_path TEXT,
                    file_hash TEXT,
                    file_type TEXT,
                    pages INTEGER,
                    created_at TEXT DEFAULT (datetime('now'))
                );
                INSERT INTO documents (title, url) VALUES ('Old', 'https://example.org/old');
                INSERT INTO files (document_id, file_url) VALUES (1, 'https://example.org/old.pdf');
            "#,
            )
            .unwrap();
        }

        let store = ContentStore::open(&db_path).unwrap();
        let conn = store.connect().unwrap();

        let names = column_names(&conn, "files");
        assert!(names.contains(&"text".to_string()));
        assert!(names.contains(&"processed".to_string()));

        // The legacy row must now be visible to the unprocessed query.
        let pending = store.unprocessed_files(10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].file_url, "https://example.org/old.pdf");
    }

    #[test]
    fn reopening_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bulletins.db");

        ContentStore::open(&db_path).unwrap();
        let store = ContentStore::open(&db_path).unwrap();

        let conn = store.connect().unwrap();
        assert_eq!(column_names(&conn, "files").len(), 10);
    }
}
