//! Corpus report assembly.
//!
//! Snapshots the store into a plain struct; rendering belongs to the
//! CLI layer.

use crate::repository::{ContentStore, RecentDocument, Result, StoreCounts};

/// How many recent documents a report lists.
pub const RECENT_LIMIT: u32 = 5;

/// Corpus counts plus the most recently registered documents.
#[derive(Debug, Clone)]
pub struct CorpusReport {
    pub counts: StoreCounts,
    pub recent: Vec<RecentDocument>,
}

impl CorpusReport {
    /// Gather counts and the recent-document list from the store.
    pub fn gather(store: &ContentStore) -> Result<Self> {
        Ok(Self {
            counts: store.counts()?,
            recent: store.recent_documents(RECENT_LIMIT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewDocument;

    fn test_store() -> (tempfile::TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(&dir.path().join("bulletins.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn empty_store_reports_zero_counts_and_no_recents() {
        let (_dir, store) = test_store();
        let report = CorpusReport::gather(&store).unwrap();
        assert_eq!(report.counts, StoreCounts::default());
        assert!(report.recent.is_empty());
    }

    #[test]
    fn recent_list_is_capped_at_five() {
        let (_dir, store) = test_store();
        for i in 0..8 {
            let doc = NewDocument::new(
                format!("https://stats.example/bulletin/{}", i),
                format!("Bulletin {}", i),
            );
            store.upsert_document(&doc).unwrap();
        }

        let report = CorpusReport::gather(&store).unwrap();
        assert_eq!(report.counts.documents, 8);
        assert_eq!(report.recent.len(), RECENT_LIMIT as usize);
        assert_eq!(report.recent[0].title, "Bulletin 7");
    }
}
