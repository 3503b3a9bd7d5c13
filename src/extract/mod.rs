//! PDF content extraction.
//!
//! Pulls per-page text out of downloaded bulletins and hunts the first
//! page for one table, trying a ruled-grid read before falling back to
//! column alignment. Extraction is best-effort and never fails; a PDF
//! this module cannot read yields an empty result.

mod columns;
mod content;
mod grid;

use std::path::Path;

use lopdf::{Document, ObjectId};
use tracing::{debug, warn};

use crate::models::ExtractedTable;

/// Everything extracted from one PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Concatenated page text, one newline-terminated chunk per page.
    pub text: String,
    /// Number of pages in the document.
    pub pages: u32,
    /// First table detected on the first page, if any.
    pub table: Option<ExtractedTable>,
}

/// Extract text, a page count, and at most one first-page table.
pub fn extract(path: &Path) -> Extraction {
    let doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Unreadable PDF {}: {}", path.display(), e);
            return Extraction::default();
        }
    };

    let pages = doc.get_pages();

    let mut text = String::new();
    for &page_num in pages.keys() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                debug!("No text from page {} of {}: {}", page_num, path.display(), e);
            }
        }
    }

    let table = pages
        .values()
        .next()
        .and_then(|&page_id| first_page_table(&doc, page_id));

    Extraction {
        text,
        pages: pages.len() as u32,
        table,
    }
}

/// Run the table strategies over the first page, keeping the first one
/// that yields a table with any non-empty cell.
fn first_page_table(doc: &Document, page_id: ObjectId) -> Option<ExtractedTable> {
    let geometry = content::PageGeometry::from_page(doc, page_id)?;

    grid::from_ruled_grid(&geometry)
        .filter(|table| table.has_content())
        .or_else(|| {
            columns::from_aligned_columns(&geometry.spans).filter(|table| table.has_content())
        })
}
