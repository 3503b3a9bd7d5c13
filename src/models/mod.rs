//! Data models for statacquire.

mod document;
mod file;
mod table;

pub use document::{sha256_hex, Document, NewDocument, CATEGORY_PRESS_RELEASE};
pub use file::{BulletinFile, PendingFile, FILE_TYPE_PDF};
pub use table::ExtractedTable;
