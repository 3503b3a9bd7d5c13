//! Service layer for the acquisition pipeline.
//!
//! Domain logic separated from UI concerns: each service takes the
//! store, HTTP client, and settings it needs and returns a summary
//! struct the CLI renders.

pub mod crawl;
pub mod ingest;
pub mod report;

pub use crawl::{CrawlService, CrawlSummary};
pub use ingest::{IngestService, IngestSummary};
pub use report::{CorpusReport, RECENT_LIMIT};
