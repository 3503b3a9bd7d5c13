//! Government statistical bulletin acquisition pipeline.
//!
//! Discovers bulletin listings, extracts metadata and PDF attachments,
//! downloads and parses the PDFs, and persists everything idempotently
//! in a single SQLite database.

pub mod cli;
pub mod config;
pub mod extract;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod services;
