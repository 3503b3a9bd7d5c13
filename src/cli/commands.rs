//! CLI commands implementation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::Settings;
use crate::repository::ContentStore;
use crate::scrapers::HttpClient;
use crate::services::{CorpusReport, CrawlService, IngestService};

#[derive(Parser)]
#[command(name = "statacq")]
#[command(about = "Government statistical bulletin acquisition pipeline")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Discover bulletins from the configured listing seeds
    Crawl,

    /// Download and extract pending PDF files
    Ingest {
        /// Maximum number of files to process
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Show corpus counts and the most recent documents
    Report,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(data_dir) = cli.data_dir {
        settings = settings.with_data_dir(data_dir);
    }

    match cli.command {
        Commands::Init => cmd_init(&settings),
        Commands::Crawl => cmd_crawl(settings).await,
        Commands::Ingest { limit } => cmd_ingest(settings, limit).await,
        Commands::Report => cmd_report(&settings),
    }
}

/// Initialize the data directory and database.
fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let store = ContentStore::open(&settings.database_path())?;

    println!(
        "{} Initialized store at {}",
        style("✓").green(),
        store.database_path().display()
    );
    println!("  Downloads: {}", settings.download_dir().display());
    Ok(())
}

/// Crawl the configured seeds.
async fn cmd_crawl(settings: Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let store = ContentStore::open(&settings.database_path())?;
    let client = HttpClient::new(settings.http());

    let summary = CrawlService::new(store, client, settings).run().await?;

    println!(
        "{} Crawl: {} pages fetched, {} documents, {} new files, {} errors",
        style("✓").green(),
        summary.pages_fetched,
        summary.documents,
        summary.files,
        summary.errors
    );
    Ok(())
}

/// Download and extract pending files.
async fn cmd_ingest(settings: Settings, limit: u32) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let store = ContentStore::open(&settings.database_path())?;
    let client = HttpClient::new(settings.http());

    let summary = IngestService::new(store, client, settings).run(limit).await?;

    println!(
        "{} Ingest: {} processed, {} tables, {} failures",
        style("✓").green(),
        summary.processed,
        summary.tables_found,
        summary.failures
    );
    Ok(())
}

/// Print the corpus report.
fn cmd_report(settings: &Settings) -> anyhow::Result<()> {
    let store = ContentStore::open(&settings.database_path())?;
    let report = CorpusReport::gather(&store)?;

    println!("\n{}", style("Corpus Report").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "Documents:", report.counts.documents);
    println!("{:<20} {}", "Files:", report.counts.files);
    println!("{:<20} {}", "Processed files:", report.counts.processed_files);
    println!("{:<20} {}", "Tables:", report.counts.tables);
    println!("{:<20} {}", "Undated documents:", report.counts.undated_documents);

    if !report.recent.is_empty() {
        println!("\n{}", style("Most recent documents").bold());
        println!("{}", "-".repeat(40));
        for doc in &report.recent {
            let date = doc
                .date_published_norm
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>5}  {:<10}  {:<44}  {}",
                doc.id,
                date,
                truncate(&doc.title, 44),
                doc.url
            );
        }
    }

    Ok(())
}

/// Truncate for display, appending "..." when text was cut. Works on
/// characters, not bytes; titles are not always ASCII.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
