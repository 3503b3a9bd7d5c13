//! Crawler service: listing discovery and detail-page scraping.
//!
//! Walks each configured seed through its page range. PDFs linked
//! straight from a listing are registered as documents themselves;
//! listing items are followed to detail pages for metadata and
//! attachments. Fetch failures skip the page or item and the run
//! continues; store failures abort.

use tracing::{info, warn};
use url::Url;

use crate::config::Settings;
use crate::models::{NewDocument, CATEGORY_PRESS_RELEASE, FILE_TYPE_PDF};
use crate::repository::ContentStore;
use crate::scrapers::{dates, detail, listing, HttpClient};

/// Title recorded for direct PDF links whose anchor text is blank.
const UNTITLED_PDF: &str = "Untitled PDF";

/// Counters for one crawl run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Listing pages fetched and parsed.
    pub pages_fetched: u32,
    /// Documents registered or refreshed.
    pub documents: u32,
    /// New file rows registered.
    pub files: u32,
    /// Listing pages and detail pages that failed to fetch.
    pub errors: u32,
}

/// Service that discovers bulletins and registers them in the store.
pub struct CrawlService {
    store: ContentStore,
    client: HttpClient,
    settings: Settings,
}

impl CrawlService {
    pub fn new(store: ContentStore, client: HttpClient, settings: Settings) -> Self {
        Self {
            store,
            client,
            settings,
        }
    }

    /// Crawl every configured seed across its page range.
    pub async fn run(&self) -> anyhow::Result<CrawlSummary> {
        let base = Url::parse(&self.settings.base_url)?;
        let mut summary = CrawlSummary::default();

        for seed in &self.settings.seed_urls {
            for page in 0..=self.settings.max_pages {
                let page_url = listing::paginated_url(seed, page);

                let html = match self.client.fetch_text(&page_url).await {
                    Ok(html) => html,
                    Err(e) => {
                        warn!("Skipping listing page {}: {}", page_url, e);
                        summary.errors += 1;
                        continue;
                    }
                };
                summary.pages_fetched += 1;

                self.process_listing(&html, &base, &mut summary).await?;
            }
        }

        info!(
            "Crawl finished: {} pages, {} documents, {} new files, {} errors",
            summary.pages_fetched, summary.documents, summary.files, summary.errors
        );
        Ok(summary)
    }

    /// Register everything discoverable from one listing page.
    async fn process_listing(
        &self,
        html: &str,
        base: &Url,
        summary: &mut CrawlSummary,
    ) -> anyhow::Result<()> {
        // Parse up front; parsed HTML is not Send and must not be held
        // across an await.
        let anchors = listing::find_pdf_anchors(html, base);
        let items = listing::find_item_links(html, base);

        for anchor in &anchors {
            let doc = direct_pdf_registration(anchor);
            let doc_id = self.store.upsert_document(&doc)?;
            summary.documents += 1;
            if self
                .store
                .register_file(doc_id, &anchor.url, FILE_TYPE_PDF)?
                .is_some()
            {
                summary.files += 1;
            }
        }

        for item_url in &items {
            let html = match self.client.fetch_text(item_url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping detail page {}: {}", item_url, e);
                    summary.errors += 1;
                    continue;
                }
            };

            let (doc, attachments) = detail_registration(item_url, &html, base);
            let doc_id = self.store.upsert_document(&doc)?;
            summary.documents += 1;

            for file_url in &attachments {
                if self
                    .store
                    .register_file(doc_id, file_url, FILE_TYPE_PDF)?
                    .is_some()
                {
                    summary.files += 1;
                }
            }
        }

        Ok(())
    }
}

/// Registration for a PDF linked straight from a listing page. The
/// anchor's `title` attribute, when present, doubles as a summary.
fn direct_pdf_registration(anchor: &listing::PdfAnchor) -> NewDocument {
    let title = if anchor.title.is_empty() {
        UNTITLED_PDF.to_string()
    } else {
        anchor.title.clone()
    };
    let mut doc = NewDocument::direct_pdf(&anchor.url, title);
    doc.summary = anchor.title_attr.clone();
    doc
}

/// Parse a detail page into a document registration plus the PDF
/// attachment URLs found on it.
fn detail_registration(url: &str, html: &str, base: &Url) -> (NewDocument, Vec<String>) {
    let meta = detail::extract_metadata(html);
    let attachments = detail::find_attachment_urls(html, base);

    let date_published_norm = meta.date_text.as_deref().and_then(dates::normalize_date);

    let doc = NewDocument {
        url: url.to_string(),
        title: meta.title,
        date_published: meta.date_text,
        date_published_norm,
        summary: meta.summary,
        category: Some(CATEGORY_PRESS_RELEASE.to_string()),
        subject: meta.subject,
    };
    (doc, attachments)
}
