//! Detail page metadata extraction.
//!
//! Every field is scraped through an ordered chain of selector
//! strategies; the first strategy producing non-empty trimmed text
//! wins, and a full miss falls back to the field's default. The chains
//! follow the Drupal markup government portals commonly emit.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::listing;

/// Title used when no strategy matches.
pub const DEFAULT_TITLE: &str = "Untitled";

const TITLE_SELECTORS: &[&str] = &["h1", "h2", ".page-title", ".title"];
const SUMMARY_SELECTORS: &[&str] = &[".field--name-body p", ".node__content p"];
const SUBJECT_SELECTORS: &[&str] = &[".field--name-field-category a", ".taxonomy-term a"];
const DATE_SELECTORS: &[&str] = &["span.date-display-single, .field--name-field-release-date"];

/// Text markers that introduce a publication date, tried in order.
const DATE_MARKERS: &[&str] = &["Posted on", "Release Date"];

/// Metadata scraped from one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailMetadata {
    /// Page title; [`DEFAULT_TITLE`] when every strategy missed.
    pub title: String,
    /// Raw publication date text, as found.
    pub date_text: Option<String>,
    pub summary: Option<String>,
    pub subject: Option<String>,
}

/// Scrape metadata from a detail page body.
pub fn extract_metadata(html: &str) -> DetailMetadata {
    let document = Html::parse_document(html);

    DetailMetadata {
        title: first_text(&document, TITLE_SELECTORS)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        date_text: marker_date(&document).or_else(|| first_text(&document, DATE_SELECTORS)),
        summary: first_text(&document, SUMMARY_SELECTORS),
        subject: first_text(&document, SUBJECT_SELECTORS),
    }
}

/// Deduplicated, sorted PDF URLs linked anywhere on a detail page.
pub fn find_attachment_urls(html: &str, base: &Url) -> Vec<String> {
    let mut urls: Vec<String> = listing::find_pdf_anchors(html, base)
        .into_iter()
        .map(|a| a.url)
        .collect();
    urls.sort();
    urls.dedup();
    urls
}

/// First strategy whose first matching element has non-empty text.
fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        let element = document.select(&selector).next()?;
        let text = element_text(&element);
        (!text.is_empty()).then_some(text)
    })
}

/// Scan text nodes for a date marker; the value is the text after the
/// first `:`, or the whole node when there is none.
fn marker_date(document: &Html) -> Option<String> {
    for marker in DATE_MARKERS {
        for text in document.root_element().text() {
            if !text.contains(marker) {
                continue;
            }
            let value = text.split_once(':').map_or(text, |(_, rest)| rest);
            let value = collapse_whitespace(value);
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <h1 class="page-title"> Consumer Price Index, July 2026 </h1>
          <div class="node__meta">Posted on: 25/08/2026</div>
          <div class="field--name-field-category"><a href="/category/prices">Prices</a></div>
          <div class="field--name-body">
            <p>The all-India CPI rose by 0.4 per cent over June.</p>
            <p>Second paragraph, not the summary.</p>
          </div>
          <a href="/files/cpi_jul_2026.pdf">English</a>
          <a href="/files/cpi_jul_2026.pdf">Download</a>
          <a href="/files/cpi_jul_2026_hi.pdf">Hindi</a>
        </body></html>
    "#;

    #[test]
    fn extracts_all_fields_from_a_typical_page() {
        let meta = extract_metadata(DETAIL_PAGE);
        assert_eq!(meta.title, "Consumer Price Index, July 2026");
        assert_eq!(meta.date_text.as_deref(), Some("25/08/2026"));
        assert_eq!(
            meta.summary.as_deref(),
            Some("The all-India CPI rose by 0.4 per cent over June.")
        );
        assert_eq!(meta.subject.as_deref(), Some("Prices"));
    }

    #[test]
    fn attachments_are_deduplicated_and_sorted() {
        let base = Url::parse("https://www.mospi.gov.in").unwrap();
        assert_eq!(
            find_attachment_urls(DETAIL_PAGE, &base),
            vec![
                "https://www.mospi.gov.in/files/cpi_jul_2026.pdf".to_string(),
                "https://www.mospi.gov.in/files/cpi_jul_2026_hi.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn title_chain_falls_through_empty_headings() {
        let html = r#"<h1>   </h1><h2>Index of Industrial Production</h2>"#;
        let meta = extract_metadata(html);
        assert_eq!(meta.title, "Index of Industrial Production");

        let html = r#"<div class="title">Energy Statistics 2026</div>"#;
        assert_eq!(extract_metadata(html).title, "Energy Statistics 2026");
    }

    #[test]
    fn untitled_when_no_strategy_matches() {
        let meta = extract_metadata("<p>No headings anywhere.</p>");
        assert_eq!(meta.title, DEFAULT_TITLE);
        assert_eq!(meta.date_text, None);
        assert_eq!(meta.subject, None);
    }

    #[test]
    fn release_date_marker_is_second_choice() {
        let html = r#"<div>Release Date: 12 June 2026</div>"#;
        let meta = extract_metadata(html);
        assert_eq!(meta.date_text.as_deref(), Some("12 June 2026"));

        let both = r#"
            <div>Release Date: 12 June 2026</div>
            <div>Posted on: 13 June 2026</div>
        "#;
        assert_eq!(
            extract_metadata(both).date_text.as_deref(),
            Some("13 June 2026")
        );
    }

    #[test]
    fn selector_date_backs_up_missing_markers() {
        let html = r#"<span class="date-display-single">30 April 2026</span>"#;
        assert_eq!(
            extract_metadata(html).date_text.as_deref(),
            Some("30 April 2026")
        );
    }

    #[test]
    fn marker_without_colon_keeps_whole_text() {
        let html = r#"<div>Posted on 5 May 2026</div>"#;
        assert_eq!(
            extract_metadata(html).date_text.as_deref(),
            Some("Posted on 5 May 2026")
        );
    }
}
