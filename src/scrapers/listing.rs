//! Listing page parsing: pagination, direct PDF anchors, item links.
//!
//! Parsing is synchronous and returns owned values; `scraper::Html` is
//! not `Send` and must never be held across an await point.

use scraper::{Html, Selector};
use url::Url;

/// Selectors matching one listing item container each.
const ITEM_SELECTORS: &str = ".views-row, .node--type-publication, .node--type-press-release";

/// A PDF linked straight from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfAnchor {
    /// Resolved absolute URL of the PDF.
    pub url: String,
    /// Anchor text, trimmed; empty when the anchor had none.
    pub title: String,
    /// The anchor's `title` attribute, when present and non-empty.
    pub title_attr: Option<String>,
}

/// Build the listing URL for a page offset. Page 0 is the seed itself;
/// later pages append a `page` query parameter.
pub fn paginated_url(seed: &str, page: u32) -> String {
    if page == 0 {
        seed.to_string()
    } else if seed.contains('?') {
        format!("{}&page={}", seed, page)
    } else {
        format!("{}?page={}", seed, page)
    }
}

/// Resolve an href against the configured base, skipping fragments and
/// non-navigational schemes.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("mailto:") || lower.starts_with("tel:")
    {
        return None;
    }

    base.join(href).ok()
}

/// Whether a resolved URL points at a PDF, judged by path alone so
/// query strings do not hide attachments.
pub fn is_pdf_url(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

/// Every direct PDF anchor on a page, in document order.
pub fn find_pdf_anchors(html: &str, base: &Url) -> Vec<PdfAnchor> {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").unwrap();

    let mut anchors = Vec::new();
    for element in document.select(&anchor_sel) {
        let href = match element.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        let resolved = match resolve_href(base, href) {
            Some(u) => u,
            None => continue,
        };
        if !is_pdf_url(&resolved) {
            continue;
        }

        let title = element.text().collect::<String>().trim().to_string();
        let title_attr = element
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);

        anchors.push(PdfAnchor {
            url: resolved.into(),
            title,
            title_attr,
        });
    }

    anchors
}

/// The detail-page URL of each listing item, in document order.
///
/// Each container contributes its first `<a href>`; anchors that are
/// themselves PDFs are left to [`find_pdf_anchors`].
pub fn find_item_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let item_sel = Selector::parse(ITEM_SELECTORS).unwrap();
    let anchor_sel = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for item in document.select(&item_sel) {
        let Some(anchor) = item.select(&anchor_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_href(base, href) else {
            continue;
        };
        if is_pdf_url(&resolved) {
            continue;
        }
        links.push(resolved.into());
    }

    links
}
