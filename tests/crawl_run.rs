//! End-to-end crawl runs against a mock listing site: discovery of
//! direct PDFs and detail pages, metadata persistence, and idempotency
//! across repeated runs.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statacquire::config::Settings;
use statacquire::models::CATEGORY_PRESS_RELEASE;
use statacquire::repository::ContentStore;
use statacquire::scrapers::HttpClient;
use statacquire::services::CrawlService;

fn site_settings(server: &MockServer, data_dir: &std::path::Path) -> Settings {
    let mut settings = Settings::default().with_data_dir(data_dir.to_path_buf());
    settings.base_url = server.uri();
    settings.seed_urls = vec![format!("{}/press-release", server.uri())];
    settings.max_pages = 1;
    settings.rate_limit = Duration::ZERO;
    settings.respect_robots = false;
    settings.retry_total = 0;
    settings
}

async fn mount_site(server: &MockServer) {
    // the page=1 mock is mounted first; earlier mounts win in wiremock,
    // and the bare listing mock below matches any query
    Mock::given(method("GET"))
        .and(path("/press-release"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
              <a href="/files/annual_report_2025.pdf">Annual Report (PDF)</a>
              <div class="node--type-press-release">
                <a href="/notice/advance-calendar">Advance Release Calendar</a>
              </div>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    // page 0: one direct PDF plus a listing container for a detail page
    Mock::given(method("GET"))
        .and(path("/press-release"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
              <a href="/files/annual_report_2025.pdf"
                 title="Annual Report 2025-26">Annual Report (PDF)</a>
              <div class="views-row">
                <a href="/press-release/cpi-july-2026">CPI, July 2026</a>
              </div>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/press-release/cpi-july-2026"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
              <h1>Consumer Price Index, July 2026</h1>
              <div>Posted on: 12/08/2026</div>
              <div class="field--name-field-category"><a href="/t/prices">Prices</a></div>
              <div class="field--name-body"><p>Provisional CPI figures for July.</p></div>
              <a href="/files/cpi_jul_2026.pdf">Full text</a>
              <a href="/files/cpi_jul_2026_annexure.pdf">Annexure</a>
              <a href="/files/cpi_jul_2026.pdf">Full text (mirror)</a>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    // bare page: no title, no date, no attachments
    Mock::given(method("GET"))
        .and(path("/notice/advance-calendar"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Calendar moved.</p></body></html>"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn crawl_registers_documents_files_and_metadata() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let settings = site_settings(&server, dir.path());
    let store = ContentStore::open(&settings.database_path()).unwrap();
    let client = HttpClient::new(settings.http());

    let service = CrawlService::new(store.clone(), client, settings);
    let summary = service.run().await.unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.errors, 0);
    // the direct PDF is upserted from both listing pages
    assert_eq!(summary.documents, 4);
    // one direct file plus two unique detail attachments
    assert_eq!(summary.files, 3);

    let counts = store.counts().unwrap();
    assert_eq!(counts.documents, 3);
    assert_eq!(counts.files, 3);
    assert_eq!(counts.processed_files, 0);

    let pdf_url = format!("{}/files/annual_report_2025.pdf", server.uri());
    let direct = store.get_document_by_url(&pdf_url).unwrap().unwrap();
    assert_eq!(direct.title, "Annual Report (PDF)");
    assert_eq!(direct.category.as_deref(), Some(CATEGORY_PRESS_RELEASE));
    assert_eq!(direct.summary.as_deref(), Some("Annual Report 2025-26"));

    let detail_url = format!("{}/press-release/cpi-july-2026", server.uri());
    let detail = store.get_document_by_url(&detail_url).unwrap().unwrap();
    assert_eq!(detail.title, "Consumer Price Index, July 2026");
    assert_eq!(detail.date_published.as_deref(), Some("12/08/2026"));
    assert_eq!(
        detail.date_published_norm.map(|d| d.to_string()),
        Some("2026-08-12".to_string())
    );
    assert_eq!(detail.subject.as_deref(), Some("Prices"));
    assert_eq!(
        detail.summary.as_deref(),
        Some("Provisional CPI figures for July.")
    );

    let bare_url = format!("{}/notice/advance-calendar", server.uri());
    let bare = store.get_document_by_url(&bare_url).unwrap().unwrap();
    assert_eq!(bare.title, "Untitled");
    assert!(bare.date_published.is_none());
}

#[tokio::test]
async fn repeated_crawls_do_not_duplicate_rows() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let settings = site_settings(&server, dir.path());
    let store = ContentStore::open(&settings.database_path()).unwrap();
    let client = HttpClient::new(settings.http());

    let service = CrawlService::new(store.clone(), client, settings);
    let first = service.run().await.unwrap();
    let second = service.run().await.unwrap();

    assert_eq!(first.files, 3);
    // every URL is already registered the second time around
    assert_eq!(second.files, 0);
    assert_eq!(second.documents, first.documents);

    let counts = store.counts().unwrap();
    assert_eq!(counts.documents, 3);
    assert_eq!(counts.files, 3);
}

#[tokio::test]
async fn failing_pages_are_skipped_and_the_rest_survive() {
    let server = MockServer::start().await;

    // mounted before the bare listing mock so page=1 is a hard 404
    Mock::given(method("GET"))
        .and(path("/press-release"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/press-release"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
              <div class="views-row"><a href="/press-release/broken">Broken</a></div>
              <div class="views-row"><a href="/press-release/healthy">Healthy</a></div>
            </body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/press-release/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/press-release/healthy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h1>Healthy Bulletin</h1></body></html>",
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = site_settings(&server, dir.path());
    let store = ContentStore::open(&settings.database_path()).unwrap();
    let client = HttpClient::new(settings.http());

    let summary = CrawlService::new(store.clone(), client, settings)
        .run()
        .await
        .unwrap();

    // page 1 and the broken detail page both count as errors
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.errors, 2);

    let healthy_url = format!("{}/press-release/healthy", server.uri());
    let doc = store.get_document_by_url(&healthy_url).unwrap().unwrap();
    assert_eq!(doc.title, "Healthy Bulletin");
}
