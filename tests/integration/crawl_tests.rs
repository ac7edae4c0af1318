//! Integration tests for the crawler
//!
//! These tests run complete crawls against wiremock servers. A second mock
//! server on another port plays the external site.

use crate::{closed_port, create_test_config, mount_page, mount_redirect, mount_status};
use ripple_check::crawler::{run_crawl, Coordinator};
use ripple_check::output::{broken_records, export_broken_csv, CrawlStatistics};
use ripple_check::state::{CrawlRecord, LinkType, PageState, ProgressSnapshot};
use ripple_check::RippleError;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn find<'a>(records: &'a [CrawlRecord], url: &str) -> &'a CrawlRecord {
    records
        .iter()
        .find(|r| r.url == url)
        .unwrap_or_else(|| panic!("No record for {}", url))
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;
    let base_url = site.uri();

    mount_page(
        &site,
        "/",
        &format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="/a">A</a>
            <a href="/b">B</a>
            <a href="{}/x">External</a>
            <a href="/a?utm=1">A again</a>
            </body></html>"#,
            external.uri()
        ),
    )
    .await;
    mount_page(&site, "/a", "<html><body>A</body></html>").await;
    mount_page(&site, "/b", "<html><body>B</body></html>").await;
    mount_page(&external, "/x", "<html><body>X</body></html>").await;

    let records = run_crawl(&format!("{}/", base_url), &create_test_config())
        .await
        .expect("Crawl failed");

    assert_eq!(records.len(), 4, "records: {:?}", records);

    let root = find(&records, &format!("{}/", base_url));
    assert_eq!(root.source_page, format!("{}/", base_url));
    assert_eq!(root.link_type, LinkType::Internal);

    let a = find(&records, &format!("{}/a", base_url));
    assert_eq!(a.link_type, LinkType::Internal);
    assert_eq!(a.source_page, format!("{}/", base_url));

    let b = find(&records, &format!("{}/b", base_url));
    assert_eq!(b.link_type, LinkType::Internal);

    let x = find(&records, &format!("{}/x", external.uri()));
    assert_eq!(x.link_type, LinkType::External);

    for record in &records {
        assert_eq!(record.status, Some(200), "{}", record.url);
        assert_eq!(record.state, PageState::Resolved);
        assert!(!record.url.contains("utm"));
    }

    // /a was admitted once, so fetched once
    let paths = requested_paths(&site).await;
    assert_eq!(paths.iter().filter(|p| p.as_str() == "/a").count(), 1);
}

#[tokio::test]
async fn test_external_pages_not_parsed() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &site,
        "/",
        &format!(r#"<a href="{}/x">External</a>"#, external.uri()),
    )
    .await;
    mount_page(&external, "/x", r#"<a href="/deeper">Deeper</a>"#).await;

    let records = run_crawl(&format!("{}/", site.uri()), &create_test_config())
        .await
        .expect("Crawl failed");

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.url.ends_with("/deeper")));
    assert_eq!(requested_paths(&external).await, vec!["/x".to_string()]);
}

#[tokio::test]
async fn test_redirect_records_final_outcome() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_page(&site, "/", r#"<a href="/old">Old</a>"#).await;
    mount_redirect(&site, "/old", 301, "/new").await;
    mount_page(&site, "/new", "<html><body>New</body></html>").await;

    let records = run_crawl(&format!("{}/", base_url), &create_test_config())
        .await
        .expect("Crawl failed");

    let old = find(&records, &format!("{}/old", base_url));
    assert_eq!(old.status, Some(200));
    assert_eq!(old.final_url, format!("{}/new", base_url));
    assert!(old.error.is_empty());

    // /new is reached through /old only and gets no record of its own
    assert_eq!(records.len(), 2);

    let root = find(&records, &format!("{}/", base_url));
    assert!(root.final_url.is_empty());
}

#[tokio::test]
async fn test_links_resolve_against_final_url() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_redirect(&site, "/docs", 301, "/docs/").await;
    mount_page(&site, "/docs/", r#"<a href="child">Child</a>"#).await;
    mount_page(&site, "/docs/child", "<html></html>").await;

    let records = run_crawl(&format!("{}/docs", base_url), &create_test_config())
        .await
        .expect("Crawl failed");

    let child = find(&records, &format!("{}/docs/child", base_url));
    assert_eq!(child.status, Some(200));
    assert_eq!(child.source_page, format!("{}/docs", base_url));
}

#[tokio::test]
async fn test_soft_404_start_url() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_redirect(&site, "/", 302, "/404").await;

    let records = run_crawl(&format!("{}/", base_url), &create_test_config())
        .await
        .expect("Crawl failed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, Some(404));
    assert_eq!(records[0].final_url, format!("{}/404", base_url));
    assert!(records[0].is_broken());

    let requests = site.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_soft_404_predicate_override() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_redirect(&site, "/", 302, "/404").await;
    mount_page(&site, "/404", "<html>Error page</html>").await;

    let coordinator = Coordinator::new(&format!("{}/", base_url), &create_test_config())
        .expect("Failed to create coordinator")
        .with_soft_not_found(|_: &Url| false);
    let records = coordinator.run().await.expect("Crawl failed");

    assert_eq!(records[0].status, Some(200));
    assert_eq!(site.received_requests().await.unwrap_or_default().len(), 2);
}

#[tokio::test]
async fn test_filtered_links_never_recorded() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_page(
        &site,
        "/",
        r#"
        <a href="/manual.pdf">Manual</a>
        <a href="/list?page=2">Next</a>
        <a href="/list">List</a>
        <a href="/cdn-cgi/l/email-protection">Email</a>
        "#,
    )
    .await;
    mount_page(&site, "/list", "<html></html>").await;

    let records = run_crawl(&format!("{}/", base_url), &create_test_config())
        .await
        .expect("Crawl failed");

    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(!record.url.ends_with(".pdf"));
        assert!(!record.url.contains("page=2"));
        assert!(!record.url.contains("/cdn-cgi/"));
    }

    let paths = requested_paths(&site).await;
    assert!(!paths.iter().any(|p| p == "/manual.pdf" || p.starts_with("/cdn-cgi")));
}

#[tokio::test]
async fn test_page_cap_respected() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    let links: String = (1..=9)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&site, "/", &links).await;
    for i in 1..=9 {
        mount_page(&site, &format!("/p{}", i), &links).await;
    }

    let mut config = create_test_config();
    config.crawler.max_pages = 5;

    let records = run_crawl(&format!("{}/", base_url), &config)
        .await
        .expect("Crawl failed");

    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.status == Some(200)));
    assert_eq!(requested_paths(&site).await.len(), 5);
}

#[tokio::test]
async fn test_every_admitted_url_resolved() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;
    let base_url = site.uri();

    mount_page(
        &site,
        "/",
        &format!(
            r#"<a href="/a">A</a><a href="/b">B</a><a href="{}/x">X</a>"#,
            external.uri()
        ),
    )
    .await;
    mount_page(&site, "/a", r#"<a href="/a/1">1</a><a href="/a/2">2</a><a href="/">Home</a>"#).await;
    mount_page(&site, "/b", r#"<a href="/b/1">1</a><a href="/missing">Missing</a>"#).await;
    mount_page(&site, "/a/1", r#"<a href="/b">B</a>"#).await;
    mount_page(&site, "/a/2", "").await;
    mount_page(&site, "/b/1", "").await;
    mount_status(&external, "/x", 500).await;

    let mut config = create_test_config();
    config.crawler.workers = 2;

    let records = run_crawl(&format!("{}/", base_url), &config)
        .await
        .expect("Crawl failed");

    // root, /a, /b, x, /a/1, /a/2, /b/1, /missing
    assert_eq!(records.len(), 8);
    for record in &records {
        assert!(record.status.is_some(), "{} unresolved", record.url);
        assert_eq!(record.state, PageState::Resolved);
    }

    let broken: Vec<&str> = broken_records(&records)
        .iter()
        .map(|r| r.url.as_str())
        .collect();
    assert_eq!(broken.len(), 2);
    assert!(broken.contains(&format!("{}/missing", base_url).as_str()));
    assert!(broken.contains(&format!("{}/x", external.uri()).as_str()));

    let missing = find(&records, &format!("{}/missing", base_url));
    assert_eq!(missing.status, Some(404));
    assert_eq!(missing.source_page, format!("{}/b", base_url));
}

#[tokio::test]
async fn test_broken_links_exported() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_page(
        &site,
        "/",
        r#"<a href="/gone">Gone</a><a href="/error">Error</a><a href="/fine">Fine</a><a href="/forbidden">Forbidden</a>"#,
    )
    .await;
    mount_status(&site, "/gone", 410).await;
    mount_status(&site, "/error", 502).await;
    mount_status(&site, "/forbidden", 403).await;
    mount_page(&site, "/fine", "").await;

    let records = run_crawl(&format!("{}/", base_url), &create_test_config())
        .await
        .expect("Crawl failed");

    let stats = CrawlStatistics::from_records(&records);
    assert_eq!(stats.total_records, 5);
    assert_eq!(stats.broken, 2);

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let csv_path = dir.path().join("broken.csv");
    let rows = export_broken_csv(&records, &csv_path).expect("Export failed");
    assert_eq!(rows, 2);

    let mut reader = csv::Reader::from_path(&csv_path).expect("Failed to read CSV");
    let headers = reader.headers().expect("No header").clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["source_page", "url", "status", "error"]
    );

    let mut statuses: Vec<String> = reader
        .records()
        .map(|row| row.expect("Bad row")[2].to_string())
        .collect();
    statuses.sort();
    assert_eq!(statuses, vec!["410", "502"]);
}

#[tokio::test]
async fn test_transport_failure_recorded() {
    let site = MockServer::start().await;
    let base_url = site.uri();
    let dead = format!("http://127.0.0.1:{}/", closed_port());

    mount_page(&site, "/", &format!(r#"<a href="{}">Dead host</a>"#, dead)).await;

    let records = run_crawl(&format!("{}/", base_url), &create_test_config())
        .await
        .expect("Crawl failed");

    let failed = find(&records, &dead);
    assert_eq!(failed.status, None);
    assert!(!failed.error.is_empty());
    assert!(failed.is_transport_failure());
    assert_eq!(failed.link_type, LinkType::External);

    // Transport failures are not part of the broken link report
    assert!(broken_records(&records).is_empty());
}

#[tokio::test]
async fn test_unreachable_start_url_is_not_fatal() {
    let start = format!("http://127.0.0.1:{}/", closed_port());

    let records = run_crawl(&start, &create_test_config())
        .await
        .expect("Crawl should complete");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, None);
    assert!(!records[0].error.is_empty());
}

#[tokio::test]
async fn test_invalid_start_url_fails_fast() {
    for bad in ["not a url", "ftp://example.com/", "http://"] {
        let result = run_crawl(bad, &create_test_config()).await;
        assert!(
            matches!(result, Err(RippleError::Config(_))),
            "expected config error for {:?}",
            bad
        );
    }
}

#[tokio::test]
async fn test_cancellation_leaves_queued_unresolved() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_page(
        &site,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a><a href="/d">D</a><a href="/e">E</a>"#,
    )
    .await;
    for route in ["/a", "/b", "/c", "/d", "/e"] {
        mount_status(&site, route, 404).await;
    }

    let mut config = create_test_config();
    config.crawler.workers = 1;

    let coordinator =
        Coordinator::new(&format!("{}/", base_url), &config).expect("Failed to create coordinator");
    let handle = coordinator.handle();
    let canceller = handle.clone();
    let coordinator = coordinator.with_progress(move |snapshot: &ProgressSnapshot| {
        if snapshot.pages_processed >= 1 {
            canceller.cancel();
        }
    });

    let records = coordinator.run().await.expect("Crawl failed");

    assert!(handle.is_cancelled());
    assert_eq!(records.len(), 6);

    let root = find(&records, &format!("{}/", base_url));
    assert_eq!(root.status, Some(200));

    for route in ["/a", "/b", "/c", "/d", "/e"] {
        let record = find(&records, &format!("{}{}", base_url, route));
        assert_eq!(record.status, None);
        assert_eq!(record.state, PageState::Queued);
    }

    // Unfetched 404s never reach the report
    assert!(broken_records(&records).is_empty());

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.pages_processed, 1);
    assert_eq!(snapshot.pages_queued, 5);
    assert_eq!(requested_paths(&site).await, vec!["/".to_string()]);
}

#[tokio::test]
async fn test_cancellation_lets_in_flight_fetches_finish() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_page(
        &site,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a><a href="/d">D</a><a href="/e">E</a>"#,
    )
    .await;
    for route in ["/a", "/b", "/c", "/d", "/e"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(500)))
            .mount(&site)
            .await;
    }

    let mut config = create_test_config();
    config.crawler.workers = 2;

    let coordinator =
        Coordinator::new(&format!("{}/", base_url), &config).expect("Failed to create coordinator");
    let handle = coordinator.handle();

    // Cancel once both workers are waiting on slow responses
    let watcher = {
        let handle = handle.clone();
        tokio::spawn(async move {
            while handle.snapshot().pages_in_flight < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            handle.cancel();
        })
    };

    let records = coordinator.run().await.expect("Crawl failed");
    watcher.abort();

    assert!(handle.is_cancelled());
    assert_eq!(records.len(), 6);

    for route in ["/a", "/b"] {
        let record = find(&records, &format!("{}{}", base_url, route));
        assert_eq!(record.state, PageState::Resolved);
        assert_eq!(record.status, Some(404));
    }
    for route in ["/c", "/d", "/e"] {
        let record = find(&records, &format!("{}{}", base_url, route));
        assert_eq!(record.state, PageState::Queued);
        assert_eq!(record.status, None);
    }

    assert_eq!(broken_records(&records).len(), 2);

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.pages_processed, 3);
    assert_eq!(snapshot.pages_in_flight, 0);
    assert_eq!(snapshot.pages_queued, 3);
}

#[tokio::test]
async fn test_progress_snapshot_after_crawl() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_page(&site, "/", r#"<a href="/a">A</a><a href="/gone">Gone</a>"#).await;
    mount_page(&site, "/a", "").await;
    mount_status(&site, "/gone", 404).await;

    let coordinator = Coordinator::new(&format!("{}/", base_url), &create_test_config())
        .expect("Failed to create coordinator");
    let handle = coordinator.handle();
    coordinator.run().await.expect("Crawl failed");

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.pages_processed, 3);
    assert_eq!(snapshot.pages_broken, 1);
    assert_eq!(snapshot.pages_queued, 0);
    assert_eq!(snapshot.pages_in_flight, 0);
    assert_eq!(snapshot.percent_complete(), 100);
}
