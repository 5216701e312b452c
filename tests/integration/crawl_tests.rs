//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the catalog service and run the
//! full harvest cycle end-to-end against a temporary data directory.

use catalog_harvester::config::HarvestConfig;
use catalog_harvester::output::header_line;
use catalog_harvester::{run_crawl, CrawlEngine, CrawlPhase, HarvestError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_SIZE: u64 = 15;

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, data_dir: &Path) -> HarvestConfig {
    let mut config = HarvestConfig::default();
    config.endpoints.base_url = format!("{}/search/", server.uri());
    config.crawler.page_size = PAGE_SIZE;
    config.crawler.item_delay_ms = 0;
    config.crawler.page_delay_ms = 0;
    config.retry.max_attempts = 2;
    config.retry.base_delay_ms = 1;
    config.output.data_dir = data_dir.to_path_buf();
    config.output.mirror_records = false;
    config
}

fn detail_page(index: u64) -> String {
    format!(
        r#"<html><body>
            <h4>Project {index}</h4>
            <div class="location"><span>Province {index}</span><span>City {index}</span></div>
            <div class="industry"><span>Industry {index}</span></div>
            <h5>项目概述</h5><p>Overview of {index}</p>
            <h5>项目进展</h5><p>Progress of {index}</p>
            <h5>团队信息</h5><p>Team of {index}</p>
            <h5>专利情况</h5><p>Patent of {index}</p>
        </body></html>"#
    )
}

fn listing_page(page: u64, total: u64) -> String {
    let first = page * PAGE_SIZE + 1;
    let last = ((page + 1) * PAGE_SIZE).min(total);
    let rows: String = (first..=last)
        .map(|i| format!(r#"<tr data-link="detail/{i}"><td>Project {i}</td></tr>"#))
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}

async fn mount_count(server: &MockServer, total: u64) {
    Mock::given(method("GET"))
        .and(path("/search/projectcount"))
        .respond_with(ResponseTemplate::new(200).set_body_string(total.to_string()))
        .mount(server)
        .await;
}

/// Mounts the count endpoint, every listing page, and every detail page
async fn mount_catalog(server: &MockServer, total: u64) {
    mount_count(server, total).await;

    for page in 0..total.div_ceil(PAGE_SIZE) {
        Mock::given(method("GET"))
            .and(path("/search/projectlist"))
            .and(query_param("pageIndex", page.to_string()))
            .and(query_param("pageSize", PAGE_SIZE.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(page, total)))
            .mount(server)
            .await;
    }

    for i in 1..=total {
        Mock::given(method("GET"))
            .and(path(format!("/search/detail/{i}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(i)))
            .mount(server)
            .await;
    }
}

fn read_table(data_dir: &Path) -> Vec<String> {
    std::fs::read_to_string(data_dir.join("data.csv"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn read_cursor(data_dir: &Path) -> String {
    std::fs::read_to_string(data_dir.join("index.txt")).unwrap()
}

/// Asserts the table holds the header then items 1..=count, in order, once each
fn assert_table_holds(lines: &[String], count: u64) {
    assert_eq!(lines.len() as u64, count + 1);
    assert_eq!(lines[0], header_line());
    for (offset, line) in lines[1..].iter().enumerate() {
        let expected = format!("\"Project {}\",", offset + 1);
        assert!(
            line.starts_with(&expected),
            "row {} was {:?}",
            offset + 1,
            line
        );
    }
}

#[tokio::test]
async fn test_full_harvest() {
    let server = MockServer::start().await;
    mount_catalog(&server, 30).await;

    let dir = TempDir::new().unwrap();
    let summary = run_crawl(create_test_config(&server, dir.path()), false)
        .await
        .unwrap();

    assert_eq!(summary.total_count, 30);
    assert_eq!(summary.items_processed, 30);
    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.first_item, 1);
    assert_eq!(summary.last_item, Some(30));
    assert_eq!(summary.refetched, 0);

    assert_table_holds(&read_table(dir.path()), 30);
    assert_eq!(read_cursor(dir.path()), "Current Project Index: 30");

    let row = &read_table(dir.path())[7];
    assert!(row.contains("\"City 7\""));
    assert!(row.ends_with(&format!("\"{}/search/detail/7\"", server.uri())));
}

#[tokio::test]
async fn test_rerun_after_completion_does_nothing() {
    let server = MockServer::start().await;
    mount_catalog(&server, 30).await;

    let dir = TempDir::new().unwrap();
    run_crawl(create_test_config(&server, dir.path()), false)
        .await
        .unwrap();
    let table_before = read_table(dir.path());

    // Second run sees a complete cursor and must not touch listings or details
    let idle = MockServer::start().await;
    mount_count(&idle, 30).await;
    Mock::given(method("GET"))
        .and(path("/search/projectlist"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&idle)
        .await;

    let mut engine = CrawlEngine::new(create_test_config(&idle, dir.path()), false).unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(engine.phase(), CrawlPhase::Done);
    assert_eq!(summary.items_processed, 0);
    assert_eq!(summary.last_item, None);
    assert_eq!(read_table(dir.path()), table_before);
    assert_eq!(read_cursor(dir.path()), "Current Project Index: 30");
}

#[tokio::test]
async fn test_resume_after_partial_run() {
    let server = MockServer::start().await;
    mount_catalog(&server, 30).await;
    let dir = TempDir::new().unwrap();

    let mut partial = create_test_config(&server, dir.path());
    partial.crawler.end_index = 20;
    let summary = run_crawl(partial, false).await.unwrap();

    assert_eq!(summary.last_item, Some(20));
    assert_table_holds(&read_table(dir.path()), 20);
    assert_eq!(read_cursor(dir.path()), "Current Project Index: 20");

    let summary = run_crawl(create_test_config(&server, dir.path()), false)
        .await
        .unwrap();

    // Items 16..=20 share page 1 with the resume point and are rewritten
    assert_eq!(summary.first_item, 16);
    assert_eq!(summary.items_processed, 15);
    assert_eq!(summary.refetched, 5);
    assert_table_holds(&read_table(dir.path()), 30);
    assert_eq!(read_cursor(dir.path()), "Current Project Index: 30");
}

#[tokio::test]
async fn test_explicit_reharvest_below_cursor_is_recovered_by_resume() {
    let server = MockServer::start().await;
    mount_catalog(&server, 45).await;
    let dir = TempDir::new().unwrap();

    run_crawl(create_test_config(&server, dir.path()), false)
        .await
        .unwrap();
    assert_table_holds(&read_table(dir.path()), 45);

    let mut reharvest = create_test_config(&server, dir.path());
    reharvest.crawler.start_index = 16;
    reharvest.crawler.end_index = 20;
    let summary = run_crawl(reharvest, false).await.unwrap();

    // The table is cut back to the re-harvested range and the cursor follows it
    assert_eq!(summary.last_item, Some(20));
    assert_table_holds(&read_table(dir.path()), 20);
    assert_eq!(read_cursor(dir.path()), "Current Project Index: 20");

    let summary = run_crawl(create_test_config(&server, dir.path()), false)
        .await
        .unwrap();

    assert_eq!(summary.first_item, 16);
    assert_eq!(summary.last_item, Some(45));
    assert_table_holds(&read_table(dir.path()), 45);
    assert_eq!(read_cursor(dir.path()), "Current Project Index: 45");
}

#[tokio::test]
async fn test_torn_row_after_crash_is_rewritten() {
    let server = MockServer::start().await;
    mount_catalog(&server, 30).await;
    let dir = TempDir::new().unwrap();

    // Simulate a crash after item 17's cursor save, mid-way through row 18
    let mut stored = format!("{}\n", header_line());
    for i in 1..=17 {
        stored.push_str(&format!("\"Project {i}\",\"stale\"\n"));
    }
    stored.push_str("\"Project 18\",\"Prov");
    std::fs::write(dir.path().join("data.csv"), stored).unwrap();
    std::fs::write(dir.path().join("index.txt"), "Current Project Index: 17").unwrap();

    let summary = run_crawl(create_test_config(&server, dir.path()), false)
        .await
        .unwrap();
    assert_eq!(summary.first_item, 16);

    let lines = read_table(dir.path());
    assert_table_holds(&lines, 30);
    assert!(lines[15].contains("stale"));
    assert!(!lines[16].contains("stale"));
    assert!(!lines.iter().any(|line| line.ends_with("\"Prov")));
}

#[tokio::test]
async fn test_fresh_run_rewrites_store() {
    let server = MockServer::start().await;
    mount_catalog(&server, 30).await;
    let dir = TempDir::new().unwrap();

    std::fs::write(dir.path().join("data.csv"), "garbage\n").unwrap();
    std::fs::write(dir.path().join("index.txt"), "Current Project Index: 30").unwrap();

    let summary = run_crawl(create_test_config(&server, dir.path()), true)
        .await
        .unwrap();

    assert_eq!(summary.items_processed, 30);
    assert_table_holds(&read_table(dir.path()), 30);
}

#[tokio::test]
async fn test_fetch_exhaustion_aborts_and_keeps_progress() {
    let server = MockServer::start().await;
    // Failing mock first so it wins over the catalog's detail page
    Mock::given(method("GET"))
        .and(path("/search/detail/7"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    mount_catalog(&server, 30).await;

    let dir = TempDir::new().unwrap();
    let err = run_crawl(create_test_config(&server, dir.path()), false)
        .await
        .unwrap_err();

    match err {
        HarvestError::Fetch { url, attempts, .. } => {
            assert!(url.ends_with("/search/detail/7"));
            assert_eq!(attempts, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_table_holds(&read_table(dir.path()), 6);
    assert_eq!(read_cursor(dir.path()), "Current Project Index: 6");
}

#[tokio::test]
async fn test_extraction_failure_aborts_and_keeps_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/detail/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>gone</body></html>"))
        .mount(&server)
        .await;
    mount_catalog(&server, 30).await;

    let dir = TempDir::new().unwrap();
    let err = run_crawl(create_test_config(&server, dir.path()), false)
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Extraction { ref url, .. } if url.ends_with("/detail/5")));
    assert_table_holds(&read_table(dir.path()), 4);
    assert_eq!(read_cursor(dir.path()), "Current Project Index: 4");
}

#[tokio::test]
async fn test_mirror_files_are_written() {
    let server = MockServer::start().await;
    mount_catalog(&server, 30).await;
    let dir = TempDir::new().unwrap();

    let mut config = create_test_config(&server, dir.path());
    config.output.mirror_records = true;
    config.crawler.end_index = 3;
    run_crawl(config, false).await.unwrap();

    // Width follows the remote total, not the end bound
    let mirror = std::fs::read_to_string(dir.path().join("02_Project 2")).unwrap();
    assert!(mirror.starts_with("Title\n\nProject 2\n\nProvince\n\nProvince 2"));
    assert!(dir.path().join("01_Project 1").exists());
    assert!(dir.path().join("03_Project 3").exists());
    assert!(!dir.path().join("04_Project 4").exists());
}

#[tokio::test]
async fn test_listing_requests_carry_rotation_headers() {
    let server = MockServer::start().await;
    mount_count(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/search/projectlist"))
        .and(wiremock::matchers::header("x-requested-with", "XMLHttpRequest"))
        .and(wiremock::matchers::header("user-agent", "TestAgent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(0, 2)))
        .expect(1)
        .mount(&server)
        .await;
    for i in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/search/detail/{i}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(i)))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, dir.path());
    config.request.user_agents = vec!["TestAgent/1.0".to_string()];

    let summary = run_crawl(config, false).await.unwrap();
    assert_eq!(summary.items_processed, 2);
}
