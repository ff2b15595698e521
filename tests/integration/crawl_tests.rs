//! Integration tests for the crawler
//!
//! These tests use wiremock to serve feed pages and media files and run
//! the full page pipeline and hi-res pass over real HTTP.

use feed_harvest::config::{Config, MediaConfig, OriginConfig, OutputConfig, UserAgentConfig};
use feed_harvest::crawler::{Coordinator, HttpTransport};
use feed_harvest::output::load_statistics;
use feed_harvest::storage::{open_state_store, StateStore};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, root: &Path) -> Config {
    Config {
        origin: OriginConfig {
            page_url_template: format!("{}/{{feed}}/page/{{page}}", base_url),
            media_host_marker: "127.0.0.1".to_string(),
            asset_path_marker: "/tumblr_".to_string(),
        },
        media: MediaConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            root_dir: root.display().to_string(),
            state_file: "picpic.db".to_string(),
        },
    }
}

fn coordinator(config: Config) -> Coordinator<HttpTransport> {
    let transport = HttpTransport::new(&config.user_agent).expect("Failed to build client");
    Coordinator::new(config, "staff", transport).expect("Failed to open feed")
}

/// A feed page embedding the given media paths
fn feed_page(base_url: &str, media_paths: &[&str]) -> String {
    let mut body = format!(
        r#"<html><body><a href="{}/staff/page/2">Older</a>"#,
        base_url
    );
    for media in media_paths {
        body.push_str(&format!(r#"<img src="{}{}" alt="">"#, base_url, media));
    }
    body.push_str("</body></html>");
    body
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/staff/page/{}", page)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, file_path: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

/// Number of requests the server received for a path
async fn hits(server: &MockServer, file_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == file_path)
        .count()
}

#[tokio::test]
async fn test_full_crawl_deduplicates_by_content() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        1,
        feed_page(&base_url, &["/media/tumblr_a_500.jpg", "/media/tumblr_b_400.jpg"]),
    )
    .await;
    mount_page(&mock_server, 2, feed_page(&base_url, &["/media/tumblr_c_500.jpg"])).await;

    // a and b share a thumbnail; c is a different picture
    mount_file(&mock_server, "/media/tumblr_a_75sq.jpg", b"same thumb").await;
    mount_file(&mock_server, "/media/tumblr_b_75sq.jpg", b"same thumb").await;
    mount_file(&mock_server, "/media/tumblr_c_75sq.jpg", b"other thumb").await;
    mount_file(&mock_server, "/media/tumblr_a_500.jpg", b"full a").await;
    mount_file(&mock_server, "/media/tumblr_b_400.jpg", b"full b").await;
    mount_file(&mock_server, "/media/tumblr_c_500.jpg", b"full c").await;

    let mut coordinator = coordinator(create_test_config(&base_url, dir.path()));
    let summary = coordinator.run_pages(1, 2).await.expect("Crawl failed");

    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.new, 2);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.assets_failed, 0);

    assert_eq!(hits(&mock_server, "/media/tumblr_a_500.jpg").await, 1);
    assert_eq!(hits(&mock_server, "/media/tumblr_b_400.jpg").await, 0);
    assert_eq!(hits(&mock_server, "/media/tumblr_c_500.jpg").await, 1);

    // Every committed file lives in its picture's bucket
    let state = coordinator.state();
    assert_eq!(state.asset_count(), 2);
    assert_eq!(state.visited_count(), 3);
    for asset in state.assets() {
        let hash = asset.content_hash.as_deref().unwrap();
        assert!(coordinator.content_store().is_stored(hash, &asset.media_filename));
        assert!(coordinator.content_store().is_stored(hash, &asset.thumb_filename));
    }

    // The state file holds the same index
    let store = open_state_store(&dir.path().join("staff"), "picpic.db");
    let reloaded = store.load().expect("State file should load");
    assert_eq!(reloaded.hashes(), state.hashes());
    assert_eq!(reloaded.visited_count(), 3);
}

#[tokio::test]
async fn test_second_run_downloads_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, feed_page(&base_url, &["/media/tumblr_a_500.jpg"])).await;
    mount_file(&mock_server, "/media/tumblr_a_75sq.jpg", b"thumb a").await;
    mount_file(&mock_server, "/media/tumblr_a_500.jpg", b"full a").await;

    {
        let mut first = coordinator(create_test_config(&base_url, dir.path()));
        first.run_pages(1, 1).await.expect("First crawl failed");
    }

    // A new coordinator picks up the saved state
    let mut second = coordinator(create_test_config(&base_url, dir.path()));
    let summary = second.run_pages(1, 1).await.expect("Second crawl failed");

    assert_eq!(summary.new, 0);
    assert_eq!(summary.already_visited, 1);
    assert_eq!(hits(&mock_server, "/media/tumblr_a_75sq.jpg").await, 1);
    assert_eq!(hits(&mock_server, "/media/tumblr_a_500.jpg").await, 1);
    assert_eq!(hits(&mock_server, "/staff/page/1").await, 2);
}

#[tokio::test]
async fn test_failing_page_does_not_abort_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/staff/page/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 2, feed_page(&base_url, &["/media/tumblr_a_500.jpg"])).await;
    mount_file(&mock_server, "/media/tumblr_a_75sq.jpg", b"thumb a").await;
    mount_file(&mock_server, "/media/tumblr_a_500.jpg", b"full a").await;

    let mut coordinator = coordinator(create_test_config(&base_url, dir.path()));
    let summary = coordinator.run_pages(1, 2).await.expect("Crawl failed");

    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.new, 1);
}

#[tokio::test]
async fn test_missing_media_is_retried_next_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, feed_page(&base_url, &["/media/tumblr_a_500.jpg"])).await;
    mount_file(&mock_server, "/media/tumblr_a_75sq.jpg", b"thumb a").await;

    let mut coordinator = coordinator(create_test_config(&base_url, dir.path()));
    let first = coordinator.run_pages(1, 1).await.expect("Crawl failed");
    assert_eq!(first.assets_failed, 1);
    assert_eq!(coordinator.state().visited_count(), 0);

    mount_file(&mock_server, "/media/tumblr_a_500.jpg", b"full a").await;
    let second = coordinator.run_pages(1, 1).await.expect("Crawl failed");
    assert_eq!(second.new, 1);
    assert_eq!(coordinator.state().asset_count(), 1);
}

#[tokio::test]
async fn test_hi_res_pass_takes_first_available_variant() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, feed_page(&base_url, &["/media/tumblr_a_400.jpg"])).await;
    mount_file(&mock_server, "/media/tumblr_a_75sq.jpg", b"thumb a").await;
    mount_file(&mock_server, "/media/tumblr_a_400.jpg", b"full a").await;
    mount_file(&mock_server, "/media/tumblr_a_700.jpg", b"bigger a").await;
    mount_file(&mock_server, "/media/tumblr_a_500.jpg", b"big a").await;

    let mut coordinator = coordinator(create_test_config(&base_url, dir.path()));
    coordinator.run_pages(1, 1).await.expect("Crawl failed");

    let summary = coordinator.resolve_all_hi_res().await.expect("Hi res pass failed");
    assert_eq!(summary.downloaded, 1);

    assert_eq!(hits(&mock_server, "/media/tumblr_a_1280.jpg").await, 1);
    assert_eq!(hits(&mock_server, "/media/tumblr_a_700.jpg").await, 1);
    assert_eq!(hits(&mock_server, "/media/tumblr_a_500.jpg").await, 0);

    let asset = coordinator.state().assets().next().unwrap();
    assert!(asset.hi_res_resolved);
    assert_eq!(asset.hi_res_filename.as_deref(), Some("tumblr_a_700.jpg"));
    let hash = asset.content_hash.clone().unwrap();
    assert!(coordinator.content_store().is_stored(&hash, "tumblr_a_700.jpg"));

    // Resolution is persisted; statistics read it back from disk
    let store = open_state_store(&dir.path().join("staff"), "picpic.db");
    let stats = load_statistics(&store).expect("Statistics should load");
    assert_eq!(stats.hi_res_resolved, 1);
    assert_eq!(stats.unresolved, 0);
}

#[tokio::test]
async fn test_corrupt_state_file_starts_empty() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let feed_dir = dir.path().join("staff");
    std::fs::create_dir_all(&feed_dir).unwrap();
    std::fs::write(feed_dir.join("picpic.db"), b"definitely not sqlite").unwrap();

    mount_page(&mock_server, 1, feed_page(&base_url, &["/media/tumblr_a_500.jpg"])).await;
    mount_file(&mock_server, "/media/tumblr_a_75sq.jpg", b"thumb a").await;
    mount_file(&mock_server, "/media/tumblr_a_500.jpg", b"full a").await;

    let mut coordinator = coordinator(create_test_config(&base_url, dir.path()));
    assert!(coordinator.state().is_empty());

    let summary = coordinator.run_pages(1, 1).await.expect("Crawl failed");
    assert_eq!(summary.new, 1);

    // The save replaced the corrupt file
    let store = open_state_store(&feed_dir, "picpic.db");
    assert_eq!(store.load().expect("State file should load").asset_count(), 1);
}
