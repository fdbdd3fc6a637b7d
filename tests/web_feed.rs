//! Feed endpoint tests.
//!
//! Drives the router with axum-test and parses the served documents with
//! feed-rs to make sure podcast clients can read them.

mod common;

use std::fs;
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use common::{broadcast, key, listing, TestPipeline, NAMESPACE};
use npofeed::cache::BroadcastStore;
use npofeed::web::{create_router, AppState};
use npofeed::{BroadcastRecord, FileBroadcastStore};

fn create_test_server(store: Arc<dyn BroadcastStore>) -> TestServer {
    let state = AppState::new(store, "https://feeds.example.com", "nl-NL");
    TestServer::new(create_router(Arc::new(state))).expect("Failed to create test server")
}

fn write_records(store: &FileBroadcastStore, programme: &str, records: serde_json::Value) {
    let records: Vec<BroadcastRecord> = serde_json::from_value(records).unwrap();
    store.write(&key(programme), &records).unwrap();
}

#[tokio::test]
async fn test_feed_is_valid_rss() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    write_records(
        &store,
        "show",
        json!([
            broadcast("1001", "Live & Loud"),
            {"name": "Minimal"}
        ]),
    );
    let server = create_test_server(store);

    let response = server.get("/feeds/npo-3fm/show").await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type"),
        "application/rss+xml; charset=UTF-8"
    );

    let body = response.text();
    assert!(body.contains("<language>nl-NL</language>"));

    // feed-rs normalizes the language tag to lowercase
    let feed = feed_rs::parser::parse(body.as_bytes()).unwrap();
    assert_eq!(feed.title.unwrap().content, "3voor12 Radio");
    assert_eq!(feed.language.as_deref(), Some("nl-nl"));
    assert_eq!(feed.entries.len(), 2);

    let full = &feed.entries[0];
    assert_eq!(full.id, "1001");
    assert_eq!(full.title.as_ref().unwrap().content, "Live & Loud");
    assert!(full.published.is_some());

    let minimal = &feed.entries[1];
    assert_eq!(minimal.title.as_ref().unwrap().content, "Minimal");
    assert!(minimal.published.is_none());
}

#[tokio::test]
async fn test_feed_item_elements() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    write_records(&store, "show", json!([broadcast("7", "Episode 7")]));
    let server = create_test_server(store);

    let xml = server.get("/feeds/npo-3fm/show").await.text();

    assert!(xml.contains(
        "<atom:link href=\"https://feeds.example.com/feeds/npo-3fm/show\" rel=\"self\" type=\"application/rss+xml\"/>"
    ));
    assert!(xml.contains("<guid isPermaLink=\"false\">7</guid>"));
    assert!(xml.contains("<pubDate>Mon, 15 Jan 2024 20:00:00 +0100</pubDate>"));
    assert!(xml.contains(
        "<enclosure url=\"https://cdn.example.com/7.mp3\" length=\"0\" type=\"audio/mpeg\"/>"
    ));
    assert!(xml.contains("<itunes:duration>1:00:00</itunes:duration>"));
}

#[tokio::test]
async fn test_feed_self_link_keeps_query_string() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    write_records(&store, "show", json!([broadcast("7", "Episode 7")]));
    let server = create_test_server(store);

    let response = server
        .get("/feeds/npo-3fm/show")
        .add_query_param("format", "audio")
        .await;

    response.assert_status_ok();
    assert!(response.text().contains(
        "<atom:link href=\"https://feeds.example.com/feeds/npo-3fm/show?format=audio\" rel=\"self\""
    ));
}

#[tokio::test]
async fn test_feed_absent_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    let server = create_test_server(store);

    let response = server.get("/feeds/npo-3fm/unknown").await;

    response.assert_status_not_found();
    assert_eq!(response.text(), "Feed not found");
}

#[tokio::test]
async fn test_feed_empty_cache_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    write_records(&store, "empty", json!([]));
    let server = create_test_server(store);

    server
        .get("/feeds/npo-3fm/empty")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_feed_unrecognized_cache_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    let entry = store.entry_path(&key("garbled"));
    fs::create_dir_all(entry.parent().unwrap()).unwrap();
    fs::write(&entry, "{\"unexpected\": true}").unwrap();
    let server = create_test_server(store);

    server
        .get("/feeds/npo-3fm/garbled")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_feed_legacy_keyed_cache_is_served() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    let entry = store.entry_path(&key("legacy"));
    fs::create_dir_all(entry.parent().unwrap()).unwrap();
    fs::write(
        &entry,
        json!({"broadcasts": [{"id": "1", "name": "From the archive"}]}).to_string(),
    )
    .unwrap();
    let server = create_test_server(store);

    let response = server.get("/feeds/npo-3fm/legacy").await;

    response.assert_status_ok();
    assert!(response.text().contains("<title>From the archive</title>"));
}

#[tokio::test]
async fn test_feed_hidden_programme_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    let server = create_test_server(store);

    server
        .get("/feeds/npo-3fm/.hidden")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_health() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
    let server = create_test_server(store);

    let response = server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_synced_feed_is_served() {
    let t = TestPipeline::start().await;
    t.mount_page(
        "show",
        1,
        listing(
            false,
            json!([broadcast("2", "Second"), broadcast("1", "First")]),
        ),
        1,
    )
    .await;
    t.sync.sync(&key("show")).await.unwrap();

    let server = create_test_server(t.store.clone());
    let response = server.get("/feeds/npo-3fm/show").await;

    response.assert_status_ok();
    let feed = feed_rs::parser::parse(response.text().as_bytes()).unwrap();
    let ids: Vec<_> = feed.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
}
