//! Test helpers for integration tests.
//!
//! Provides a mocked GraphQL endpoint and a pipeline wired to a temporary
//! cache directory.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use npofeed::config::RemoteConfig;
use npofeed::{BroadcastClient, BroadcastSync, ChannelProgramme, FileBroadcastStore};

/// Channel used throughout the tests.
pub const CHANNEL: &str = "npo-3fm";

/// Cache namespace used throughout the tests.
pub const NAMESPACE: &str = "npo-radio";

/// A pipeline over a mock remote and a temporary cache.
pub struct TestPipeline {
    pub server: MockServer,
    pub store: Arc<FileBroadcastStore>,
    pub sync: BroadcastSync,
    _temp_dir: TempDir,
}

impl TestPipeline {
    /// Start a mock remote and an empty cache.
    pub async fn start() -> Self {
        Self::start_with_max_pages(npofeed::pipeline::DEFAULT_MAX_PAGES).await
    }

    /// Start with a custom cold-start page ceiling.
    pub async fn start_with_max_pages(max_pages: u32) -> Self {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileBroadcastStore::new(temp_dir.path(), NAMESPACE).unwrap());
        let client = BroadcastClient::new(&remote_config(&server)).unwrap();
        let sync = BroadcastSync::new(client, store.clone()).with_max_pages(max_pages);

        Self {
            server,
            store,
            sync,
            _temp_dir: temp_dir,
        }
    }

    /// Serve `body` for one page of one programme, expecting `calls` requests.
    pub async fn mount_page(&self, programme: &str, page: u32, body: Value, calls: u64) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({
                "variables": {"channel": CHANNEL, "programme": programme, "page": page}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Fail one page of one programme with an HTTP status.
    pub async fn mount_failure(&self, programme: &str, page: u32, status: u16) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({
                "variables": {"channel": CHANNEL, "programme": programme, "page": page}
            })))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

/// Remote configuration pointing at the mock server.
pub fn remote_config(server: &MockServer) -> RemoteConfig {
    RemoteConfig {
        api_url: format!("{}/graphql", server.uri()),
        total_timeout_secs: 5,
        ..RemoteConfig::default()
    }
}

/// Key of a test programme.
pub fn key(programme: &str) -> ChannelProgramme {
    ChannelProgramme::new(CHANNEL, programme).unwrap()
}

/// A GraphQL listing response.
pub fn listing(has_more_pages: bool, records: Value) -> Value {
    json!({
        "data": {
            "radio_broadcasts": {
                "has_more_pages": has_more_pages,
                "data": records
            }
        }
    })
}

/// A minimal broadcast with an id and a name.
pub fn broadcast(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "from": "2024-01-15T20:00:00+01:00",
        "radio_programmes": {"name": "3voor12 Radio", "url": "https://www.npo3fm.nl/3voor12"},
        "radio_audio_assets": [{"url": format!("https://cdn.example.com/{id}.mp3"), "duration": 3600000}]
    })
}

/// Ids of records, in order; `None` for records without one.
pub fn ids(records: &[npofeed::BroadcastRecord]) -> Vec<Option<String>> {
    records.iter().map(|r| r.id()).collect()
}

/// Shorthand for an expected id list.
pub fn some_ids(ids: &[&str]) -> Vec<Option<String>> {
    ids.iter().map(|id| Some(id.to_string())).collect()
}
