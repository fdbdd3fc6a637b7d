//! GraphQL client for the NPO Radio broadcast listing.
//!
//! One request fetches one page of broadcasts for a channel/programme,
//! newest first. The response body is returned as decoded JSON without
//! interpretation; paging decisions belong to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::broadcast::ChannelProgramme;
use crate::config::RemoteConfig;
use crate::error::{FeedError, Result};

/// Query document sent with every request.
pub const BROADCASTS_QUERY: &str = include_str!("broadcasts.graphql");

/// Operation name of [`BROADCASTS_QUERY`].
pub const OPERATION_NAME: &str = "GetBroadcastsByChannelAndProgram";

/// Field the listing is ordered by.
const ORDER_BY: &str = "from";

/// Newest broadcasts first, so page 1 is always the latest.
const ORDER_DIRECTION: &str = "desc";

/// User agent string for API requests.
const USER_AGENT: &str = concat!("npofeed/", env!("CARGO_PKG_VERSION"));

/// JSON body of a listing request.
#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    variables: Variables<'a>,
    query: &'a str,
    extensions: Extensions<'a>,
}

#[derive(Debug, Serialize)]
struct Variables<'a> {
    channel: &'a str,
    programme: &'a str,
    order_by: &'a str,
    order_direction: &'a str,
    page: u32,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct Extensions<'a> {
    #[serde(rename = "clientLibrary")]
    client_library: ClientLibrary<'a>,
}

#[derive(Debug, Serialize)]
struct ClientLibrary<'a> {
    name: &'a str,
    version: &'a str,
}

/// Client for the broadcast listing endpoint.
pub struct BroadcastClient {
    client: Client,
    api_url: String,
    page_limit: u32,
    client_name: String,
    client_version: String,
}

impl BroadcastClient {
    /// Create a client from the remote configuration.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedError::Remote(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            page_limit: config.page_limit,
            client_name: config.client_name.clone(),
            client_version: config.client_version.clone(),
        })
    }

    /// Build the request body for one page.
    fn request_body<'a>(&'a self, key: &'a ChannelProgramme, page: u32) -> GraphqlRequest<'a> {
        GraphqlRequest {
            operation_name: OPERATION_NAME,
            variables: Variables {
                channel: &key.channel,
                programme: &key.programme,
                order_by: ORDER_BY,
                order_direction: ORDER_DIRECTION,
                page,
                limit: self.page_limit,
            },
            query: BROADCASTS_QUERY,
            extensions: Extensions {
                client_library: ClientLibrary {
                    name: &self.client_name,
                    version: &self.client_version,
                },
            },
        }
    }

    /// Fetch one page of broadcasts (1-based).
    ///
    /// Transport errors, timeouts, non-2xx statuses and non-JSON bodies are
    /// reported as [`FeedError::Remote`].
    pub async fn fetch_page(&self, key: &ChannelProgramme, page: u32) -> Result<Value> {
        debug!("Fetching page {} of {}", page, key);

        let response = self
            .client
            .post(&self.api_url)
            .json(&self.request_body(key, page))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Remote(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response.json::<Value>().await?;
        Ok(body)
    }
}
