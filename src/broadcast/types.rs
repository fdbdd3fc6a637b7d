//! Broadcast types for npofeed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FeedError, Result};

/// One aired episode as returned by the remote API.
///
/// Records are kept as loosely-structured JSON objects so that every field
/// the remote sends survives a round trip through the cache, including the
/// ones this crate never reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BroadcastRecord(Map<String, Value>);

impl BroadcastRecord {
    /// Convert a JSON value into a record; non-objects yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Identity of the record.
    ///
    /// Strings and numbers are identities; `null`, a missing key or any
    /// other JSON type means the record has no identity.
    pub fn id(&self) -> Option<String> {
        self.0.get("id").and_then(scalar_text)
    }

    /// Secondary identifier, used for guids when there is no `id`.
    pub fn urn(&self) -> Option<String> {
        self.0.get("urn").and_then(scalar_text)
    }

    /// Episode title.
    pub fn name(&self) -> Option<String> {
        self.0.get("name").and_then(scalar_text)
    }

    /// Episode web page.
    pub fn url(&self) -> Option<String> {
        self.0.get("url").and_then(scalar_text)
    }

    /// Broadcast start (the `from` field), as sent by the remote.
    pub fn aired_at(&self) -> Option<String> {
        self.0.get("from").and_then(scalar_text)
    }

    /// Episode description.
    pub fn description(&self) -> Option<String> {
        self.0.get("description").and_then(scalar_text)
    }

    /// Programme metadata nested under `radio_programmes`.
    ///
    /// The remote sends a single object; a list is tolerated and its first
    /// element used.
    pub fn programme(&self) -> Option<ProgrammeInfo<'_>> {
        let nested = match self.0.get("radio_programmes")? {
            Value::Object(fields) => fields,
            Value::Array(items) => items.first()?.as_object()?,
            _ => return None,
        };
        Some(ProgrammeInfo(nested))
    }

    /// The first entry of `radio_audio_assets`, if any.
    pub fn audio_asset(&self) -> Option<AudioAsset<'_>> {
        let assets = self.0.get("radio_audio_assets")?.as_array()?;
        assets.first()?.as_object().map(AudioAsset)
    }
}

impl From<Map<String, Value>> for BroadcastRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Borrowed view of a record's programme metadata.
#[derive(Debug, Clone, Copy)]
pub struct ProgrammeInfo<'a>(&'a Map<String, Value>);

impl ProgrammeInfo<'_> {
    /// Programme name.
    pub fn name(&self) -> Option<String> {
        self.0.get("name").and_then(scalar_text)
    }

    /// Programme web page.
    pub fn url(&self) -> Option<String> {
        self.0.get("url").and_then(scalar_text)
    }

    /// Programme description.
    pub fn description(&self) -> Option<String> {
        self.0.get("description").and_then(scalar_text)
    }
}

/// Borrowed view of an audio asset.
#[derive(Debug, Clone, Copy)]
pub struct AudioAsset<'a>(&'a Map<String, Value>);

impl AudioAsset<'_> {
    /// Stream or download URL; empty strings count as absent.
    pub fn url(&self) -> Option<String> {
        self.0
            .get("url")
            .and_then(scalar_text)
            .filter(|url| !url.is_empty())
    }

    /// Duration in milliseconds. Numeric strings are accepted.
    pub fn duration_ms(&self) -> Option<f64> {
        match self.0.get("duration")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Text of a scalar JSON value.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One page of the remote `radio_broadcasts` listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BroadcastPage {
    /// Whether the remote announced another page.
    pub has_more_pages: bool,
    /// Records of this page; `None` when the list is missing or not an array.
    pub records: Option<Vec<BroadcastRecord>>,
}

impl BroadcastPage {
    /// Interpret a decoded GraphQL response body.
    ///
    /// Elements of the record list that are not JSON objects are dropped.
    pub fn from_response(body: &Value) -> Self {
        let listing = body.pointer("/data/radio_broadcasts");
        let has_more_pages = listing
            .and_then(|l| l.get("has_more_pages"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let records = listing
            .and_then(|l| l.get("data"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .cloned()
                    .filter_map(BroadcastRecord::from_value)
                    .collect()
            });

        Self {
            has_more_pages,
            records,
        }
    }

    /// Records of this page, or an empty list when the page was malformed.
    pub fn into_records(self) -> Vec<BroadcastRecord> {
        self.records.unwrap_or_default()
    }
}

/// Cache identity of a feed: a channel and one of its programmes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelProgramme {
    /// Channel key, e.g. `npo-3fm`.
    pub channel: String,
    /// Programme key, e.g. `3voor12-radio`.
    pub programme: String,
}

impl ChannelProgramme {
    /// Create a key, rejecting segments that could escape the cache namespace.
    pub fn new(channel: impl Into<String>, programme: impl Into<String>) -> Result<Self> {
        let channel = channel.into();
        let programme = programme.into();
        validate_segment("channel", &channel)?;
        validate_segment("programme", &programme)?;
        Ok(Self { channel, programme })
    }
}

impl fmt::Display for ChannelProgramme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel, self.programme)
    }
}

/// Check that a key segment is a single, non-hidden path component.
fn validate_segment(label: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(FeedError::Validation(format!("{label} is empty")));
    }
    if segment.starts_with('.') || segment.contains(|c: char| matches!(c, '/' | '\\' | '\0')) {
        return Err(FeedError::Validation(format!(
            "{label} contains forbidden characters: {segment}"
        )));
    }
    Ok(())
}
