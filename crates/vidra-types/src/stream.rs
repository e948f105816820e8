//! Stream resource payloads.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-side lifecycle state of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Draft,
    Processing,
    Ready,
    Published,
    Error,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamStatus::Draft => "draft",
            StreamStatus::Processing => "processing",
            StreamStatus::Ready => "ready",
            StreamStatus::Published => "published",
            StreamStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Who can see a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Unlisted,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            _ => Err(format!(
                "unknown visibility '{value}' (expected public, private or unlisted)"
            )),
        }
    }
}

/// A stream resource as the server returns it.
///
/// The client holds read-through cached copies keyed by `id`; a cached copy
/// is never served after its cache tag has been invalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: StreamStatus,
    pub owner_id: String,
    pub visibility: Visibility,
    /// Server sends `null` for streams without tags.
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub storage: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Body of `POST stream/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStreamRequest {
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
    pub tags: Vec<String>,
}

/// Partial body of `PATCH stream/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStreamRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Query parameters for `GET stream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub limit: u64,
    pub offset: u64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

/// One page of the public stream listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamPage {
    pub items: Vec<Stream>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl StreamPage {
    /// Offset the scroll driver should request for the next page.
    pub fn next_offset(&self) -> u64 {
        self.items.len() as u64
    }

    /// True when every item the server knows about is already loaded.
    pub fn is_complete(&self) -> bool {
        self.items.len() as u64 >= self.total
    }
}
