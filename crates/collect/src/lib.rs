pub mod classify;
pub mod gamedb;
pub mod limit;
pub mod playlist;
pub mod snapshot;
pub mod source;
pub mod sync;
pub mod youtube;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("api error: {0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("invalid rule pattern: {0}")]
    Pattern(String),
    #[error("invalid query filter: {0}")]
    Query(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}

/// A fetched video, as the hosting platform reports it. Immutable once
/// fetched; the raw snapshot holds these verbatim.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub description: String,
    /// ISO-8601 `Z`-suffixed publish time string from the platform.
    pub published_at: String,
}

/// A record trimmed to the fields the classification output carries.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoSummary {
    pub title: String,
    pub description: String,
    /// Publish time as seconds since the Unix epoch.
    pub published_at: i64,
}
