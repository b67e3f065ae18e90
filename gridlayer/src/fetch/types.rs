//! Fetch types and traits

use crate::coord::TileCoord;
use thiserror::Error;

/// Reasons a tile could not be fetched.
///
/// None of these abort a run: the fetcher logs them and reports the tile as
/// unavailable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Request never produced a response (timeout, DNS, connection reset)
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Server answered with something other than an image
    #[error("unexpected content type {content_type:?} from {url}")]
    ContentType {
        url: String,
        content_type: Option<String>,
    },

    /// HTTP client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Source of raw base-map tiles.
///
/// This is the seam the orchestrator depends on. Implementations must be
/// shareable read-only across worker threads.
pub trait TileSource: Send + Sync {
    /// Returns the tile's raw bytes, or `None` if the tile is unavailable.
    fn fetch(&self, service_url: &str, coord: &TileCoord) -> Option<Vec<u8>>;
}
