//! Base-map tile retrieval.
//!
//! A [`TileFetcher`] downloads one tile per request from an ArcGIS-style
//! tile service through an injected [`HttpClient`]. Failures never abort a
//! run: [`TileSource::fetch`] logs them and reports the tile as unavailable.

mod fetcher;
mod http;
mod types;

pub use fetcher::TileFetcher;
pub use http::{HttpClient, HttpResponse, ReqwestClient, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use types::{FetchError, TileSource};
