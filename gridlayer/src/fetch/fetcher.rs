//! ArcGIS-style tile fetcher.

use tracing::{trace, warn};

use super::http::HttpClient;
use super::types::{FetchError, TileSource};
use crate::coord::TileCoord;

/// Fetches base-map tiles from a tile service.
///
/// Tile URLs follow the ArcGIS REST layout `{base}/tile/{z}/{row}/{col}`,
/// row before column.
pub struct TileFetcher<C: HttpClient> {
    http_client: C,
}

impl<C: HttpClient> TileFetcher<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Builds the request URL for a tile.
    pub fn tile_url(service_url: &str, coord: &TileCoord) -> String {
        format!(
            "{}/tile/{}/{}/{}",
            service_url.trim_end_matches('/'),
            coord.zoom,
            coord.row,
            coord.col
        )
    }

    /// Fetches a tile, reporting why it failed.
    ///
    /// Only responses with a 2xx status and an `image/*` content type are
    /// accepted.
    pub fn try_fetch(&self, service_url: &str, coord: &TileCoord) -> Result<Vec<u8>, FetchError> {
        let url = Self::tile_url(service_url, coord);
        trace!(tile = %coord, url = %url, "Requesting tile");

        let response = self.http_client.get(&url)?;

        if !response.is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status,
            });
        }

        let is_image = response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(FetchError::ContentType {
                url,
                content_type: response.content_type,
            });
        }

        Ok(response.body)
    }
}

impl<C: HttpClient> TileSource for TileFetcher<C> {
    fn fetch(&self, service_url: &str, coord: &TileCoord) -> Option<Vec<u8>> {
        match self.try_fetch(service_url, coord) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(tile = %coord, error = %e, "Tile unavailable");
                None
            }
        }
    }
}
