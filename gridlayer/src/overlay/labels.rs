//! Zone label placement.
//!
//! Zone identifiers are found by sampling rather than by intersecting zone
//! polygons. A coarse 11×11 pass counts the distinct identifiers in a tile.
//! A tile with a single identifier gets one label at its center; a tile with
//! several is re-scanned on a 5×5 lattice (every fifth point of a 21×21
//! grid) and each identifier is labelled at the first lattice point where it
//! is seen. The scan runs south to north, west to east within a row, so
//! labels lean towards the tile's south-west corner.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use crate::coord::TileBounds;
use crate::mgrs::{GridReferenceConverter, MgrsConverter};

/// Intervals per axis for the detection pass (11 points per axis).
const DETECTION_INTERVALS: usize = 10;
/// Intervals per axis for the placement pass.
const PLACEMENT_INTERVALS: usize = 20;
/// Stride through the placement grid (5 points per axis).
const PLACEMENT_STRIDE: usize = 5;

/// A zone identifier anchored at a geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLabel {
    /// First five characters of the grid reference: zone, band and 100 km
    /// square in UTM, or zone letter, square and two offset digits in UPS
    pub identifier: String,
    pub lat: f64,
    pub lon: f64,
}

/// Computes zone labels for tiles.
///
/// Holds the grid reference converter so tests can substitute synthetic
/// zone layouts.
#[derive(Clone)]
pub struct GridOverlay {
    converter: Arc<dyn GridReferenceConverter>,
}

impl Default for GridOverlay {
    fn default() -> Self {
        Self::new(Arc::new(MgrsConverter))
    }
}

impl GridOverlay {
    pub fn new(converter: Arc<dyn GridReferenceConverter>) -> Self {
        Self { converter }
    }

    /// Computes the zone labels for a tile.
    ///
    /// Conversion failures at individual sample points are skipped; a tile
    /// where every sample fails yields no labels.
    pub fn compute_zone_labels(&self, bounds: &TileBounds) -> Vec<ZoneLabel> {
        let zones = self.distinct_zones(bounds);

        if zones.len() <= 1 {
            return zones
                .into_iter()
                .map(|identifier| {
                    let (lat, lon) = bounds.center();
                    ZoneLabel {
                        identifier,
                        lat,
                        lon,
                    }
                })
                .collect();
        }

        let mut seen = HashSet::new();
        let mut labels = Vec::new();

        for (lat, lon) in sample_points(bounds, PLACEMENT_INTERVALS, PLACEMENT_STRIDE) {
            if let Some(identifier) = self.sample(lat, lon) {
                if seen.insert(identifier.clone()) {
                    labels.push(ZoneLabel {
                        identifier,
                        lat,
                        lon,
                    });
                }
            }
        }

        labels
    }

    /// Distinct zone identifiers found by the detection pass.
    fn distinct_zones(&self, bounds: &TileBounds) -> HashSet<String> {
        sample_points(bounds, DETECTION_INTERVALS, 1)
            .filter_map(|(lat, lon)| self.sample(lat, lon))
            .collect()
    }

    fn sample(&self, lat: f64, lon: f64) -> Option<String> {
        match self.converter.zone_identifier(lat, lon) {
            Ok(identifier) => Some(identifier),
            Err(e) => {
                trace!(lat, lon, error = %e, "Grid reference sample skipped");
                None
            }
        }
    }
}

/// Sample points over a `(intervals + 1)²` grid, taking every `stride`th
/// point on each axis. Rows run south to north; within a row, west to east.
fn sample_points(
    bounds: &TileBounds,
    intervals: usize,
    stride: usize,
) -> impl Iterator<Item = (f64, f64)> {
    let lat_step = bounds.height() / intervals as f64;
    let lon_step = bounds.width() / intervals as f64;
    let (south, west) = (bounds.south, bounds.west);

    (0..=intervals).step_by(stride).flat_map(move |i| {
        (0..=intervals)
            .step_by(stride)
            .map(move |j| (south + i as f64 * lat_step, west + j as f64 * lon_step))
    })
}
