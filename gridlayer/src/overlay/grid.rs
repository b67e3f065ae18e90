//! Grid line generation.

use crate::coord::TileBounds;

/// Grid precision level, selected from the zoom level.
///
/// Each level corresponds to an MGRS precision (100 km down to 10 m squares)
/// and a fixed spacing in degrees approximating that cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GridPrecision {
    /// 100 km squares, 1° spacing (zoom ≤ 6)
    HundredKilometers,
    /// 10 km squares, 0.1° spacing (zoom ≤ 10)
    TenKilometers,
    /// 1 km squares, 0.01° spacing (zoom ≤ 13)
    OneKilometer,
    /// 100 m squares, 0.001° spacing (zoom ≤ 16)
    HundredMeters,
    /// 10 m squares, 0.0001° spacing
    TenMeters,
}

impl GridPrecision {
    /// Selects the precision for a zoom level.
    pub fn from_zoom(zoom: u8) -> Self {
        match zoom {
            0..=6 => GridPrecision::HundredKilometers,
            7..=10 => GridPrecision::TenKilometers,
            11..=13 => GridPrecision::OneKilometer,
            14..=16 => GridPrecision::HundredMeters,
            _ => GridPrecision::TenMeters,
        }
    }

    /// Precision level, 1 (coarsest) to 5 (finest).
    pub fn level(&self) -> u8 {
        match self {
            GridPrecision::HundredKilometers => 1,
            GridPrecision::TenKilometers => 2,
            GridPrecision::OneKilometer => 3,
            GridPrecision::HundredMeters => 4,
            GridPrecision::TenMeters => 5,
        }
    }

    /// Number of grid intervals per degree (the reciprocal of the spacing).
    pub fn divisions_per_degree(&self) -> u32 {
        10u32.pow(self.level() as u32 - 1)
    }

    /// Grid spacing in degrees.
    pub fn spacing(&self) -> f64 {
        1.0 / self.divisions_per_degree() as f64
    }
}

/// Direction a grid line runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Line of constant longitude
    Vertical,
    /// Line of constant latitude
    Horizontal,
}

/// A single grid line in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub orientation: Orientation,
    /// Longitude for vertical lines, latitude for horizontal lines.
    pub coordinate: f64,
}

/// Computes the grid lines crossing a tile at the given zoom level.
///
/// Vertical lines come first (west to east), then horizontal lines (south
/// to north). Only lines lying within the bounds are returned.
pub fn compute_grid_lines(bounds: &TileBounds, zoom: u8) -> Vec<GridLine> {
    let divisions = GridPrecision::from_zoom(zoom).divisions_per_degree() as f64;

    let mut lines: Vec<GridLine> = multiples_within(bounds.west, bounds.east, divisions)
        .map(|coordinate| GridLine {
            orientation: Orientation::Vertical,
            coordinate,
        })
        .collect();

    lines.extend(
        multiples_within(bounds.south, bounds.north, divisions).map(|coordinate| GridLine {
            orientation: Orientation::Horizontal,
            coordinate,
        }),
    );

    lines
}

/// Multiples of `1 / divisions` in `[min, max]`, ascending.
///
/// Values are produced as `k / divisions` rather than by repeated addition so
/// decimal spacings stay exact (`103 / 10` is exactly the double nearest 10.3).
fn multiples_within(min: f64, max: f64, divisions: f64) -> impl Iterator<Item = f64> {
    let start = (min * divisions).floor() as i64;
    let end = (max * divisions).floor() as i64;

    (start..=end)
        .map(move |k| k as f64 / divisions)
        .filter(move |value| (min..=max).contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinates(lines: &[GridLine], orientation: Orientation) -> Vec<f64> {
        lines
            .iter()
            .filter(|l| l.orientation == orientation)
            .map(|l| l.coordinate)
            .collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn test_precision_breakpoints() {
        assert_eq!(GridPrecision::from_zoom(0).level(), 1);
        assert_eq!(GridPrecision::from_zoom(6).level(), 1);
        assert_eq!(GridPrecision::from_zoom(7).level(), 2);
        assert_eq!(GridPrecision::from_zoom(10).level(), 2);
        assert_eq!(GridPrecision::from_zoom(11).level(), 3);
        assert_eq!(GridPrecision::from_zoom(13).level(), 3);
        assert_eq!(GridPrecision::from_zoom(14).level(), 4);
        assert_eq!(GridPrecision::from_zoom(16).level(), 4);
        assert_eq!(GridPrecision::from_zoom(17).level(), 5);
        assert_eq!(GridPrecision::from_zoom(22).level(), 5);
    }

    #[test]
    fn test_spacing_per_level() {
        assert_eq!(GridPrecision::HundredKilometers.spacing(), 1.0);
        assert_eq!(GridPrecision::TenKilometers.spacing(), 0.1);
        assert_eq!(GridPrecision::OneKilometer.spacing(), 0.01);
        assert_eq!(GridPrecision::HundredMeters.spacing(), 0.001);
        assert_eq!(GridPrecision::TenMeters.spacing(), 0.0001);
    }

    #[test]
    fn test_lines_for_tenth_degree_spacing() {
        let bounds = TileBounds::new(10.0, 20.0, 10.35, 20.25);
        let lines = compute_grid_lines(&bounds, 8);

        assert_close(
            &coordinates(&lines, Orientation::Vertical),
            &[10.0, 10.1, 10.2, 10.3],
        );
        assert_close(
            &coordinates(&lines, Orientation::Horizontal),
            &[20.0, 20.1, 20.2],
        );
    }

    #[test]
    fn test_vertical_lines_precede_horizontal() {
        let bounds = TileBounds::new(10.0, 20.0, 10.35, 20.25);
        let lines = compute_grid_lines(&bounds, 8);
        let first_horizontal = lines
            .iter()
            .position(|l| l.orientation == Orientation::Horizontal)
            .unwrap();
        assert!(lines[..first_horizontal]
            .iter()
            .all(|l| l.orientation == Orientation::Vertical));
        assert!(lines[first_horizontal..]
            .iter()
            .all(|l| l.orientation == Orientation::Horizontal));
    }

    #[test]
    fn test_lines_outside_bounds_are_not_emitted() {
        let bounds = TileBounds::new(10.05, 20.05, 10.15, 20.09);
        let lines = compute_grid_lines(&bounds, 8);
        assert_close(&coordinates(&lines, Orientation::Vertical), &[10.1]);
        assert!(coordinates(&lines, Orientation::Horizontal).is_empty());
    }

    #[test]
    fn test_negative_coordinates() {
        let bounds = TileBounds::new(-2.5, -1.5, -0.5, 0.5);
        let lines = compute_grid_lines(&bounds, 3);
        assert_close(&coordinates(&lines, Orientation::Vertical), &[-2.0, -1.0]);
        assert_close(&coordinates(&lines, Orientation::Horizontal), &[-1.0, 0.0]);
    }

    #[test]
    fn test_lines_are_ascending() {
        let bounds = crate::coord::TileCoord::new(12, 2313, 1582).bounds();
        let lines = compute_grid_lines(&bounds, 12);
        for pair in lines.windows(2) {
            if pair[0].orientation == pair[1].orientation {
                assert!(pair[0].coordinate < pair[1].coordinate);
            }
        }
    }
}
