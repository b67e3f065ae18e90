//! WGS84 to Universal Polar Stereographic projection.
//!
//! UPS covers the polar caps MGRS leaves out of UTM: north of 84°N and
//! south of 80°S. Each cap is split at the prime meridian into two zones,
//! `A`/`B` in the south and `Y`/`Z` in the north.

use super::utm::{FLATTENING, SEMI_MAJOR_AXIS};
use super::GridReferenceError;

/// UPS scale factor at the pole.
const SCALE_FACTOR: f64 = 0.994;
/// False easting and northing; the pole sits at (2000 km, 2000 km).
const FALSE_ORIGIN: f64 = 2_000_000.0;

const SQUARE_SIZE_M: f64 = 100_000.0;

/// Column letters west of the prime meridian (zones A and Y).
const WEST_COLUMNS: &[u8; 12] = b"JKLPQRSTUXYZ";
/// Column letters east of the prime meridian (zones B and Z).
const EAST_COLUMNS: &[u8; 12] = b"ABCFGHJKLPQR";
/// Row letters, I and O omitted.
const ROW_LETTERS: &[u8; 24] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Easting of the first 100 km column west of the meridian.
const WEST_COLUMN_ORIGIN: f64 = 800_000.0;
/// Northing of the first 100 km row in the south and north caps.
const SOUTH_ROW_ORIGIN: f64 = 800_000.0;
const NORTH_ROW_ORIGIN: f64 = 1_300_000.0;

/// A position in the Universal Polar Stereographic system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpsCoord {
    /// Zone letter (A, B, Y or Z)
    pub zone: char,
    pub easting: f64,
    pub northing: f64,
}

impl UpsCoord {
    fn is_north(&self) -> bool {
        matches!(self.zone, 'Y' | 'Z')
    }

    fn is_east(&self) -> bool {
        matches!(self.zone, 'B' | 'Z')
    }
}

/// Projects a WGS84 point onto the polar stereographic plane of its cap.
pub fn to_ups(lat: f64, lon: f64) -> Result<UpsCoord, GridReferenceError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(GridReferenceError::LatitudeOutOfRange(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(GridReferenceError::LongitudeOutOfRange(lon));
    }

    let north = lat >= 0.0;
    let e = (FLATTENING * (2.0 - FLATTENING)).sqrt();

    // Projected as if in the north cap; the south mirrors the northing.
    let phi = lat.abs().to_radians();
    let lambda = lon.to_radians();
    let e_sin = e * phi.sin();
    let t = (std::f64::consts::FRAC_PI_4 - phi / 2.0).tan()
        / ((1.0 - e_sin) / (1.0 + e_sin)).powf(e / 2.0);
    let c = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
    let rho = 2.0 * SEMI_MAJOR_AXIS * SCALE_FACTOR * t / c;

    let easting = FALSE_ORIGIN + rho * lambda.sin();
    let northing = if north {
        FALSE_ORIGIN - rho * lambda.cos()
    } else {
        FALSE_ORIGIN + rho * lambda.cos()
    };

    let zone = match (north, easting >= FALSE_ORIGIN) {
        (false, false) => 'A',
        (false, true) => 'B',
        (true, false) => 'Y',
        (true, true) => 'Z',
    };

    Ok(UpsCoord {
        zone,
        easting,
        northing,
    })
}

/// Formats a UPS position as an MGRS reference, e.g. `ZAH0000000000`.
///
/// Polar references carry no zone number: the zone letter is followed
/// directly by the 100 km square letters and the 1 m offsets.
pub(super) fn format_reference(ups: &UpsCoord) -> String {
    let (column, row) = square_letters(ups);

    let easting = ups.easting.floor() as u64 % SQUARE_SIZE_M as u64;
    let northing = ups.northing.floor() as u64 % SQUARE_SIZE_M as u64;

    format!(
        "{}{}{}{:05}{:05}",
        ups.zone, column, row, easting, northing
    )
}

fn square_letters(ups: &UpsCoord) -> (char, char) {
    let (columns, column_origin) = if ups.is_east() {
        (EAST_COLUMNS, FALSE_ORIGIN)
    } else {
        (WEST_COLUMNS, WEST_COLUMN_ORIGIN)
    };
    let row_origin = if ups.is_north() {
        NORTH_ROW_ORIGIN
    } else {
        SOUTH_ROW_ORIGIN
    };

    let column = square_index(ups.easting - column_origin, columns.len());
    let row = square_index(ups.northing - row_origin, ROW_LETTERS.len());

    (columns[column] as char, ROW_LETTERS[row] as char)
}

fn square_index(offset: f64, len: usize) -> usize {
    ((offset / SQUARE_SIZE_M).floor().max(0.0) as usize).min(len - 1)
}
