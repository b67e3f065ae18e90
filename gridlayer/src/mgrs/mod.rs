//! Military Grid Reference System conversion.
//!
//! Converts WGS84 latitude/longitude into MGRS grid references such as
//! `31NAA6602100000`: a two-digit UTM zone, a latitude band letter, a two
//! letter 100 km square identifier, then five-digit easting and northing
//! offsets within the square.
//!
//! Between 80°S and 84°N positions go through UTM. The polar caps use UPS
//! and have no zone number: the reference starts with the zone letter, as in
//! `ZAH0000000000` at the North Pole.
//!
//! # Example
//!
//! ```
//! use gridlayer::mgrs::{GridReferenceConverter, MgrsConverter};
//!
//! let reference = MgrsConverter.to_grid_reference(0.0, 0.0).unwrap();
//! assert_eq!(&reference[..5], "31NAA");
//! ```

mod ups;
mod utm;

pub use ups::{to_ups, UpsCoord};
pub use utm::{in_utm_range, to_utm, UtmCoord};

use thiserror::Error;

/// Latitude band letters from 80°S to 84°N in 8° steps (X spans 12°).
const BAND_LETTERS: &[u8; 20] = b"CDEFGHJKLMNPQRSTUVWX";

/// Column letter sets for the 100 km square, selected by `zone % 3`.
const COLUMN_SETS: [&[u8; 8]; 3] = [b"STUVWXYZ", b"ABCDEFGH", b"JKLMNPQR"];

/// Row letters for the 100 km square; even zones start five letters in.
const ROW_LETTERS: &[u8; 20] = b"ABCDEFGHJKLMNPQRSTUV";

const SQUARE_SIZE_M: f64 = 100_000.0;

/// Number of leading characters that identify a grid zone plus 100 km square.
pub const ZONE_IDENTIFIER_LEN: usize = 5;

/// Errors from grid reference conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridReferenceError {
    /// Latitude is outside -90 to 90, or outside -80 to 84 when a UTM
    /// projection was requested directly
    #[error("latitude {0} is out of range")]
    LatitudeOutOfRange(f64),

    /// Longitude is outside -180 to 180
    #[error("longitude {0} is outside -180 to 180")]
    LongitudeOutOfRange(f64),
}

/// Converts geographic coordinates into a grid reference string.
///
/// Implementations must be thread-safe: one converter is shared by every
/// compositing worker.
pub trait GridReferenceConverter: Send + Sync {
    /// Returns the grid reference for the point.
    fn to_grid_reference(&self, lat: f64, lon: f64) -> Result<String, GridReferenceError>;

    /// Returns the zone identifier (zone, band and 100 km square) for the point.
    fn zone_identifier(&self, lat: f64, lon: f64) -> Result<String, GridReferenceError> {
        let reference = self.to_grid_reference(lat, lon)?;
        Ok(reference.chars().take(ZONE_IDENTIFIER_LEN).collect())
    }
}

/// MGRS converter on the WGS84 ellipsoid at 1 m precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct MgrsConverter;

impl GridReferenceConverter for MgrsConverter {
    fn to_grid_reference(&self, lat: f64, lon: f64) -> Result<String, GridReferenceError> {
        if in_utm_range(lat) {
            Ok(format_reference(&to_utm(lat, lon)?))
        } else {
            Ok(ups::format_reference(&to_ups(lat, lon)?))
        }
    }
}

/// Latitude band letter for a latitude already known to be in range.
pub(crate) fn band_letter(lat: f64) -> char {
    let index = ((lat + 80.0) / 8.0).floor().clamp(0.0, 19.0) as usize;
    BAND_LETTERS[index] as char
}

fn format_reference(utm: &UtmCoord) -> String {
    let (column, row) = square_letters(utm.zone, utm.easting, utm.northing);

    let easting = utm.easting.floor() as u64 % SQUARE_SIZE_M as u64;
    let northing = utm.northing.floor() as u64 % SQUARE_SIZE_M as u64;

    format!(
        "{:02}{}{}{}{:05}{:05}",
        utm.zone, utm.band, column, row, easting, northing
    )
}

/// 100 km square identifier letters for a UTM position.
fn square_letters(zone: u8, easting: f64, northing: f64) -> (char, char) {
    let columns = COLUMN_SETS[(zone % 3) as usize];
    let column_index = ((easting / SQUARE_SIZE_M).floor() as i64 - 1).clamp(0, 7) as usize;

    let offset = if zone % 2 == 0 { 5 } else { 0 };
    let row_index = ((northing / SQUARE_SIZE_M).floor() as u64 + offset) % 20;

    (
        columns[column_index] as char,
        ROW_LETTERS[row_index as usize] as char,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(lat: f64, lon: f64) -> String {
        MgrsConverter.zone_identifier(lat, lon).unwrap()
    }

    #[test]
    fn test_origin_reference() {
        let reference = MgrsConverter.to_grid_reference(0.0, 0.0).unwrap();
        assert_eq!(reference, "31NAA6602100000");
    }

    #[test]
    fn test_reference_length_is_fifteen() {
        let reference = MgrsConverter.to_grid_reference(37.9838, 23.7275).unwrap();
        assert_eq!(reference.len(), 15);
        assert!(reference[5..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_zone_identifier_is_first_five_characters() {
        let reference = MgrsConverter.to_grid_reference(51.5074, -0.1278).unwrap();
        let zone = MgrsConverter.zone_identifier(51.5074, -0.1278).unwrap();
        assert_eq!(zone, &reference[..5]);
        assert!(zone.starts_with("30U"));
    }

    #[test]
    fn test_southern_hemisphere_square() {
        // Sydney
        assert_eq!(prefix(-33.8688, 151.2093), "56HLH");
    }

    #[test]
    fn test_single_digit_zone_is_zero_padded() {
        let zone = prefix(10.0, -177.0);
        assert!(zone.starts_with("01P"), "got {}", zone);
    }

    #[test]
    fn test_norway_exception() {
        assert!(prefix(60.0, 5.0).starts_with("32V"));
        assert!(prefix(60.0, 2.0).starts_with("31V"));
    }

    #[test]
    fn test_svalbard_exceptions() {
        assert!(prefix(78.0, 5.0).starts_with("31X"));
        assert!(prefix(78.0, 15.0).starts_with("33X"));
        assert!(prefix(78.0, 25.0).starts_with("35X"));
        assert!(prefix(78.0, 40.0).starts_with("37X"));
    }

    #[test]
    fn test_band_letters() {
        assert_eq!(band_letter(-80.0), 'C');
        assert_eq!(band_letter(0.0), 'N');
        assert_eq!(band_letter(-0.5), 'M');
        assert_eq!(band_letter(80.0), 'X');
        assert_eq!(band_letter(84.0), 'X');
    }

    #[test]
    fn test_polar_latitudes_use_ups() {
        assert_eq!(
            MgrsConverter.to_grid_reference(90.0, 0.0).unwrap(),
            "ZAH0000000000"
        );
        assert_eq!(
            MgrsConverter.to_grid_reference(-90.0, 0.0).unwrap(),
            "BAN0000000000"
        );
        assert!(prefix(85.0, 0.0).starts_with("ZAB"));
        assert!(prefix(-80.5, -1.0).starts_with('A'));
    }

    #[test]
    fn test_utm_band_edges_stay_in_utm() {
        assert!(prefix(84.0, 10.0).starts_with("33X"));
        assert!(prefix(-80.0, 10.0).starts_with("32C"));
    }

    #[test]
    fn test_latitude_beyond_pole_is_rejected() {
        assert!(matches!(
            MgrsConverter.to_grid_reference(90.5, 0.0),
            Err(GridReferenceError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_invalid_longitude_is_rejected() {
        assert!(matches!(
            MgrsConverter.to_grid_reference(0.0, 200.0),
            Err(GridReferenceError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(MgrsConverter.to_grid_reference(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_adjacent_zones_differ() {
        // Either side of the 6°E zone boundary
        assert!(prefix(45.0, 5.99).starts_with("31T"));
        assert!(prefix(45.0, 6.01).starts_with("32T"));
    }
}
