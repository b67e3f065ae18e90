//! WGS84 to UTM forward projection.

use super::{band_letter, GridReferenceError};

/// WGS84 semi-major axis in metres.
pub(super) const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// WGS84 flattening.
pub(super) const FLATTENING: f64 = 1.0 / 298.257_223_563;
/// UTM central meridian scale factor.
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

const MIN_UTM_LAT: f64 = -80.0;
const MAX_UTM_LAT: f64 = 84.0;

/// Whether `lat` lies in the UTM part of MGRS. Points outside use UPS.
pub fn in_utm_range(lat: f64) -> bool {
    (MIN_UTM_LAT..=MAX_UTM_LAT).contains(&lat)
}

/// A position in the Universal Transverse Mercator system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmCoord {
    /// Zone number (1-60)
    pub zone: u8,
    /// Latitude band letter (C-X)
    pub band: char,
    /// Easting in metres, including the 500 km false easting
    pub easting: f64,
    /// Northing in metres, including the 10 000 km false northing south of the equator
    pub northing: f64,
}

/// Projects a WGS84 point into UTM.
pub fn to_utm(lat: f64, lon: f64) -> Result<UtmCoord, GridReferenceError> {
    if !in_utm_range(lat) {
        return Err(GridReferenceError::LatitudeOutOfRange(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(GridReferenceError::LongitudeOutOfRange(lon));
    }

    let zone = zone_number(lat, lon);
    let central_meridian = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;

    let e2 = FLATTENING * (2.0 - FLATTENING);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let phi = lat.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = phi.tan();

    let n = SEMI_MAJOR_AXIS / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * (lon - central_meridian).to_radians();

    // Meridional arc
    let m = SEMI_MAJOR_AXIS
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    let easting = SCALE_FACTOR
        * n
        * (a + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0)
        + FALSE_EASTING;

    let mut northing = SCALE_FACTOR
        * (m + n
            * tan_phi
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));

    if lat < 0.0 {
        northing += FALSE_NORTHING_SOUTH;
    }

    Ok(UtmCoord {
        zone,
        band: band_letter(lat),
        easting,
        northing,
    })
}

/// UTM zone number including the Norway and Svalbard exceptions.
fn zone_number(lat: f64, lon: f64) -> u8 {
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }

    if (72.0..=MAX_UTM_LAT).contains(&lat) {
        match lon {
            l if (0.0..9.0).contains(&l) => return 31,
            l if (9.0..21.0).contains(&l) => return 33,
            l if (21.0..33.0).contains(&l) => return 35,
            l if (33.0..42.0).contains(&l) => return 37,
            _ => {}
        }
    }

    (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u8
}
