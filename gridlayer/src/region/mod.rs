//! Region configuration.
//!
//! A region is described by a small JSON file naming the tile service, the
//! geographic box, the zoom range and the output archive:
//!
//! ```json
//! {
//!     "MAP_URL": "https://services.arcgisonline.com/arcgis/rest/services/World_Imagery/MapServer",
//!     "name": "Greece",
//!     "lat_min": 34.8,
//!     "long_min": 19.3,
//!     "lat_max": 41.7,
//!     "long_max": 29.6,
//!     "zoom_min": 7,
//!     "zoom_max": 13,
//!     "output_file": "greece_with_mgrs_zones.mbtiles"
//! }
//! ```
//!
//! Coordinates may also be written as numeric strings (`"19.3"`). Zoom
//! levels may be integers, integral floats (`7.0`) or integer strings.

mod examples;

pub use examples::{example_regions, write_example_configs};

use std::path::{Path, PathBuf};

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::coord::{TileBounds, MAX_ZOOM};

/// Errors from loading or writing region configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON, a missing field or a field of the wrong type
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid longitude bounds in {path}: long_min ({west}) must be < long_max ({east})")]
    LongitudeBounds { path: PathBuf, west: f64, east: f64 },

    #[error("invalid latitude bounds in {path}: lat_min ({south}) must be < lat_max ({north})")]
    LatitudeBounds { path: PathBuf, south: f64, north: f64 },

    #[error("invalid zoom levels in {path}: {reason}")]
    ZoomRange { path: PathBuf, reason: String },
}

/// On-disk representation of a region file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFile {
    #[serde(rename = "MAP_URL")]
    pub map_url: String,
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat_min: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub long_min: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat_max: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub long_max: f64,
    #[serde(deserialize_with = "lenient_zoom")]
    pub zoom_min: i64,
    #[serde(deserialize_with = "lenient_zoom")]
    pub zoom_max: i64,
    pub output_file: String,
}

/// A JSON number or a string holding one.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Numeric::deserialize(deserializer)? {
        Numeric::Number(n) => Ok(n),
        Numeric::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(&text), &"a number")),
    }
}

fn lenient_zoom<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Numeric::deserialize(deserializer)? {
        Numeric::Number(n) if n.fract() == 0.0 => Ok(n as i64),
        Numeric::Number(n) => Err(de::Error::invalid_value(
            Unexpected::Float(n),
            &"an integer zoom level",
        )),
        Numeric::Text(text) => text.trim().parse().map_err(|_| {
            de::Error::invalid_value(Unexpected::Str(&text), &"an integer zoom level")
        }),
    }
}

/// A validated region to render.
///
/// Only constructed through [`Region::load`] or [`Region::from_json`], which
/// guarantee `west < east`, `south < north` and `0 <= zoom_min <= zoom_max <= 22`.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Tile service base URL, without a trailing slash
    pub service_url: String,
    pub name: String,
    pub bounds: TileBounds,
    pub zoom_min: u8,
    pub zoom_max: u8,
    pub output_path: PathBuf,
}

impl Region {
    /// Loads and validates a region file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents, path)
    }

    /// Parses and validates region JSON. `origin` is only used in errors.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: RegionFile = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::from_file(file, origin)
    }

    fn from_file(file: RegionFile, origin: &Path) -> Result<Self, ConfigError> {
        let path = origin.to_path_buf();

        if file.long_min >= file.long_max {
            return Err(ConfigError::LongitudeBounds {
                path,
                west: file.long_min,
                east: file.long_max,
            });
        }
        if file.lat_min >= file.lat_max {
            return Err(ConfigError::LatitudeBounds {
                path,
                south: file.lat_min,
                north: file.lat_max,
            });
        }
        if file.zoom_min > file.zoom_max {
            return Err(ConfigError::ZoomRange {
                path,
                reason: format!(
                    "zoom_min ({}) must be <= zoom_max ({})",
                    file.zoom_min, file.zoom_max
                ),
            });
        }
        if file.zoom_min < 0 || file.zoom_max > MAX_ZOOM as i64 {
            return Err(ConfigError::ZoomRange {
                path,
                reason: format!("must be between 0 and {}", MAX_ZOOM),
            });
        }

        Ok(Region {
            service_url: file.map_url.trim_end_matches('/').to_string(),
            name: file.name,
            bounds: TileBounds::new(file.long_min, file.lat_min, file.long_max, file.lat_max),
            zoom_min: file.zoom_min as u8,
            zoom_max: file.zoom_max as u8,
            output_path: PathBuf::from(file.output_file),
        })
    }

    /// Zoom levels in ascending order.
    pub fn zoom_levels(&self) -> impl Iterator<Item = u8> {
        self.zoom_min..=self.zoom_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const GREECE: &str = r#"{
        "MAP_URL": "https://example.com/arcgis/rest/services/World_Imagery/MapServer/",
        "name": "Greece",
        "lat_min": 34.8,
        "long_min": 19.3,
        "lat_max": 41.7,
        "long_max": 29.6,
        "zoom_min": 7,
        "zoom_max": 13,
        "output_file": "out/greece.mbtiles"
    }"#;

    fn parse(json: &str) -> Result<Region, ConfigError> {
        Region::from_json(json, Path::new("test.json"))
    }

    fn with_field(field: &str, value: serde_json::Value) -> String {
        let mut json: serde_json::Value = serde_json::from_str(GREECE).unwrap();
        json[field] = value;
        json.to_string()
    }

    #[test]
    fn test_parse_valid_region() {
        let region = parse(GREECE).unwrap();

        assert_eq!(
            region.service_url,
            "https://example.com/arcgis/rest/services/World_Imagery/MapServer"
        );
        assert_eq!(region.name, "Greece");
        assert_eq!(region.bounds, TileBounds::new(19.3, 34.8, 29.6, 41.7));
        assert_eq!((region.zoom_min, region.zoom_max), (7, 13));
        assert_eq!(region.output_path, PathBuf::from("out/greece.mbtiles"));
        assert_eq!(region.zoom_levels().collect::<Vec<_>>(), (7..=13).collect::<Vec<_>>());
    }

    #[test]
    fn test_integer_coordinates_accepted() {
        let region = parse(&with_field("long_min", serde_json::json!(19))).unwrap();
        assert_eq!(region.bounds.west, 19.0);
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("greece.json");
        fs::write(&path, GREECE).unwrap();

        assert_eq!(Region::load(&path).unwrap().name, "Greece");
    }

    #[test]
    fn test_missing_file() {
        let result = Region::load(Path::new("/nonexistent/region.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse("{ not json"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_field() {
        let mut json: serde_json::Value = serde_json::from_str(GREECE).unwrap();
        json.as_object_mut().unwrap().remove("zoom_max");

        let err = parse(&json.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("zoom_max"));
    }

    #[test]
    fn test_wrong_type() {
        let result = parse(&with_field("lat_min", serde_json::json!("north")));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_inverted_longitude() {
        let result = parse(&with_field("long_min", serde_json::json!(30.0)));
        assert!(matches!(result, Err(ConfigError::LongitudeBounds { .. })));
    }

    #[test]
    fn test_equal_latitudes_rejected() {
        let result = parse(&with_field("lat_min", serde_json::json!(41.7)));
        assert!(matches!(result, Err(ConfigError::LatitudeBounds { .. })));
    }

    #[test]
    fn test_inverted_zoom_range() {
        let result = parse(&with_field("zoom_min", serde_json::json!(14)));
        assert!(matches!(result, Err(ConfigError::ZoomRange { .. })));
    }

    #[test]
    fn test_zoom_out_of_range() {
        let result = parse(&with_field("zoom_max", serde_json::json!(23)));
        assert!(matches!(result, Err(ConfigError::ZoomRange { .. })));

        let result = parse(&with_field("zoom_min", serde_json::json!(-1)));
        assert!(matches!(result, Err(ConfigError::ZoomRange { .. })));
    }

    #[test]
    fn test_single_zoom_level() {
        let json = with_field("zoom_min", serde_json::json!(13));
        let region = parse(&json).unwrap();
        assert_eq!(region.zoom_levels().count(), 1);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let json = with_field("lat_min", serde_json::json!("34.8"));
        let json = {
            let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
            value["zoom_max"] = serde_json::json!("13");
            value.to_string()
        };

        let region = parse(&json).unwrap();
        assert_eq!(region.bounds.south, 34.8);
        assert_eq!(region.zoom_max, 13);
    }

    #[test]
    fn test_integral_float_zoom_accepted() {
        let region = parse(&with_field("zoom_min", serde_json::json!(7.0))).unwrap();
        assert_eq!(region.zoom_min, 7);
    }

    #[test]
    fn test_fractional_zoom_rejected() {
        let result = parse(&with_field("zoom_min", serde_json::json!(7.5)));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        let result = parse(&with_field("zoom_min", serde_json::json!("7.0")));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
