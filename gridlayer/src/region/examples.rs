//! Example region files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::{ConfigError, RegionFile};

const WORLD_IMAGERY: &str =
    "https://services.arcgisonline.com/arcgis/rest/services/World_Imagery/MapServer";

/// The bundled example regions: the world, Greece and Attiki.
pub fn example_regions() -> Vec<RegionFile> {
    let region = |name: &str, south, west, north, east, zoom_min, zoom_max, output: &str| RegionFile {
        map_url: WORLD_IMAGERY.to_string(),
        name: name.to_string(),
        lat_min: south,
        long_min: west,
        lat_max: north,
        long_max: east,
        zoom_min,
        zoom_max,
        output_file: output.to_string(),
    };

    vec![
        region("World", -85.0511, -180.0, 85.0511, 180.0, 0, 6, "world_with_mgrs_zones.mbtiles"),
        region("Greece", 34.8, 19.3, 41.7, 29.6, 7, 13, "greece_with_mgrs_zones.mbtiles"),
        region("Attiki", 37.7, 23.3, 38.3, 24.1, 14, 18, "attiki_with_mgrs_zones.mbtiles"),
    ]
}

/// Writes `config_example_1.json` … `config_example_3.json` into `dir`.
///
/// Existing files are overwritten. Returns the written paths in order.
pub fn write_example_configs(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut written = Vec::new();

    for (i, example) in example_regions().iter().enumerate() {
        let path = dir.join(format!("config_example_{}.json", i + 1));
        let json = to_json(example).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        std::fs::write(&path, json).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), region = %example.name, "Created example configuration");
        written.push(path);
    }

    Ok(written)
}

/// Pretty-prints with four-space indentation.
fn to_json(region: &RegionFile) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    region.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
