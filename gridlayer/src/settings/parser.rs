//! INI parsing logic for converting `Ini` → `Settings`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::{Settings, SettingsError, MAX_WORKERS};

/// Parse an `Ini` object into `Settings`.
///
/// Starts from `Settings::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("workers") {
            settings.download.workers = v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_WORKERS).contains(n))
                .ok_or_else(|| {
                    let reason = format!("must be an integer between 1 and {}", MAX_WORKERS);
                    invalid("download", "workers", v, &reason)
                })?;
        }
        if let Some(v) = section.get("timeout") {
            settings.download.timeout = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|t| *t > 0)
                .ok_or_else(|| {
                    invalid("download", "timeout", v, "must be a positive integer (seconds)")
                })?;
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if !v.is_empty() {
                settings.download.user_agent = v.to_string();
            }
        }
    }

    // [render] section
    if let Some(section) = ini.section(Some("render")) {
        if let Some(v) = section.get("font") {
            let v = v.trim();
            if !v.is_empty() {
                settings.render.font = Some(expand_tilde(v));
            }
        }
        if let Some(v) = section.get("font_size") {
            settings.render.font_size = v
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|s| s.is_finite() && *s > 0.0)
                .ok_or_else(|| invalid("render", "font_size", v, "must be a positive number"))?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                settings.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() || v.contains(['/', '\\']) {
                return Err(invalid("logging", "file", v, "must be a plain file name"));
            }
            settings.logging.file = v.to_string();
        }
    }

    Ok(settings)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
