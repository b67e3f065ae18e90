//! Application settings.
//!
//! Optional INI file tuning the download client, label rendering and log
//! output. A missing file yields the defaults; any key may be omitted.
//!
//! ```ini
//! [download]
//! workers = 8
//! timeout = 30
//! user_agent = Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36
//!
//! [render]
//! font = ~/fonts/DejaVuSans.ttf
//! font_size = 14
//!
//! [logging]
//! directory = logs
//! file = gridlayer.log
//! ```

mod parser;

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::composite::DEFAULT_FONT_SIZE;
use crate::fetch::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Default number of concurrent tile workers.
pub const DEFAULT_WORKERS: usize = 4;
/// Upper bound on worker threads.
pub const MAX_WORKERS: usize = 64;
/// Default log directory, relative to the working directory.
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "gridlayer.log";

/// Settings file errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid settings value
    #[error("Invalid setting: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    pub workers: usize,
    /// Per-request timeout in seconds
    pub timeout: u64,
    pub user_agent: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Font file tried before the platform fonts
    pub font: Option<PathBuf>,
    pub font_size: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// All application settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub download: DownloadSettings,
    pub render: RenderSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads settings from `path`, returning defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parser::parse_ini(&ini)
    }

    /// Parses settings from INI text.
    pub fn from_ini_str(contents: &str) -> Result<Self, SettingsError> {
        let ini = Ini::load_from_str(contents).map_err(ini::Error::Parse)?;
        parser::parse_ini(&ini)
    }
}
