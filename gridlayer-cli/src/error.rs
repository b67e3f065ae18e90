//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use gridlayer::fetch::FetchError;
use gridlayer::region::ConfigError;
use gridlayer::settings::SettingsError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Settings file could not be read or held an invalid value
    Settings(SettingsError),
    /// Failed to build the HTTP client
    HttpClient(FetchError),
    /// Failed to build the worker pool
    WorkerPool(String),
    /// Failed to write the example region files
    Examples(ConfigError),
    /// No region files were given on the command line
    NoConfigs,
    /// None of the given region files could be loaded
    NoRegions { attempted: usize },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::NoConfigs => {
                eprintln!();
                eprintln!("Create example region files with: gridlayer --create-examples");
            }
            CliError::Settings(SettingsError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the settings file or remove the key to use its default.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Settings(e) => write!(f, "Settings error: {}", e),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::WorkerPool(msg) => write!(f, "Failed to start worker pool: {}", msg),
            CliError::Examples(e) => write!(f, "Failed to create example configs: {}", e),
            CliError::NoConfigs => write!(f, "No configuration files specified"),
            CliError::NoRegions { attempted } => {
                write!(f, "None of the {} configuration file(s) could be loaded", attempted)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Settings(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Examples(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(e: SettingsError) -> Self {
        CliError::Settings(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::HttpClient(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Examples(e)
    }
}

