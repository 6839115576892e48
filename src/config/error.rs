use thiserror::Error;

use crate::models::TimeWindowError;

/// Errors raised while loading or validating the application configuration.
///
/// Any of these is fatal at startup.
#[derive(Debug, Error)]
pub enum AppConfigError {
    /// The configuration sources could not be read or deserialized.
    #[error("Config error: {0}")]
    Load(#[from] config::ConfigError),

    /// A required value is empty or absent.
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    /// A date or time does not match `YYYY-MM-DD` / `HH:MM`.
    #[error("Invalid date/time format in configuration: {0}")]
    InvalidDateTime(String),

    /// The timezone is not a known IANA zone name.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The local time falls into a DST gap of the configured zone.
    #[error("Local time '{local}' does not exist in timezone {timezone}")]
    NonexistentLocalTime {
        /// The offending local date and time.
        local: String,
        /// The configured zone.
        timezone: String,
    },

    /// The campaign window is empty or reversed.
    #[error("Invalid campaign window: {0}")]
    Window(#[from] TimeWindowError),

    /// The shop base URL override is malformed.
    #[error("Invalid shop base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// A refresh interval is zero.
    #[error("Refresh interval for '{0}' must be greater than zero")]
    ZeroInterval(&'static str),
}
