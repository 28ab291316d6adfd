//! Error types
//!
//! Configuration parsing and browser platform setup are the only fallible
//! parts of the crate. Puzzle rejections are regular gate events, not errors.

use std::fmt;

/// Errors raised while reading site configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration text was not valid JSON for the expected shape.
    Json(serde_json::Error),
    /// A color string was not `#rrggbb`.
    InvalidColor(String),
    /// A numeric setting was outside its allowed range.
    OutOfRange { field: &'static str, value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Invalid site configuration: {}", e),
            ConfigError::InvalidColor(s) => write!(f, "Invalid color '{}', expected #rrggbb", s),
            ConfigError::OutOfRange { field, value } => {
                write!(f, "Setting '{}' out of range: {}", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors raised while attaching to the browser page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// No `window` / `document` (not running in a browser page).
    NoWindow,
    /// A required element id is missing from the page.
    MissingElement(String),
    /// The element exists but is not the expected type.
    WrongElementType(String),
    /// The canvas refused a 2D context.
    NoContext2d,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::NoWindow => write!(f, "No browser window available"),
            PlatformError::MissingElement(id) => write!(f, "Element #{} not found", id),
            PlatformError::WrongElementType(id) => {
                write!(f, "Element #{} has an unexpected type", id)
            }
            PlatformError::NoContext2d => write!(f, "Canvas 2D context unavailable"),
        }
    }
}

impl std::error::Error for PlatformError {}
