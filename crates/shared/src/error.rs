use thiserror::Error;

use crate::domain::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme value {0:?}; expected \"dark\" or \"light\"")]
pub struct ParseThemeError(pub String);

/// A card whose text content could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemReadError {
    #[error("item {item} has no name element")]
    MissingName { item: ItemId },
    #[error("item {item} has malformed content: {reason}")]
    Malformed { item: ItemId, reason: String },
}

/// Failure touching a presentational surface (theme marker, search field).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{surface} unavailable: {message}")]
pub struct SurfaceError {
    pub surface: &'static str,
    pub message: String,
}

impl SurfaceError {
    pub fn new(surface: &'static str, message: impl Into<String>) -> Self {
        Self {
            surface,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid catalog {path}: {message}")]
    Parse { path: String, message: String },
    #[error("catalog entry {index} has an empty name")]
    EmptyName { index: usize },
}
