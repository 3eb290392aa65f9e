//! Error types for the catalog crate.

use crate::types::MovieId;
use thiserror::Error;

/// Errors that can occur while loading or mutating the catalog store
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Seed file could not be read
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Seed file is not valid JSON or has the wrong shape
    #[error("Malformed seed data: {0}")]
    MalformedSeed(#[from] serde_json::Error),

    /// Inserting a movie whose id is already present
    #[error("Duplicate movie id {id}")]
    DuplicateMovie { id: MovieId },

    /// Rating submitted for a movie that does not exist
    #[error("Unknown movie id {id}")]
    UnknownMovie { id: MovieId },

    /// Rating value outside the 0-5 scale
    #[error("Rating value {value} outside the 0-5 scale")]
    InvalidRating { value: f32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
