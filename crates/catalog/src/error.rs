//! Error types for the catalog crate.
//!
//! Everything that can go wrong while loading, parsing or validating
//! ingredient and question data ends up in [`CatalogError`].

use thiserror::Error;

/// Errors that can occur while loading or validating catalog data
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A JSON document could not be decoded
    #[error("JSON error in {source_name}: {reason}")]
    JsonError { source_name: String, reason: String },

    /// A field held a value outside its allowed range
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two ingredients share the same name
    #[error("Duplicate ingredient: {name}")]
    DuplicateIngredient { name: String },

    /// A free-text taste description could not be parsed
    ///
    /// Carries the offending fragment, e.g. `"0.4 salty"`
    #[error("Cannot parse taste fragment '{fragment}': {reason}")]
    ParseTaste { fragment: String, reason: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
