//! Error types for cellstore
//!
//! Provides a unified error type for all operations.
//!
//! Callers tell "the cell was never written" apart from real failures by
//! matching on [`CellStoreError::CellNotFound`] (or calling
//! [`CellStoreError::is_not_found`]), never by inspecting the message.

use thiserror::Error;

/// Result type alias using CellStoreError
pub type Result<T> = std::result::Result<T, CellStoreError>;

/// Boxed error returned from a visitor callback
pub type VisitorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for cellstore operations
#[derive(Debug, Error)]
pub enum CellStoreError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    /// The key has no primary record. Expected and recoverable.
    #[error("Cell {key:?} not found. {reason}")]
    CellNotFound { key: String, reason: String },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("Index {index} exceeds the key field width (max {max})", max = crate::key::MAX_INDEX)]
    KeyOverflow { index: usize },

    #[error("Malformed cell key: {0:?}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Document Errors
    // -------------------------------------------------------------------------
    #[error("Invalid sheet name {name:?}: {reason}")]
    InvalidSheetName { name: String, reason: String },

    /// A cell was handed to a sheet it does not belong to
    #[error("Cell {key:?} belongs to sheet {actual:?}, not {expected:?}")]
    WrongSheet {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Cell {key:?} holds an incompatible value: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Data validation error: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Visitor Errors
    // -------------------------------------------------------------------------
    /// Returned by a visitor to stop an enumeration early
    #[error(transparent)]
    Visitor(VisitorError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CellStoreError {
    /// Build a CellNotFound error for `key`
    pub fn not_found(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CellNotFound {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an arbitrary error returned from a visitor callback
    pub fn visitor<E>(err: E) -> Self
    where
        E: Into<VisitorError>,
    {
        Self::Visitor(err.into())
    }

    /// True if this is the distinguished "never written" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CellNotFound { .. })
    }
}

impl From<bincode::Error> for CellStoreError {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(io) => Self::Io(io),
            other => Self::Serialization(other.to_string()),
        }
    }
}
