//! Error handling types for celltrack
//!
//! Tracking and shadowing never surface errors to the host: their fallible
//! steps return these errors internally and the public entry points log and
//! swallow them. Configuration loading and the replay binary propagate them.

use thiserror::Error;

/// Comprehensive error type for cell tracking operations
#[derive(Debug, Error)]
pub enum CellTrackError {
    /// The file is not open in the document mirror
    #[error("Document not open: {file}")]
    DocumentNotFound { file: String },

    /// No committed fragment or free-input zone with this id
    #[error("Unknown cell id: {id}")]
    UnknownCell { id: String },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A cell marker pattern failed to compile
    #[error("Invalid cell marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// TOML configuration could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON input could not be parsed
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A replayed event could not be decoded
    #[error("Invalid event on line {line}: {message}")]
    Replay { line: usize, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cell tracking operations
pub type CellTrackResult<T> = Result<T, CellTrackError>;

/// Helper functions for common error patterns
impl CellTrackError {
    /// Create a document not found error
    pub fn document_not_found(file: impl Into<String>) -> Self {
        CellTrackError::DocumentNotFound { file: file.into() }
    }

    /// Create an unknown cell error
    pub fn unknown_cell(id: impl Into<String>) -> Self {
        CellTrackError::UnknownCell { id: id.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        CellTrackError::Config {
            message: message.into(),
        }
    }

    /// Create a replay error for the given 1-based input line
    pub fn replay(line: usize, message: impl Into<String>) -> Self {
        CellTrackError::Replay {
            line,
            message: message.into(),
        }
    }
}
