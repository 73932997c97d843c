//! Custom error types for papercite.
//!
//! This module defines all error types used throughout the application.
//! All functions return `Result<T, CiteError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for papercite operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum CiteError {
    /// Generation response did not split into the expected number of fields
    #[error("Shape mismatch: expected {expected} fields, got {got}")]
    ShapeMismatch {
        /// Number of fields the prompt asked for
        expected: usize,
        /// Number of fields the response actually split into
        got: usize,
    },

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code from the API
        code: i32,
        /// Error message from the API
        message: String,
    },

    /// Spreadsheet serialization error
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `CiteError`
pub type Result<T> = std::result::Result<T, CiteError>;
