//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Malformed Go source (or malformed import text).
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// The anchor block was not found in the target file.
    #[from(ignore)]
    #[display("pattern not found in file")]
    PatternNotFound,

    /// Invalid or unreadable permission template.
    #[from(ignore)]
    #[display("Template Error: {_0}")]
    Template(String),

    /// JSON (de)serialization failure.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// YAML deserialization failure.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl AppError {
    /// Whether this error means the target source could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, AppError::Parse(_))
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
