#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use permission_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Failure reported by the core library.
    #[display("{}", _0)]
    Core(AppError),

    /// Invalid flag combination or value.
    #[from(ignore)]
    #[display("Invalid configuration: {}", _0)]
    Config(String),
}

/// Manual implementation of the standard Error trait.
///
/// We implement this manually (instead of `derive(Error)`) because the `Config(String)`
/// variant contains a `String`, which does not implement `std::error::Error`.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
