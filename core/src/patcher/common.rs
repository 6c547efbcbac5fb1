use crate::error::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Reads a target source file, attaching the path to any IO failure.
pub(crate) fn read_source(path: &Path) -> AppResult<String> {
    fs::read_to_string(path)
        .map_err(|e| AppError::General(format!("Failed to read file {:?}: {}", path, e)))
}

/// Rewrites a target source file in place.
pub(crate) fn write_source(path: &Path, content: &str) -> AppResult<()> {
    fs::write(path, content)
        .map_err(|e| AppError::General(format!("Failed to write file {:?}: {}", path, e)))
}
