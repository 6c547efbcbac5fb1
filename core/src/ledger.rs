//! # Permission Ledger
//!
//! Collects the permission of every tagged route, in route order, for the
//! optional `permission.json` dump. Duplicates are kept.

use crate::error::{AppError, AppResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the ledger dump.
pub const LEDGER_FILE: &str = "permission.json";

/// Ordered list of required permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionLedger {
    permissions: Vec<String>,
}

impl PermissionLedger {
    /// Records one permission.
    pub fn push(&mut self, permission: impl Into<String>) {
        self.permissions.push(permission.into());
    }

    /// Permissions in recording order.
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Number of recorded permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Compact JSON array of strings.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Writes `<dir>/permission.json`, creating `dir` as needed.
    /// Returns the written path.
    pub fn write_to_dir(&self, dir: &Path) -> AppResult<PathBuf> {
        let path = dir.join(LEDGER_FILE);
        fs::create_dir_all(dir).map_err(|e| {
            AppError::General(format!("Failed to create dump dir {:?}: {}", dir, e))
        })?;
        fs::write(&path, self.to_json()?)
            .map_err(|e| AppError::General(format!("Failed to write {:?}: {}", path, e)))?;
        Ok(path)
    }
}
