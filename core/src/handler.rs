//! # Handler Paths
//!
//! Maps a route to the handler file goctl generated for it.

use crate::api::{Group, Route};
use std::path::{Path, PathBuf};

/// Handler name without the `handler`/`Handler` suffix.
pub fn handler_base_name(route: &Route) -> &str {
    let handler = route.handler.trim();
    let handler = handler.strip_suffix("handler").unwrap_or(handler);
    handler.strip_suffix("Handler").unwrap_or(handler)
}

/// Lower-cased handler file name, e.g. `createUser` -> `createuserhandler.go`.
pub fn handler_file_name(route: &Route) -> String {
    format!("{}Handler.go", handler_base_name(route)).to_lowercase()
}

/// `<dir>/<handler_dir>/<group folder>/<handler file>`.
pub fn handler_file_path(dir: &Path, handler_dir: &Path, group: &Group, route: &Route) -> PathBuf {
    dir.join(handler_dir)
        .join(group.folder())
        .join(handler_file_name(route))
}
