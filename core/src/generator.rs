#![deny(missing_docs)]

//! # Permission Generator
//!
//! Drives the per-route pipeline:
//!
//! 1. Ensure the utils, types and additional imports in the handler file.
//! 2. Remove any previously generated sentinel block.
//! 3. Append the freshly rendered block after the request-parsing anchor.
//! 4. Record the permission in the ledger, whatever happened to the file.
//!
//! Failures never stop the run. Each route ends with a [`RouteStatus`]
//! collected into a [`RunReport`].

use crate::api::Service;
use crate::error::AppResult;
use crate::handler::handler_file_path;
use crate::ledger::PermissionLedger;
use crate::patcher::{
    add_import_to_file, append_after_in_file, remove_between_in_file, AnchorFinder,
    ImportEntry, RegexAnchor,
};
use crate::template::{sentinel_patterns, PermissionTemplate};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Runtime helper package imported by every patched handler.
pub const DEFAULT_UTILS_IMPORT: &str = "github.com/sunbankio/permission/utils";

/// Alias of the utils import.
pub const UTILS_ALIAS: &str = "utils";

/// Alias of the types (context keys) import.
pub const TYPES_ALIAS: &str = "contextkey";

/// Immutable settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Plugin working directory; other paths are relative to it.
    pub dir: PathBuf,
    /// Directory of the generated handlers.
    pub handler_dir: PathBuf,
    /// Utils import (aliased `utils`).
    pub utils_import: ImportEntry,
    /// Types import holding the context keys (aliased `contextkey`).
    pub types_import: ImportEntry,
    /// Extra imports the template needs.
    pub additional_imports: Vec<ImportEntry>,
    /// Where `permission.json` goes, if requested.
    pub dump_dir: Option<PathBuf>,
    /// Collect permissions without touching any handler.
    pub dump_only: bool,
}

impl GeneratorConfig {
    /// Config with the default utils import and no extras.
    pub fn new(
        dir: impl Into<PathBuf>,
        handler_dir: impl Into<PathBuf>,
        types_path: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            handler_dir: handler_dir.into(),
            utils_import: ImportEntry::aliased(UTILS_ALIAS, DEFAULT_UTILS_IMPORT),
            types_import: ImportEntry::aliased(TYPES_ALIAS, types_path),
            additional_imports: Vec::new(),
            dump_dir: None,
            dump_only: false,
        }
    }

    /// All imports in the order they are applied.
    pub fn imports(&self) -> impl Iterator<Item = &ImportEntry> {
        [&self.utils_import, &self.types_import]
            .into_iter()
            .chain(self.additional_imports.iter())
    }

    /// Resolved dump directory.
    pub fn dump_path(&self) -> Option<PathBuf> {
        self.dump_dir.as_ref().map(|d| self.dir.join(d))
    }
}

/// What happened to one route's handler file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteStatus {
    /// Imports ensured and block injected.
    Patched,
    /// Block injected, but some import or cleanup step failed.
    Partial {
        /// Messages of the failed steps.
        errors: Vec<String>,
    },
    /// The block was not injected.
    Failed {
        /// Why the file could not be patched.
        reason: String,
    },
    /// Dump-only run, file not touched.
    Skipped,
}

/// Result of processing one permission-tagged route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Handler folder of the route's group.
    pub group: String,
    /// Handler name from the API file.
    pub handler: String,
    /// Route path with the group prefix joined.
    pub path: String,
    /// Required permission.
    pub permission: String,
    /// Target handler file.
    pub file: PathBuf,
    /// Outcome of the file mutation.
    pub status: RouteStatus,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// One entry per permission-tagged route, in order.
    pub outcomes: Vec<RouteOutcome>,
    /// The collected permissions.
    pub ledger: PermissionLedger,
}

impl RunReport {
    /// Number of routes whose block was injected.
    pub fn patched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RouteStatus::Patched | RouteStatus::Partial { .. }))
            .count()
    }

    /// Number of routes whose block could not be injected.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RouteStatus::Failed { .. }))
            .count()
    }
}

/// Applies the permission template to every tagged route.
pub struct Generator {
    config: GeneratorConfig,
    template: PermissionTemplate,
    anchor: Box<dyn AnchorFinder>,
    start_marker: Regex,
    end_marker: Regex,
}

impl Generator {
    /// Generator using the `httpx.Parse` anchor.
    pub fn new(config: GeneratorConfig, template: PermissionTemplate) -> Self {
        let (start_marker, end_marker) = sentinel_patterns();
        Self {
            config,
            template,
            anchor: Box::new(RegexAnchor::parse_block()),
            start_marker,
            end_marker,
        }
    }

    /// Replaces the insertion anchor.
    pub fn with_anchor(mut self, anchor: impl AnchorFinder + 'static) -> Self {
        self.anchor = Box::new(anchor);
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Processes every permission-tagged route in declaration order.
    pub fn run(&self, service: &Service) -> RunReport {
        let service = service.join_prefix();
        let mut report = RunReport::default();

        for (group, route) in service.routes() {
            let Some(permission) = route.permission() else {
                continue;
            };

            let file =
                handler_file_path(&self.config.dir, &self.config.handler_dir, group, route);

            let status = if self.config.dump_only {
                debug!(file = %file.display(), permission, "dump only, skipping");
                RouteStatus::Skipped
            } else {
                info!(file = %file.display(), permission, "modifying");
                self.patch_file(&file, permission)
            };

            report.ledger.push(permission);
            report.outcomes.push(RouteOutcome {
                group: group.folder().to_string(),
                handler: route.handler.clone(),
                path: route.path.clone(),
                permission: permission.to_string(),
                file,
                status,
            });
        }

        report
    }

    /// Runs the import / remove / append steps against one handler file.
    pub fn patch_file(&self, file: &Path, permission: &str) -> RouteStatus {
        if !file.is_file() {
            warn!(file = %file.display(), "handler file not found");
            return RouteStatus::Failed {
                reason: format!("handler file not found: {}", file.display()),
            };
        }

        let mut errors = Vec::new();

        for entry in self.config.imports() {
            match add_import_to_file(file, entry) {
                Ok(true) => debug!(file = %file.display(), import = %entry, "import added"),
                Ok(false) => debug!(file = %file.display(), import = %entry, "import unchanged"),
                Err(e) if e.is_parse() => {
                    error!(file = %file.display(), error = %e, "cannot parse handler");
                    return RouteStatus::Failed {
                        reason: e.to_string(),
                    };
                }
                Err(e) => {
                    error!(
                        file = %file.display(),
                        import = %entry,
                        error = %e,
                        "error adding import"
                    );
                    errors.push(format!("import {}: {}", entry, e));
                }
            }
        }

        if let Err(e) = remove_between_in_file(file, &self.start_marker, &self.end_marker) {
            error!(file = %file.display(), error = %e, "error removing previous block");
            errors.push(e.to_string());
        }

        let block = self.template.render_block(permission);
        if let Err(e) = append_after_in_file(file, &block, self.anchor.as_ref()) {
            error!(
                file = %file.display(),
                anchor = %self.anchor.describe(),
                error = %e,
                "error adding code"
            );
            return RouteStatus::Failed {
                reason: e.to_string(),
            };
        }

        if errors.is_empty() {
            RouteStatus::Patched
        } else {
            RouteStatus::Partial { errors }
        }
    }

    /// Writes the ledger when a dump directory is configured.
    pub fn dump_ledger(&self, report: &RunReport) -> AppResult<Option<PathBuf>> {
        let Some(dir) = self.config.dump_path() else {
            return Ok(None);
        };
        let path = report.ledger.write_to_dir(&dir)?;
        info!(file = %path.display(), count = report.ledger.len(), "dump");
        Ok(Some(path))
    }
}
