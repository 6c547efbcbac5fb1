#![deny(missing_docs)]

//! # Permission Core
//!
//! Core library of the goctl permission plugin: reads the API spec goctl hands
//! over, and injects a permission check into every handler whose route carries
//! a `permission` doc tag.

/// Shared error types.
pub mod error;

/// goctl plugin payload models.
pub mod api;

/// Route to handler file mapping.
pub mod handler;

/// Go source patching utilities.
pub mod patcher;

/// Permission snippet template and sentinels.
pub mod template;

/// Collected permissions and their JSON dump.
pub mod ledger;

/// Per-route pipeline.
pub mod generator;

/// Exact-match permission check.
pub mod permissions;

pub use api::{ApiSpec, Group, Plugin, Route, Service};
pub use error::{AppError, AppResult};
pub use generator::{
    Generator, GeneratorConfig, RouteOutcome, RouteStatus, RunReport, DEFAULT_UTILS_IMPORT,
};
pub use ledger::PermissionLedger;
pub use patcher::{
    add_import, append_after, remove_between, AnchorFinder, ImportEntry, RegexAnchor,
};
pub use permissions::has_permission;
pub use template::{PermissionTemplate, END_TAG, START_TAG};
