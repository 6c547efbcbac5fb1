#![deny(missing_docs)]

//! # Code Patching
//!
//! Utilities for modifying Go handler sources generated by goctl.
//!
//! - **imports**: Ensuring import specs exist in the import block.
//! - **blocks**: Removing sentinel-delimited blocks and appending after an anchor.
//! - **anchor**: Locating the insertion point.

pub(crate) mod common;
pub(crate) mod golang;

/// Anchor lookup (where generated code goes).
pub mod anchor;

/// Line-region removal and anchored insertion.
pub mod blocks;

/// Import block patching.
pub mod imports;

pub use anchor::{AnchorFinder, RegexAnchor, PARSE_BLOCK_PATTERN};
pub use blocks::{append_after, append_after_in_file, remove_between, remove_between_in_file};
pub use imports::{add_import, add_import_to_file, ImportEntry};
