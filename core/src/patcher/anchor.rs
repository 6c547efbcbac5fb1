use crate::error::{AppError, AppResult};
use regex::Regex;
use std::ops::Range;

/// The request-parsing block emitted by goctl in every handler with a request type.
pub const PARSE_BLOCK_PATTERN: &str = r"if err := httpx\.Parse\(r, &req\); err != nil \{[^}]+\}";

/// Locates the insertion anchor in a source file.
///
/// Implementations return the byte range of the first anchor occurrence.
/// Generated code is spliced in at the end of that range.
pub trait AnchorFinder {
    /// Returns the byte range of the anchor, or `None` when absent.
    fn find(&self, source: &str) -> Option<Range<usize>>;

    /// Human readable description for log output.
    fn describe(&self) -> String;
}

/// An anchor matched by a regular expression.
#[derive(Debug, Clone)]
pub struct RegexAnchor {
    pattern: Regex,
}

impl RegexAnchor {
    /// Compiles a custom anchor pattern.
    pub fn new(pattern: &str) -> AppResult<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| AppError::General(format!("Invalid anchor pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// The `httpx.Parse` error-check block.
    pub fn parse_block() -> Self {
        Self {
            pattern: Regex::new(PARSE_BLOCK_PATTERN).expect("Invalid regex constant"),
        }
    }
}

impl Default for RegexAnchor {
    fn default() -> Self {
        Self::parse_block()
    }
}

impl AnchorFinder for RegexAnchor {
    fn find(&self, source: &str) -> Option<Range<usize>> {
        self.pattern.find(source).map(|m| m.range())
    }

    fn describe(&self) -> String {
        self.pattern.as_str().to_string()
    }
}
