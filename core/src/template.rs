#![deny(missing_docs)]

//! # Permission Template
//!
//! The check snippet injected into each handler. Templates use Go `fmt`
//! verbs and must contain exactly one of `%s`, `%v` or `%q`; `%%` is a
//! literal percent sign.
//!
//! Rendered snippets are wrapped in sentinel comment lines so a later run can
//! find and replace them.

use crate::error::{AppError, AppResult};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Opening sentinel line of a generated block.
pub const START_TAG: &str = "//permission:start";

/// Closing sentinel line of a generated block.
pub const END_TAG: &str = "//permission:end";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Raw,
    Quoted,
}

/// A parsed permission template, loaded once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTemplate {
    segments: Vec<Segment>,
}

impl PermissionTemplate {
    /// Parses template text.
    pub fn parse(text: &str) -> AppResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut verbs = 0;
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let verb = match chars.next() {
                Some('%') => {
                    literal.push('%');
                    continue;
                }
                Some('s') | Some('v') => Segment::Raw,
                Some('q') => Segment::Quoted,
                Some(other) => {
                    return Err(AppError::Template(format!(
                        "unsupported verb `%{}` (use %s, %v or %q)",
                        other
                    )))
                }
                None => return Err(AppError::Template("dangling `%` at end of template".into())),
            };
            verbs += 1;
            segments.push(Segment::Text(std::mem::take(&mut literal)));
            segments.push(verb);
        }
        segments.push(Segment::Text(literal));

        match verbs {
            1 => Ok(Self { segments }),
            0 => Err(AppError::Template(
                "template has no placeholder for the permission".into(),
            )),
            n => Err(AppError::Template(format!(
                "template has {} placeholders, expected exactly one",
                n
            ))),
        }
    }

    /// Reads and parses a template file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::Template(format!("Failed to read template {:?}: {}", path, e))
        })?;
        Self::parse(&text)
    }

    /// Substitutes the permission into the template.
    pub fn render(&self, permission: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Raw => out.push_str(permission),
                Segment::Quoted => out.push_str(&quote(permission)),
            }
        }
        out
    }

    /// Renders the template and wraps it in sentinel lines.
    pub fn render_block(&self, permission: &str) -> String {
        wrap_block(&self.render(permission))
    }
}

/// Double-quotes a string the way Go's `%q` does for printable text.
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Wraps rendered code in the start/end sentinel lines.
pub fn wrap_block(rendered: &str) -> String {
    format!("{}\n{}\n{}", START_TAG, rendered, END_TAG)
}

/// Line patterns matching the sentinel comments, for block removal.
pub fn sentinel_patterns() -> (Regex, Regex) {
    (
        Regex::new(&regex::escape(START_TAG)).expect("Invalid regex constant"),
        Regex::new(&regex::escape(END_TAG)).expect("Invalid regex constant"),
    )
}
