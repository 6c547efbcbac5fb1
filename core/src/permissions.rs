//! # Permission Checks
//!
//! Runtime counterpart of the generated snippet: exact-match membership.

/// Returns `true` when `required` is one of `user_permissions`.
///
/// No wildcard or hierarchy semantics: `admin` does not imply `user:create`.
pub fn has_permission<S: AsRef<str>>(user_permissions: &[S], required: &str) -> bool {
    user_permissions.iter().any(|p| p.as_ref() == required)
}
