use crate::error::{AppError, AppResult};
use crate::patcher::common::{read_source, write_source};
use crate::patcher::golang::parse_file;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// An import to be ensured in a Go source file: an optional alias and a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Import name (`utils`, `_`, `.`), if any.
    pub alias: Option<String>,
    /// Import path without quotes.
    pub path: String,
}

impl ImportEntry {
    /// Creates an unaliased import.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    /// Creates an aliased import.
    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }

    /// The path as it appears in Go source: `"path"`.
    pub fn quoted_path(&self) -> String {
        format!("\"{}\"", self.path)
    }

    /// Parses a comma separated list, skipping empty segments.
    ///
    /// Each segment is either `path` or `alias path`.
    pub fn parse_list(list: &str) -> AppResult<Vec<Self>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<ImportEntry>())
            .collect()
    }
}

impl fmt::Display for ImportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} {}", alias, self.quoted_path()),
            None => write!(f, "{}", self.quoted_path()),
        }
    }
}

impl FromStr for ImportEntry {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let (alias, path) = match parts.as_slice() {
            [path] => (None, *path),
            [alias, path] => (Some(alias.to_string()), *path),
            _ => {
                return Err(AppError::Parse(format!(
                    "invalid import `{}`: expected `path` or `alias path`",
                    s.trim()
                )))
            }
        };
        let path = path.trim_matches('"');
        if path.is_empty() {
            return Err(AppError::Parse(format!("invalid import `{}`: empty path", s)));
        }
        Ok(Self {
            alias,
            path: path.to_string(),
        })
    }
}

/// Adds an import spec to the first import declaration of a Go file.
///
/// Returns the source unchanged when:
/// - some import spec already carries the same quoted path (alias is ignored), or
/// - the file has no import declaration at all.
///
/// A single-spec `import "x"` is rewritten to a grouped declaration.
/// Malformed source yields `AppError::Parse`.
pub fn add_import(source: &str, entry: &ImportEntry) -> AppResult<String> {
    let file = parse_file(source)?;
    let quoted = entry.quoted_path();

    if let Some(existing) = file
        .imports
        .iter()
        .flat_map(|decl| decl.specs.iter())
        .find(|spec| spec.path.contains(&quoted))
    {
        debug!(
            import = %existing.path,
            alias = ?existing.name,
            package = %file.package,
            "import already exists"
        );
        return Ok(source.into());
    }

    let Some(decl) = file.imports.first() else {
        debug!(package = %file.package, "no import declaration, skipping");
        return Ok(source.into());
    };

    let mut new_source = source.to_string();

    match (decl.parens, decl.specs.first()) {
        (Some((_, rparen)), _) => {
            let line_start = source[..rparen].rfind('\n').map_or(0, |p| p + 1);
            if source[line_start..rparen].trim().is_empty() {
                new_source.insert_str(line_start, &format!("\t{}\n", entry));
            } else {
                new_source.insert_str(rparen, &format!("\n\t{}\n", entry));
            }
        }
        (None, Some(spec)) => {
            let grouped = format!("(\n\t{}\n\t{}\n)", &source[spec.start..spec.end], entry);
            new_source.replace_range(spec.start..spec.end, &grouped);
        }
        (None, None) => return Ok(source.into()),
    }

    Ok(new_source)
}

/// Applies [`add_import`] to a file on disk.
///
/// Returns `true` when the file was rewritten. The file is left untouched on
/// parse failure.
pub fn add_import_to_file(path: &Path, entry: &ImportEntry) -> AppResult<bool> {
    let source = read_source(path)?;
    let updated = add_import(&source, entry)?;
    if updated == source {
        return Ok(false);
    }
    write_source(path, &updated)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    const HANDLER: &str = r#"package user

import (
	"net/http"

	"demo/internal/logic/user"
	"demo/internal/svc"
	"github.com/zeromicro/go-zero/rest/httpx"
)

func CreateUserHandler(svcCtx *svc.ServiceContext) http.HandlerFunc {
	return nil
}
"#;

    #[test]
    fn test_add_import_grouped() {
        let entry = ImportEntry::aliased("utils", "github.com/sunbankio/permission/utils");
        let res = add_import(HANDLER, &entry).unwrap();
        assert!(res.contains(
            "\t\"github.com/zeromicro/go-zero/rest/httpx\"\n\tutils \"github.com/sunbankio/permission/utils\"\n)\n"
        ));
        assert!(res.ends_with("\treturn nil\n}\n"));
    }

    #[test]
    fn test_add_import_is_idempotent() {
        let entry = ImportEntry::aliased("contextkey", "demo/internal/types");
        let once = add_import(HANDLER, &entry).unwrap();
        let twice = add_import(&once, &entry).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.matches("\"demo/internal/types\"").count(), 1);
    }

    #[test]
    fn test_alias_difference_is_still_duplicate() {
        let entry = ImportEntry::aliased("s", "demo/internal/svc");
        let res = add_import(HANDLER, &entry).unwrap();
        assert_eq!(res, HANDLER);
    }

    #[test]
    fn test_add_import_single_decl_becomes_group() {
        let code = "package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println() }\n";
        let res = add_import(code, &ImportEntry::new("os")).unwrap();
        assert_eq!(
            res,
            "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc main() { fmt.Println() }\n"
        );
    }

    #[test]
    fn test_add_import_inline_group() {
        let code = "package main\n\nimport ()\n";
        let res = add_import(code, &ImportEntry::new("os")).unwrap();
        assert_eq!(res, "package main\n\nimport (\n\t\"os\"\n)\n");
    }

    #[test]
    fn test_add_import_only_touches_first_decl() {
        let code = "package main\n\nimport (\n\t\"fmt\"\n)\n\nimport (\n\t\"os\"\n)\n";
        let res = add_import(code, &ImportEntry::new("strings")).unwrap();
        assert_eq!(
            res,
            "package main\n\nimport (\n\t\"fmt\"\n\t\"strings\"\n)\n\nimport (\n\t\"os\"\n)\n"
        );
        // Present in the second declaration: not re-added.
        assert_eq!(add_import(&res, &ImportEntry::new("os")).unwrap(), res);
    }

    #[test]
    fn test_add_import_keeps_byte_order_mark() {
        let code = "\u{feff}package main\n\nimport \"fmt\"\n";
        let res = add_import(code, &ImportEntry::new("os")).unwrap();
        assert_eq!(
            res,
            "\u{feff}package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n"
        );
    }

    #[test]
    fn test_add_import_without_import_decl_is_noop() {
        let code = "package main\n\nfunc main() {}\n";
        let res = add_import(code, &ImportEntry::new("os")).unwrap();
        assert_eq!(res, code);
    }

    #[test]
    fn test_add_import_malformed_source() {
        let code = "package main\n\nimport (\n\t\"fmt\"\n\nfunc main() {}\n";
        let err = add_import(code, &ImportEntry::new("os")).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_add_import_to_file_leaves_malformed_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.go");
        let code = "package main\n\nfunc main() {\n";
        fs::write(&path, code).unwrap();

        assert!(add_import_to_file(&path, &ImportEntry::new("os")).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), code);
    }

    #[test]
    fn test_add_import_to_file_reports_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("h.go");
        fs::write(&path, HANDLER).unwrap();

        let entry = ImportEntry::new("strings");
        assert!(add_import_to_file(&path, &entry).unwrap());
        assert!(!add_import_to_file(&path, &entry).unwrap());
    }

    #[test]
    fn test_import_entry_parsing() {
        assert_eq!(
            "demo/pkg".parse::<ImportEntry>().unwrap(),
            ImportEntry::new("demo/pkg")
        );
        assert_eq!(
            "  ck \"demo/types\" ".parse::<ImportEntry>().unwrap(),
            ImportEntry::aliased("ck", "demo/types")
        );
        assert!("a b c".parse::<ImportEntry>().is_err());

        let list = ImportEntry::parse_list("a/b, ,_ embed,").unwrap();
        assert_eq!(
            list,
            vec![ImportEntry::new("a/b"), ImportEntry::aliased("_", "embed")]
        );
        assert!(ImportEntry::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_import_entry_display() {
        assert_eq!(ImportEntry::new("os").to_string(), "\"os\"");
        assert_eq!(
            ImportEntry::aliased("utils", "x/utils").to_string(),
            "utils \"x/utils\""
        );
    }
}
