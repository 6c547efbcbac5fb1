#![deny(missing_docs)]

//! # goctl Plugin Input
//!
//! Models of the payload goctl hands to a plugin on stdin:
//! `{"Api": {...}, "ApiFilePath": "...", "Style": "...", "Dir": "..."}`.
//!
//! Only the fields this plugin reads are modelled; everything else in the
//! payload (types, info, syntax) is ignored. Go marshals nil maps and slices
//! as `null`, so every collection accepts `null` as empty.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Doc tag carrying the required permission.
pub const PERMISSION_TAG: &str = "permission";

/// Group annotation naming the handler sub-folder.
pub const GROUP_ANNOTATION: &str = "group";

/// Group annotation holding the route prefix.
pub const PREFIX_ANNOTATION: &str = "prefix";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The plugin payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Plugin {
    /// The parsed API specification.
    #[serde(deserialize_with = "null_as_default")]
    pub api: ApiSpec,
    /// Path of the `.api` file goctl parsed.
    pub api_file_path: String,
    /// File naming style requested on the goctl command line.
    pub style: String,
    /// Output directory of the goctl run; relative paths resolve against it.
    pub dir: String,
}

impl Plugin {
    /// Parses the JSON payload goctl writes to the plugin's stdin.
    pub fn from_reader(reader: impl Read) -> AppResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads a payload saved to disk. `.json` files are read as JSON,
    /// anything else as YAML.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::General(format!("Failed to read plugin input {:?}: {}", path, e))
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// The working directory, `.` when goctl did not provide one.
    pub fn dir(&self) -> PathBuf {
        if self.dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.dir)
        }
    }
}

/// The API specification.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApiSpec {
    /// The service block.
    #[serde(deserialize_with = "null_as_default")]
    pub service: Service,
}

/// A service and its route groups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Route groups in declaration order.
    #[serde(deserialize_with = "null_as_default")]
    pub groups: Vec<Group>,
}

impl Service {
    /// Returns a copy with each group's `prefix` annotation joined onto its
    /// route paths.
    pub fn join_prefix(&self) -> Service {
        let mut service = self.clone();
        for group in &mut service.groups {
            let Some(prefix) = group.annotation.properties.get(PREFIX_ANNOTATION) else {
                continue;
            };
            let prefix = prefix.trim_end_matches('/');
            if prefix.is_empty() {
                continue;
            }
            for route in &mut group.routes {
                route.path = format!("{}/{}", prefix, route.path.trim_start_matches('/'));
            }
        }
        service
    }

    /// Iterates `(group, route)` pairs in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Group, &Route)> {
        self.groups
            .iter()
            .flat_map(|group| group.routes.iter().map(move |route| (group, route)))
    }
}

/// Key/value annotation (`@server(...)` block).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Annotation {
    /// Annotation properties.
    #[serde(deserialize_with = "null_as_default")]
    pub properties: IndexMap<String, String>,
}

/// A route group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Group {
    /// The group's `@server` annotation.
    #[serde(deserialize_with = "null_as_default")]
    pub annotation: Annotation,
    /// Routes in declaration order.
    #[serde(deserialize_with = "null_as_default")]
    pub routes: Vec<Route>,
}

impl Group {
    /// The handler sub-folder (`group` annotation), empty when absent.
    pub fn folder(&self) -> &str {
        self.annotation
            .properties
            .get(GROUP_ANNOTATION)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// `@doc(...)` block of a route.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AtDoc {
    /// Doc tags.
    #[serde(deserialize_with = "null_as_default")]
    pub properties: IndexMap<String, String>,
    /// Free text doc.
    pub text: String,
}

/// A single route.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Route {
    /// HTTP method.
    pub method: String,
    /// Route path.
    pub path: String,
    /// Handler name as written in the `.api` file.
    pub handler: String,
    /// Doc tags.
    #[serde(deserialize_with = "null_as_default")]
    pub at_doc: AtDoc,
}

impl Route {
    /// The permission this route requires, if tagged.
    pub fn permission(&self) -> Option<&str> {
        self.at_doc
            .properties
            .get(PERMISSION_TAG)
            .map(String::as_str)
    }
}
