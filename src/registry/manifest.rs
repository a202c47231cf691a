//! Component manifest documents served by the registry.
//!
//! A manifest describes one component:
//!
//! ```json
//! {
//!   "name": "dialog",
//!   "type": 0,
//!   "files": {
//!     "vue": [{ "path": "dialog/Dialog.vue" }],
//!     "angular": [{ "path": "dialog/dialog.component.ts" }]
//!   },
//!   "dependencies": ["@floating-ui/dom"],
//!   "registryDependencies": ["button"]
//! }
//! ```
//!
//! `type` is accepted as the numeric index (`0` = ui, `1` = hook) or by name.
//! `files` keys that are not a known [`Framework`] are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::core::{BxError, Framework};

/// What a component is; informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "RawKind")]
pub enum ComponentKind {
    /// Visual widget
    #[default]
    Ui,
    /// Behavioral hook / composable
    Hook,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKind {
    Index(u8),
    Name(String),
}

impl TryFrom<RawKind> for ComponentKind {
    type Error = String;

    fn try_from(raw: RawKind) -> Result<Self, Self::Error> {
        match raw {
            RawKind::Index(0) => Ok(Self::Ui),
            RawKind::Index(1) => Ok(Self::Hook),
            RawKind::Name(name) if name.eq_ignore_ascii_case("ui") => Ok(Self::Ui),
            RawKind::Name(name) if name.eq_ignore_ascii_case("hook") => Ok(Self::Hook),
            RawKind::Index(i) => Err(format!("unknown component type index {i}")),
            RawKind::Name(name) => Err(format!("unknown component type '{name}'")),
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ui => write!(f, "ui"),
            Self::Hook => write!(f, "hook"),
        }
    }
}

/// A file belonging to a component
///
/// `path` is relative both to the framework directory on the registry and to
/// the local output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Relative, `/`-separated path
    pub path: String,
}

impl FileRef {
    /// Create a file reference.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Destination of this file under `output_root`.
    ///
    /// Only plain path segments are accepted. Absolute paths, drive prefixes,
    /// `..` and empty paths are rejected with [`BxError::PathTraversal`]
    /// before anything touches the disk.
    pub fn destination(&self, component: &str, output_root: &Path) -> Result<PathBuf, BxError> {
        let traversal = || BxError::PathTraversal {
            component: component.to_string(),
            path: self.path.clone(),
        };

        if self.path.trim().is_empty() || self.path.contains('\\') {
            return Err(traversal());
        }

        let relative = Path::new(&self.path);
        let mut destination = output_root.to_path_buf();
        for part in relative.components() {
            match part {
                Component::Normal(segment) => destination.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(traversal());
                }
            }
        }

        if destination == output_root {
            return Err(traversal());
        }

        Ok(destination)
    }
}

/// The unit of distribution served by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentManifest {
    /// Unique registry key
    pub name: String,

    /// UI widget or hook
    #[serde(rename = "type", default)]
    pub kind: ComponentKind,

    /// Ordered file lists per framework
    #[serde(default, deserialize_with = "known_frameworks")]
    pub files: BTreeMap<Framework, Vec<FileRef>>,

    /// Package-manager dependencies; passed through, never resolved here
    #[serde(rename = "dependencies", default)]
    pub plain_dependencies: Vec<String>,

    /// Components that must be installed before this one
    #[serde(default)]
    pub registry_dependencies: Vec<String>,
}

impl ComponentManifest {
    /// Files to install for `framework`, or `None` if the component has no
    /// variant for it.
    #[must_use]
    pub fn files_for(&self, framework: Framework) -> Option<&[FileRef]> {
        self.files.get(&framework).map(Vec::as_slice)
    }

    /// Frameworks this component can be installed for.
    pub fn frameworks(&self) -> impl Iterator<Item = Framework> + '_ {
        self.files.keys().copied()
    }
}

fn known_frameworks<'de, D>(deserializer: D) -> Result<BTreeMap<Framework, Vec<FileRef>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Vec<FileRef>>> = Option::deserialize(deserializer)?;
    let mut files = BTreeMap::new();

    for (key, refs) in raw.unwrap_or_default() {
        match key.parse::<Framework>() {
            Ok(framework) => {
                files.insert(framework, refs);
            }
            Err(_) => debug!("Ignoring files for unknown framework '{key}'"),
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIALOG: &str = r#"{
        "name": "dialog",
        "type": 0,
        "files": {
            "vue": [{ "path": "dialog/Dialog.vue" }, { "path": "dialog/index.ts" }],
            "angular": [{ "path": "dialog/dialog.component.ts" }],
            "svelte": [{ "path": "dialog/Dialog.svelte" }]
        },
        "dependencies": ["@floating-ui/dom"],
        "registryDependencies": ["button"]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest: ComponentManifest = serde_json::from_str(DIALOG).unwrap();

        assert_eq!(manifest.name, "dialog");
        assert_eq!(manifest.kind, ComponentKind::Ui);
        assert_eq!(manifest.plain_dependencies, vec!["@floating-ui/dom"]);
        assert_eq!(manifest.registry_dependencies, vec!["button"]);

        let vue = manifest.files_for(Framework::Vue).unwrap();
        assert_eq!(vue.len(), 2);
        assert_eq!(vue[0].path, "dialog/Dialog.vue");
        assert_eq!(vue[1].path, "dialog/index.ts");
        assert_eq!(manifest.frameworks().collect::<Vec<_>>(), vec![
            Framework::Vue,
            Framework::Angular
        ]);
    }

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest: ComponentManifest =
            serde_json::from_str(r#"{ "name": "use-toggle", "type": "hook" }"#).unwrap();

        assert_eq!(manifest.kind, ComponentKind::Hook);
        assert!(manifest.files.is_empty());
        assert!(manifest.registry_dependencies.is_empty());
        assert!(manifest.files_for(Framework::Angular).is_none());
    }

    #[test]
    fn test_parse_null_files() {
        let manifest: ComponentManifest =
            serde_json::from_str(r#"{ "name": "x", "type": 1, "files": null }"#).unwrap();
        assert_eq!(manifest.kind, ComponentKind::Hook);
        assert!(manifest.files.is_empty());
    }

    #[test]
    fn test_parse_unknown_kind_fails() {
        let result = serde_json::from_str::<ComponentManifest>(r#"{ "name": "x", "type": 7 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_destination_joins_output_root() {
        let root = Path::new("/project/src/components");
        let dest = FileRef::new("button/Button.vue").destination("button", root).unwrap();
        assert_eq!(dest, root.join("button").join("Button.vue"));
    }

    #[test]
    fn test_destination_rejects_traversal() {
        let root = Path::new("/project/src/components");
        for path in ["../secrets", "button/../../x", "/etc/passwd", "", ".", "a\\..\\b"] {
            let err = FileRef::new(path).destination("button", root).unwrap_err();
            assert!(
                matches!(err, BxError::PathTraversal { .. }),
                "expected traversal error for {path:?}"
            );
        }
    }

    #[test]
    fn test_destination_ignores_current_dir_segments() {
        let root = Path::new("/out");
        let dest = FileRef::new("./button/./Button.vue").destination("button", root).unwrap();
        assert_eq!(dest, root.join("button").join("Button.vue"));
    }
}
