//! The Angular workspace document (`angular.json`).
//!
//! The document is held as a raw JSON tree so a rewrite reproduces the
//! original key order exactly, even for keys the setup never models.
//! Lookups deserialize just the project slice into typed views; the one
//! mutation (style insertion) edits the tree in place.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigurationError;
use crate::tree::Tree;

/// Path of the workspace document inside the tree.
pub const WORKSPACE_CONFIG_PATH: &str = "angular.json";

/// The whole workspace document.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    doc: Value,
}

/// Typed view of one named project, deserialized from its document slice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub root: Option<String>,
    pub source_root: Option<String>,
    pub project_type: Option<String>,
    /// Newer workspaces key their targets under `targets`…
    pub targets: Option<IndexMap<String, Target>>,
    /// …older ones under `architect`. Lookups check both.
    pub architect: Option<IndexMap<String, Target>>,
}

/// One build target (build, test, serve, …).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub builder: Option<String>,
    pub options: Option<TargetOptions>,
}

/// Per-target options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOptions {
    pub main: Option<String>,
    pub styles: Option<Vec<StyleEntry>>,
}

/// A style entry: either a bare path string or an object with an `input`
/// path. Comparisons go through [`StyleEntry::path`] in both forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleEntry {
    Plain(String),
    Input {
        input: String,
        #[serde(flatten)]
        rest: Map<String, Value>,
    },
}

impl StyleEntry {
    /// The resolved stylesheet path, regardless of representation.
    pub fn path(&self) -> &str {
        match self {
            StyleEntry::Plain(path) => path,
            StyleEntry::Input { input, .. } => input,
        }
    }
}

impl WorkspaceConfig {
    /// Parse the workspace document from JSON.
    pub fn parse(json: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            doc: serde_json::from_str(json)?,
        })
    }

    /// Read and parse `angular.json` from the tree.
    pub fn from_tree(tree: &Tree) -> Result<Self, ConfigurationError> {
        let raw = tree
            .read(WORKSPACE_CONFIG_PATH)
            .ok_or_else(|| ConfigurationError::FileNotFound(WORKSPACE_CONFIG_PATH.to_string()))?;
        Self::parse(raw)
    }

    /// Serialize back to pretty-printed JSON (2-space indent). Key order is
    /// the document's own; untouched objects come out byte-identical.
    pub fn to_json_pretty(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(&self.doc)?)
    }

    /// Typed view of the named project.
    pub fn project(&self, name: &str) -> Result<Project, ConfigurationError> {
        let slice = self
            .doc
            .get("projects")
            .and_then(|projects| projects.get(name))
            .ok_or_else(|| ConfigurationError::ProjectNotFound(name.to_string()))?;
        Ok(serde_json::from_value(slice.clone())?)
    }

    /// Prepend `asset` to the styles of the named target unless an entry
    /// with the same path already exists, in either representation.
    /// Returns whether the document changed.
    ///
    /// A missing target (or one without options) is an error, not a no-op:
    /// silently skipping would hide a misnamed target.
    pub fn add_style(
        &mut self,
        project: &str,
        target: &str,
        asset: &str,
    ) -> Result<bool, ConfigurationError> {
        if self
            .doc
            .get("projects")
            .and_then(|projects| projects.get(project))
            .is_none()
        {
            return Err(ConfigurationError::ProjectNotFound(project.to_string()));
        }
        let options = self
            .target_options_mut(project, target)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ConfigurationError::TargetNotFound {
                project: project.to_string(),
                target: target.to_string(),
            })?;

        match options.get_mut("styles") {
            None => {
                options.insert(
                    "styles".to_string(),
                    Value::Array(vec![Value::String(asset.to_string())]),
                );
                Ok(true)
            }
            Some(value) => {
                let entries: Vec<StyleEntry> = serde_json::from_value(value.clone())?;
                if entries.iter().any(|entry| entry.path() == asset) {
                    return Ok(false);
                }
                if let Value::Array(styles) = value {
                    styles.insert(0, Value::String(asset.to_string()));
                }
                Ok(true)
            }
        }
    }

    /// The `options` value of the named target, under `targets` or
    /// `architect`.
    fn target_options_mut(&mut self, project: &str, target: &str) -> Option<&mut Value> {
        let project = self.doc.get_mut("projects")?.get_mut(project)?;
        let table = if project
            .get("targets")
            .and_then(|targets| targets.get(target))
            .is_some()
        {
            "targets"
        } else if project
            .get("architect")
            .and_then(|targets| targets.get(target))
            .is_some()
        {
            "architect"
        } else {
            return None;
        };
        project.get_mut(table)?.get_mut(target)?.get_mut("options")
    }
}

impl Project {
    fn target(&self, name: &str) -> Option<&Target> {
        if let Some(target) = self.targets.as_ref().and_then(|t| t.get(name)) {
            return Some(target);
        }
        self.architect.as_ref().and_then(|t| t.get(name))
    }

    /// Options of the named target, if the target and its options exist.
    pub fn target_options(&self, name: &str) -> Option<&TargetOptions> {
        self.target(name).and_then(|t| t.options.as_ref())
    }

    /// Main source file declared by the build target.
    pub fn main_file(&self) -> Option<&str> {
        self.target_options("build").and_then(|o| o.main.as_deref())
    }
}
