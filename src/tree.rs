//! Staged file buffer with deferred writes.
//!
//! A [`Tree`] holds the workspace files that setup operations read and
//! mutate. Edits happen purely in memory; [`Tree::commit`] writes each
//! dirty file back to disk exactly once.

use std::fs;
use std::io;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use text_size::TextSize;

use crate::edit::{InsertChange, apply_inserts};
use crate::error::ConfigurationError;

/// In-memory view of the project files, keyed by relative path with `/`
/// separators.
#[derive(Debug, Default)]
pub struct Tree {
    files: FxHashMap<String, String>,
    dirty: FxHashSet<String>,
}

/// Records insertions against one file until committed back to the tree.
#[derive(Debug)]
pub struct UpdateRecorder {
    path: String,
    inserts: Vec<InsertChange>,
}

impl UpdateRecorder {
    /// Stage an insertion. Edits recorded earlier at the same offset apply
    /// first.
    pub fn insert_left(&mut self, pos: TextSize, text: impl Into<String>) {
        self.inserts.push(InsertChange {
            pos,
            text: text.into(),
        });
    }

    /// Path this recorder edits.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether any edits were recorded.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
    }
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all `.ts` and `.json` files under `root` into a tree.
    ///
    /// `node_modules` directories are skipped.
    pub fn load(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        let mut tree = Self::new();
        collect_files(root, root, &mut tree.files)?;
        tracing::debug!("loaded {} file(s) from {}", tree.files.len(), root.display());
        Ok(tree)
    }

    /// Set the content of a file without marking it dirty.
    pub fn set_file_content(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Read a file's current (possibly already mutated) content.
    pub fn read(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Check if a file exists in the tree.
    pub fn has_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Replace the entire content of an existing file and mark it dirty.
    pub fn overwrite(
        &mut self,
        path: &str,
        content: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        if !self.files.contains_key(path) {
            return Err(ConfigurationError::FileNotFound(path.to_string()));
        }
        self.files.insert(path.to_string(), content.into());
        self.dirty.insert(path.to_string());
        Ok(())
    }

    /// Begin a staged update against an existing file.
    pub fn begin_update(&self, path: &str) -> Result<UpdateRecorder, ConfigurationError> {
        if !self.files.contains_key(path) {
            return Err(ConfigurationError::FileNotFound(path.to_string()));
        }
        Ok(UpdateRecorder {
            path: path.to_string(),
            inserts: Vec::new(),
        })
    }

    /// Apply a recorder's insertions to the file and mark it dirty.
    ///
    /// A recorder with no edits leaves the file clean.
    pub fn commit_update(&mut self, recorder: UpdateRecorder) {
        if recorder.is_empty() {
            return;
        }
        if let Some(base) = self.files.get(&recorder.path) {
            let updated = apply_inserts(base, &recorder.inserts);
            self.files.insert(recorder.path.clone(), updated);
            self.dirty.insert(recorder.path);
        }
    }

    /// Paths mutated since the tree was loaded, sorted.
    pub fn dirty_files(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.dirty.iter().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Write every dirty file back under `root`, once per file.
    pub fn commit(&self, root: impl AsRef<Path>) -> io::Result<()> {
        let root = root.as_ref();
        for path in self.dirty_files() {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            // dirty paths always have content
            if let Some(content) = self.files.get(path) {
                fs::write(&full, content)?;
                tracing::debug!("wrote {}", full.display());
            }
        }
        Ok(())
    }
}

fn collect_files(
    dir: &Path,
    root: &Path,
    files: &mut FxHashMap<String, String>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().and_then(|name| name.to_str()) == Some("node_modules") {
                continue;
            }
            collect_files(&path, root, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "ts" || ext == "json")
        {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.insert(key, fs::read_to_string(&path)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_requires_existing_file() {
        let mut tree = Tree::new();
        assert!(matches!(
            tree.overwrite("missing.json", "{}"),
            Err(ConfigurationError::FileNotFound(_))
        ));

        tree.set_file_content("present.json", "{}");
        tree.overwrite("present.json", "{\"a\":1}").unwrap();
        assert_eq!(tree.read("present.json"), Some("{\"a\":1}"));
        assert_eq!(tree.dirty_files(), vec!["present.json"]);
    }

    #[test]
    fn staged_update_applies_on_commit_update() {
        let mut tree = Tree::new();
        tree.set_file_content("a.ts", "import {} from 'x';");

        let mut recorder = tree.begin_update("a.ts").unwrap();
        assert_eq!(recorder.path(), "a.ts");
        recorder.insert_left(TextSize::new(8), "A");
        tree.commit_update(recorder);

        assert_eq!(tree.read("a.ts"), Some("import {A} from 'x';"));
        assert_eq!(tree.dirty_files(), vec!["a.ts"]);
    }

    #[test]
    fn empty_recorder_leaves_file_clean() {
        let mut tree = Tree::new();
        tree.set_file_content("a.ts", "const x = 1;");

        let recorder = tree.begin_update("a.ts").unwrap();
        tree.commit_update(recorder);

        assert!(tree.dirty_files().is_empty());
    }
}
