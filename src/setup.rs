//! The ng-add mutation chain.
//!
//! Three independently idempotent operations run in fixed order against the
//! tree: module import → custom-elements schema → style assets. Each one
//! re-reads the workspace document from the tree, so they stay
//! order-independent and safe to re-run.

use tracing::debug;

use crate::edit::Change;
use crate::error::ConfigurationError;
use crate::parser::{ModuleEditor, TsModuleEditor};
use crate::tree::Tree;
use crate::workspace::{WORKSPACE_CONFIG_PATH, WorkspaceConfig};

/// Name of the Onsen UI root module.
pub const ONSEN_MODULE_NAME: &str = "OnsenModule";
/// Package the module is imported from.
pub const ONSEN_PACKAGE: &str = "ngx-onsenui";

const SCHEMA_SYMBOL: &str = "CUSTOM_ELEMENTS_SCHEMA";
const ANGULAR_CORE: &str = "@angular/core";

const ONSEN_THEME: &str = "./node_modules/onsenui/css/onsenui.css";
const ONSEN_COMPONENTS_THEME: &str = "./node_modules/onsenui/css/onsen-css-components.css";

/// Targets whose styles receive the Onsen stylesheets.
const STYLE_TARGETS: [&str; 2] = ["build", "test"];

/// Options for the setup run.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Name of the workspace project to wire up.
    pub project: String,
}

impl SetupOptions {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }
}

/// Run the full setup chain against the tree.
///
/// Any error aborts the remaining operations; files already updated by
/// earlier operations keep their updates (no rollback).
pub fn ng_add(tree: &mut Tree, options: &SetupOptions) -> Result<(), ConfigurationError> {
    let editor = TsModuleEditor::new();
    add_onsen_module(tree, options, &editor)?;
    add_custom_elements_schema(tree, options, &editor)?;
    add_onsen_styles(tree, options)?;
    Ok(())
}

/// Import `OnsenModule` into the root module of the project.
///
/// A silent no-op when an import of that symbol already exists; otherwise
/// adds one import statement and one `imports` metadata entry. A module
/// file without a module declaration is an error, not a no-op.
pub fn add_onsen_module(
    tree: &mut Tree,
    options: &SetupOptions,
    editor: &impl ModuleEditor,
) -> Result<(), ConfigurationError> {
    let module_path = root_module_path(tree, options, editor)?;
    let source = tree
        .read(&module_path)
        .ok_or_else(|| ConfigurationError::ModuleNotFound(module_path.clone()))?;

    if editor.has_import(source, ONSEN_MODULE_NAME) {
        debug!("{} already imports {}", module_path, ONSEN_MODULE_NAME);
        return Ok(());
    }
    if !editor.has_module_declaration(source) {
        return Err(ConfigurationError::ModuleDeclarationNotFound(module_path));
    }

    let changes = editor.add_symbol_to_metadata(source, "imports", ONSEN_MODULE_NAME, ONSEN_PACKAGE);
    apply_insertions(tree, &module_path, changes)
}

/// Add `CUSTOM_ELEMENTS_SCHEMA` to the root module's `schemas` metadata.
///
/// Additive-only: whatever the editor computes, anything other than an
/// insertion is discarded before applying.
pub fn add_custom_elements_schema(
    tree: &mut Tree,
    options: &SetupOptions,
    editor: &impl ModuleEditor,
) -> Result<(), ConfigurationError> {
    let module_path = root_module_path(tree, options, editor)?;
    let source = tree
        .read(&module_path)
        .ok_or_else(|| ConfigurationError::ModuleNotFound(module_path.clone()))?;

    if !editor.has_module_declaration(source) {
        return Err(ConfigurationError::ModuleDeclarationNotFound(module_path));
    }

    let changes = editor.add_symbol_to_metadata(source, "schemas", SCHEMA_SYMBOL, ANGULAR_CORE);
    apply_insertions(tree, &module_path, changes)
}

/// Ensure the Onsen stylesheets are listed in the build and test targets.
///
/// New entries are prepended; entries already present (by path, in either
/// representation) are left alone. The per-target insertion order leaves
/// `onsen-css-components.css` first, then `onsenui.css`, ahead of whatever
/// the project already had. The workspace document is rewritten once.
pub fn add_onsen_styles(
    tree: &mut Tree,
    options: &SetupOptions,
) -> Result<(), ConfigurationError> {
    let mut workspace = WorkspaceConfig::from_tree(tree)?;
    let mut changed = false;
    for target in STYLE_TARGETS {
        for asset in [ONSEN_THEME, ONSEN_COMPONENTS_THEME] {
            changed |= workspace.add_style(&options.project, target, asset)?;
        }
    }
    if changed {
        let json = workspace.to_json_pretty()?;
        tree.overwrite(WORKSPACE_CONFIG_PATH, json)?;
        debug!("rewrote {} with Onsen style entries", WORKSPACE_CONFIG_PATH);
    }
    Ok(())
}

/// Resolve the root module path for the project: workspace → project →
/// main file → bootstrapped module.
fn root_module_path(
    tree: &Tree,
    options: &SetupOptions,
    editor: &impl ModuleEditor,
) -> Result<String, ConfigurationError> {
    let workspace = WorkspaceConfig::from_tree(tree)?;
    let project = workspace.project(&options.project)?;
    let main = project
        .main_file()
        .ok_or_else(|| ConfigurationError::MainFileNotFound(options.project.clone()))?;
    editor.resolve_module_path(tree, main)
}

/// Stage the insert edits against the file and commit them as one update.
/// Non-insert edit kinds are dropped.
fn apply_insertions(
    tree: &mut Tree,
    path: &str,
    changes: Vec<Change>,
) -> Result<(), ConfigurationError> {
    if changes.is_empty() {
        return Ok(());
    }
    let mut recorder = tree.begin_update(path)?;
    let mut applied = 0usize;
    for change in changes {
        if let Change::Insert(insert) = change {
            recorder.insert_left(insert.pos, insert.text);
            applied += 1;
        }
    }
    debug!("staged {} edit(s) in {}", applied, path);
    tree.commit_update(recorder);
    Ok(())
}
