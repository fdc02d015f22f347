//! Error type for setup operations.

use thiserror::Error;

/// Errors raised while mutating the workspace configuration or the root
/// module source. Any failure aborts the remaining setup sequence; files
/// already committed in earlier operations stay committed.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The requested project does not exist in the workspace document.
    #[error("Project {0:?} does not exist in the workspace")]
    ProjectNotFound(String),

    /// The named build target (or its options) is missing from the project.
    #[error("Target {target:?} does not exist for project {project:?}")]
    TargetNotFound { project: String, target: String },

    /// The project's build target declares no main file.
    #[error("Could not find the main file for project {0:?}")]
    MainFileNotFound(String),

    /// The main file contains no `bootstrapModule(...)` call.
    #[error("Could not find the bootstrapped module in {0}")]
    BootstrapNotFound(String),

    /// The root module source could not be located.
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// The resolved root module file has no module declaration to edit.
    #[error("No module declaration found in {0}")]
    ModuleDeclarationNotFound(String),

    /// A path was read or overwritten that is not in the tree.
    #[error("File not found in tree: {0}")]
    FileNotFound(String),

    /// Workspace document parse or serialization error.
    #[error("Workspace configuration error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error during tree load or commit.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
