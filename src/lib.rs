//! # onsen-setup
//!
//! Wires the Onsen UI component library into an existing Angular CLI
//! workspace: imports `OnsenModule` into the application's root module,
//! relaxes element validation with `CUSTOM_ELEMENTS_SCHEMA`, and registers
//! the Onsen stylesheets in the build and test targets.
//!
//! All edits are staged against an in-memory [`Tree`] and written back to
//! disk once per mutated file when the caller commits. Every operation is
//! idempotent: running the full chain twice leaves the same state as
//! running it once.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! setup     → the mutation chain (module import, schemas, styles)
//!   ↓
//! workspace → order-preserving angular.json document
//!   ↓
//! parser    → Logos lexer, import/NgModule scanning, edit computation
//!   ↓
//! tree      → staged file buffer with deferred writes
//!   ↓
//! edit      → tagged text edits (insert/remove)
//! ```

// ============================================================================
// MODULES (dependency order: edit → tree → parser → workspace → setup)
// ============================================================================

/// Tagged text edits with byte offsets
pub mod edit;

/// The single error type raised by setup operations
pub mod error;

/// TypeScript source scanning: lexer, imports, NgModule metadata
pub mod parser;

/// The ng-add mutation chain
pub mod setup;

/// Staged file buffer with deferred writes
pub mod tree;

/// Order-preserving model of the Angular workspace document
pub mod workspace;

// Re-export commonly needed items
pub use error::ConfigurationError;
pub use setup::{SetupOptions, ng_add};
pub use tree::Tree;
pub use workspace::WorkspaceConfig;
