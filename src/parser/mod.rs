//! TypeScript source scanning.
//!
//! A Logos lexer covers the subset of TypeScript the setup touches; on top
//! of it sit the import-statement scan and the `@NgModule` metadata editor.

pub mod imports;
pub mod lexer;
pub mod ng_module;

pub use ng_module::{ModuleEditor, TsModuleEditor};
