//! `@NgModule` metadata scanning and edit computation.
//!
//! Locates the decorator's object literal by token walking, then computes
//! insert edits that add a symbol to one of its metadata arrays, together
//! with the matching import statement. The computation is idempotent: a
//! symbol already listed in the array produces no edits.

use text_size::TextSize;

use crate::edit::Change;
use crate::error::ConfigurationError;
use crate::tree::Tree;

use super::imports::{has_import, import_source_for, insert_import_change};
use super::lexer::{Token, TokenKind, significant};

/// Collaborator seam for locating and editing the root module source.
///
/// The setup operations only depend on this trait, so tests can drive them
/// with a fake editor instead of the token scanner.
pub trait ModuleEditor {
    /// Path of the root module file, resolved from the project main file.
    fn resolve_module_path(
        &self,
        tree: &Tree,
        main_path: &str,
    ) -> Result<String, ConfigurationError>;

    /// Whether `source` already imports `symbol`.
    fn has_import(&self, source: &str, symbol: &str) -> bool;

    /// Whether `source` contains a module declaration the editor can target.
    fn has_module_declaration(&self, source: &str) -> bool;

    /// Edits that add `symbol` (imported from `package`) to the named
    /// metadata array of the `@NgModule` declaration in `source`.
    fn add_symbol_to_metadata(
        &self,
        source: &str,
        field: &str,
        symbol: &str,
        package: &str,
    ) -> Vec<Change>;
}

/// Token-scanning editor over TypeScript sources.
#[derive(Debug, Default)]
pub struct TsModuleEditor;

impl TsModuleEditor {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleEditor for TsModuleEditor {
    fn resolve_module_path(
        &self,
        tree: &Tree,
        main_path: &str,
    ) -> Result<String, ConfigurationError> {
        resolve_module_path(tree, main_path)
    }

    fn has_import(&self, source: &str, symbol: &str) -> bool {
        has_import(source, symbol)
    }

    fn has_module_declaration(&self, source: &str) -> bool {
        has_module_declaration(source)
    }

    fn add_symbol_to_metadata(
        &self,
        source: &str,
        field: &str,
        symbol: &str,
        package: &str,
    ) -> Vec<Change> {
        add_symbol_to_metadata(source, field, symbol, package)
    }
}

/// Byte layout of the `@NgModule({ … })` metadata object.
#[derive(Debug)]
struct MetadataObject {
    /// Offset just past the opening `{`.
    open_end: TextSize,
    /// End offset of the last top-level property value, if any.
    last_property_end: Option<TextSize>,
    fields: Vec<MetadataField>,
}

#[derive(Debug)]
struct MetadataField {
    name: String,
    /// Present when the property value is an array literal.
    array: Option<MetadataArray>,
}

#[derive(Debug)]
struct MetadataArray {
    /// Offset just past the `[`.
    open_end: TextSize,
    /// Source text of each top-level element, trimmed by token bounds.
    elements: Vec<String>,
    /// End offset of the last element, if any.
    last_element_end: Option<TextSize>,
}

/// Whether `source` has an `@NgModule({ … })` decorator to edit.
pub fn has_module_declaration(source: &str) -> bool {
    let tokens = significant(source);
    find_metadata_object(source, &tokens).is_some()
}

/// Compute the insert edits that add `symbol` to the `field` metadata array,
/// creating the field when absent, plus an import of `symbol` from `package`
/// when the source does not import it yet.
///
/// Returns no edits when the source has no `@NgModule` decorator or the
/// symbol is already listed.
pub fn add_symbol_to_metadata(
    source: &str,
    field: &str,
    symbol: &str,
    package: &str,
) -> Vec<Change> {
    let tokens = significant(source);
    let Some(object) = find_metadata_object(source, &tokens) else {
        return Vec::new();
    };

    let mut changes = Vec::new();
    match object.fields.iter().find(|f| f.name == field) {
        Some(existing) => match &existing.array {
            Some(array) => {
                if array.elements.iter().any(|e| e == symbol) {
                    return Vec::new();
                }
                match array.last_element_end {
                    Some(end) => changes.push(Change::insert(end, format!(", {symbol}"))),
                    None => changes.push(Change::insert(array.open_end, symbol.to_string())),
                }
            }
            // The field exists but is not an array literal; leave it alone.
            None => return Vec::new(),
        },
        None => match object.last_property_end {
            Some(end) => {
                changes.push(Change::insert(end, format!(",\n  {field}: [{symbol}]")));
            }
            None => {
                changes.push(Change::insert(
                    object.open_end,
                    format!("\n  {field}: [{symbol}]\n"),
                ));
            }
        },
    }

    if !has_import(source, symbol) {
        changes.push(Change::Insert(insert_import_change(source, symbol, package)));
    }
    changes
}

/// Resolve the path of the root NgModule file from the project main file by
/// following the `bootstrapModule(…)` argument to its import.
pub fn resolve_module_path(tree: &Tree, main_path: &str) -> Result<String, ConfigurationError> {
    let source = tree
        .read(main_path)
        .ok_or_else(|| ConfigurationError::FileNotFound(main_path.to_string()))?;

    let tokens = significant(source);
    let mut symbol = None;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind == TokenKind::Ident
            && tok.text == "bootstrapModule"
            && tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::LParen)
            && tokens.get(i + 2).map(|t| t.kind) == Some(TokenKind::Ident)
        {
            symbol = Some(tokens[i + 2].text);
            break;
        }
    }
    let symbol =
        symbol.ok_or_else(|| ConfigurationError::BootstrapNotFound(main_path.to_string()))?;

    let specifier = import_source_for(source, symbol)
        .ok_or_else(|| ConfigurationError::ModuleNotFound(symbol.to_string()))?;
    Ok(resolve_relative(main_path, &specifier))
}

/// Resolve a relative module specifier against the directory of `main_path`,
/// appending `.ts` when the specifier carries no extension.
fn resolve_relative(main_path: &str, specifier: &str) -> String {
    let mut parts: Vec<&str> = main_path.split('/').collect();
    parts.pop();
    for comp in specifier.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let mut path = parts.join("/");
    if !path.ends_with(".ts") {
        path.push_str(".ts");
    }
    path
}

fn find_metadata_object(source: &str, tokens: &[Token<'_>]) -> Option<MetadataObject> {
    for i in 0..tokens.len() {
        if tokens[i].kind == TokenKind::At
            && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Ident && t.text == "NgModule")
            && tokens.get(i + 2).is_some_and(|t| t.kind == TokenKind::LParen)
            && tokens.get(i + 3).is_some_and(|t| t.kind == TokenKind::LBrace)
        {
            return parse_object(source, tokens, i + 3);
        }
    }
    None
}

/// Parse the object literal opening at `open_idx` into its top-level
/// properties. Nested values are consumed by [`parse_value`].
fn parse_object(source: &str, tokens: &[Token<'_>], open_idx: usize) -> Option<MetadataObject> {
    let open_end = tokens[open_idx].end();
    let mut fields = Vec::new();
    let mut last_property_end = None;
    let mut depth = 0i32;
    let mut i = open_idx + 1;
    while i < tokens.len() {
        let tok = &tokens[i];
        match tok.kind {
            TokenKind::RBrace if depth == 0 => {
                return Some(MetadataObject {
                    open_end,
                    last_property_end,
                    fields,
                });
            }
            TokenKind::Ident | TokenKind::Str
                if depth == 0
                    && tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::Colon) =>
            {
                let name = if tok.kind == TokenKind::Str {
                    tok.unquoted().to_string()
                } else {
                    tok.text.to_string()
                };
                let (array, value_end, next) = parse_value(source, tokens, i + 2);
                fields.push(MetadataField { name, array });
                last_property_end = Some(value_end);
                i = next;
                continue;
            }
            TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
            TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Consume one property value. Returns the array layout when the value is an
/// array literal, the end offset of the value, and the index of the token
/// after it (pointing at the `,` or the closing `}`).
fn parse_value(
    source: &str,
    tokens: &[Token<'_>],
    start: usize,
) -> (Option<MetadataArray>, TextSize, usize) {
    let mut array = None;
    let mut i = start;
    let mut end = tokens.get(start).map_or(TextSize::default(), |t| t.end());

    if tokens.get(start).map(|t| t.kind) == Some(TokenKind::LBracket) {
        let (parsed, after) = parse_array(source, tokens, start);
        if after > start {
            end = tokens[after - 1].end();
        }
        array = Some(parsed);
        i = after;
    }

    let mut depth = 0i32;
    while i < tokens.len() {
        let tok = &tokens[i];
        match tok.kind {
            TokenKind::Comma | TokenKind::RBrace if depth == 0 => break,
            kind => {
                if matches!(
                    kind,
                    TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen
                ) {
                    depth += 1;
                }
                if matches!(
                    kind,
                    TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen
                ) {
                    depth -= 1;
                }
                end = tok.end();
            }
        }
        i += 1;
    }
    (array, end, i)
}

/// Parse an array literal opening at `open_idx`. Returns the layout and the
/// index just past the closing `]`.
fn parse_array(source: &str, tokens: &[Token<'_>], open_idx: usize) -> (MetadataArray, usize) {
    let open_end = tokens[open_idx].end();
    let mut elements = Vec::new();
    let mut last_element_end = None;
    let mut depth = 0i32;
    let mut start: Option<TextSize> = None;
    let mut end = open_end;
    let mut i = open_idx + 1;
    while i < tokens.len() {
        let tok = &tokens[i];
        match tok.kind {
            TokenKind::RBracket if depth == 0 => {
                if let Some(s) = start {
                    elements.push(slice(source, s, end));
                    last_element_end = Some(end);
                }
                return (
                    MetadataArray {
                        open_end,
                        elements,
                        last_element_end,
                    },
                    i + 1,
                );
            }
            TokenKind::Comma if depth == 0 => {
                if let Some(s) = start {
                    elements.push(slice(source, s, end));
                    last_element_end = Some(end);
                }
                start = None;
            }
            kind => {
                if matches!(
                    kind,
                    TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen
                ) {
                    depth += 1;
                }
                if matches!(
                    kind,
                    TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen
                ) {
                    depth -= 1;
                }
                if start.is_none() {
                    start = Some(tok.offset);
                }
                end = tok.end();
            }
        }
        i += 1;
    }
    (
        MetadataArray {
            open_end,
            elements,
            last_element_end,
        },
        i,
    )
}

fn slice(source: &str, start: TextSize, end: TextSize) -> String {
    source[usize::from(start)..usize::from(end)].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_inserts;

    const APP_MODULE: &str = "\
import { NgModule } from '@angular/core';
import { BrowserModule } from '@angular/platform-browser';
import { AppComponent } from './app.component';

@NgModule({
  declarations: [AppComponent],
  imports: [BrowserModule],
  bootstrap: [AppComponent]
})
export class AppModule { }
";

    fn apply(source: &str, changes: Vec<Change>) -> String {
        let inserts: Vec<_> = changes
            .into_iter()
            .filter_map(|c| match c {
                Change::Insert(i) => Some(i),
                Change::Remove(_) => None,
            })
            .collect();
        apply_inserts(source, &inserts)
    }

    #[test]
    fn appends_to_an_existing_array_and_adds_the_import() {
        let changes = add_symbol_to_metadata(APP_MODULE, "imports", "OnsenModule", "ngx-onsenui");
        assert_eq!(changes.len(), 2);
        let updated = apply(APP_MODULE, changes);
        assert!(updated.contains("imports: [BrowserModule, OnsenModule]"));
        assert!(updated.contains("import { OnsenModule } from 'ngx-onsenui';"));
    }

    #[test]
    fn creates_the_field_when_missing() {
        let changes = add_symbol_to_metadata(
            APP_MODULE,
            "schemas",
            "CUSTOM_ELEMENTS_SCHEMA",
            "@angular/core",
        );
        let updated = apply(APP_MODULE, changes);
        assert!(updated.contains("schemas: [CUSTOM_ELEMENTS_SCHEMA]"));
        assert!(updated.contains("import { CUSTOM_ELEMENTS_SCHEMA } from '@angular/core';"));
    }

    #[test]
    fn present_symbol_yields_no_edits() {
        let changes = add_symbol_to_metadata(APP_MODULE, "imports", "BrowserModule", "x");
        assert!(changes.is_empty());
    }

    #[test]
    fn empty_array_gets_the_bare_symbol() {
        let source = "@NgModule({\n  imports: []\n})\nexport class M {}\n";
        let changes = add_symbol_to_metadata(source, "imports", "A", "a");
        let updated = apply(source, changes);
        assert!(updated.contains("imports: [A]"));
    }

    #[test]
    fn empty_metadata_object_gets_a_fresh_property() {
        let source = "@NgModule({})\nexport class M {}\n";
        let changes = add_symbol_to_metadata(source, "schemas", "S", "p");
        let updated = apply(source, changes);
        assert!(updated.contains("schemas: [S]"));
    }

    #[test]
    fn no_decorator_means_no_edits() {
        assert!(add_symbol_to_metadata("export class M {}", "imports", "A", "a").is_empty());
    }

    #[test]
    fn declaration_detection_needs_the_decorator() {
        assert!(has_module_declaration(APP_MODULE));
        assert!(!has_module_declaration("export class AppModule {}\n"));
    }

    #[test]
    fn trailing_comma_in_the_array_is_tolerated() {
        let source = "@NgModule({\n  imports: [BrowserModule,],\n})\nexport class M {}\n";
        let changes = add_symbol_to_metadata(source, "imports", "A", "a");
        let updated = apply(source, changes);
        assert!(updated.contains("[BrowserModule, A,]"));
    }

    #[test]
    fn resolves_the_bootstrapped_module_path() {
        let mut tree = Tree::new();
        tree.set_file_content(
            "src/main.ts",
            "import { AppModule } from './app/app.module';\n\
             platformBrowserDynamic().bootstrapModule(AppModule);\n",
        );
        let path = resolve_module_path(&tree, "src/main.ts").unwrap();
        assert_eq!(path, "src/app/app.module.ts");
    }

    #[test]
    fn missing_bootstrap_call_is_an_error() {
        let mut tree = Tree::new();
        tree.set_file_content("src/main.ts", "console.log('no bootstrap');\n");
        let err = resolve_module_path(&tree, "src/main.ts").unwrap_err();
        assert!(matches!(err, ConfigurationError::BootstrapNotFound(_)));
    }

    #[test]
    fn parent_directory_specifiers_resolve() {
        assert_eq!(
            resolve_relative("src/app/main.ts", "../shared/core.module"),
            "src/shared/core.module.ts"
        );
    }
}
