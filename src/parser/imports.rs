//! Scan of top-level `import` statements.

use text_size::TextSize;

use crate::edit::InsertChange;

use super::lexer::{TokenKind, significant};

/// One `import … from '…';` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Offset of the `import` keyword.
    pub start: TextSize,
    /// Offset just past the terminating `;` (or the last token seen).
    pub end: TextSize,
    /// Symbols bound by the import clause (default, named, and namespace
    /// bindings alike).
    pub symbols: Vec<String>,
    /// Module specifier, without quotes. `None` for malformed statements.
    pub source: Option<String>,
}

/// Collect every import statement in `source`.
///
/// Dynamic `import(...)` calls and `import.meta` are expressions, not
/// statements, and are skipped.
pub fn imports(source: &str) -> Vec<ImportStatement> {
    let tokens = significant(source);
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.kind != TokenKind::Ident || tok.text != "import" {
            i += 1;
            continue;
        }
        if matches!(
            tokens.get(i + 1).map(|t| t.kind),
            Some(TokenKind::LParen) | Some(TokenKind::Dot)
        ) {
            i += 1;
            continue;
        }

        let start = tok.offset;
        let mut end = tok.end();
        let mut symbols = Vec::new();
        let mut specifier = None;
        let mut j = i + 1;
        while j < tokens.len() {
            let t = &tokens[j];
            match t.kind {
                TokenKind::Semicolon => {
                    end = t.end();
                    j += 1;
                    break;
                }
                // the specifier string closes the clause; only a `;` may
                // still belong to the statement
                TokenKind::Str => {
                    if specifier.is_none() {
                        specifier = Some(t.unquoted().to_string());
                    }
                    end = t.end();
                    if tokens.get(j + 1).map(|n| n.kind) == Some(TokenKind::Semicolon) {
                        end = tokens[j + 1].end();
                        j += 2;
                    } else {
                        j += 1;
                    }
                    break;
                }
                // tokens that cannot appear in an import clause end an
                // unterminated statement without being consumed
                TokenKind::At
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::Colon
                | TokenKind::Number => break,
                TokenKind::Ident if starts_new_statement(t.text) => break,
                TokenKind::Ident if t.text != "from" && t.text != "as" && t.text != "type" => {
                    symbols.push(t.text.to_string());
                    end = t.end();
                }
                _ => end = t.end(),
            }
            j += 1;
        }
        out.push(ImportStatement {
            start,
            end,
            symbols,
            source: specifier,
        });
        i = j;
    }
    out
}

/// Keywords that open the next declaration, bounding an import statement
/// that is missing its semicolon.
fn starts_new_statement(text: &str) -> bool {
    matches!(
        text,
        "import"
            | "export"
            | "const"
            | "let"
            | "var"
            | "class"
            | "function"
            | "interface"
            | "enum"
            | "declare"
            | "abstract"
            | "async"
    )
}

/// Whether `source` already imports `symbol` in any import clause.
pub fn has_import(source: &str, symbol: &str) -> bool {
    imports(source)
        .iter()
        .any(|imp| imp.symbols.iter().any(|s| s == symbol))
}

/// Module specifier of the import statement binding `symbol`.
pub fn import_source_for(source: &str, symbol: &str) -> Option<String> {
    imports(source)
        .into_iter()
        .find(|imp| imp.symbols.iter().any(|s| s == symbol))
        .and_then(|imp| imp.source)
}

/// Offset just past the last import statement, if any.
pub fn last_import_end(source: &str) -> Option<TextSize> {
    imports(source).last().map(|imp| imp.end)
}

/// Insertion that adds `import { symbol } from 'package';` after the last
/// import statement, or at the top of the file when there is none.
pub(crate) fn insert_import_change(source: &str, symbol: &str, package: &str) -> InsertChange {
    match last_import_end(source) {
        Some(end) => InsertChange {
            pos: end,
            text: format!("\nimport {{ {symbol} }} from '{package}';"),
        },
        None => InsertChange {
            pos: TextSize::new(0),
            text: format!("import {{ {symbol} }} from '{package}';\n"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "\
import { enableProdMode } from '@angular/core';
import { platformBrowserDynamic } from '@angular/platform-browser-dynamic';
import { AppModule } from './app/app.module';

platformBrowserDynamic().bootstrapModule(AppModule);
";

    #[test]
    fn finds_all_statements_with_symbols_and_sources() {
        let found = imports(MAIN);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].symbols, vec!["enableProdMode"]);
        assert_eq!(found[2].source.as_deref(), Some("./app/app.module"));
    }

    #[test]
    fn has_import_matches_bound_symbols_only() {
        assert!(has_import(MAIN, "AppModule"));
        assert!(!has_import(MAIN, "OnsenModule"));
    }

    #[test]
    fn dynamic_import_is_not_a_statement() {
        let source = "const m = import('./lazy');";
        assert!(imports(source).is_empty());
    }

    #[test]
    fn side_effect_import_keeps_its_source() {
        let found = imports("import 'zone.js';");
        assert_eq!(found.len(), 1);
        assert!(found[0].symbols.is_empty());
        assert_eq!(found[0].source.as_deref(), Some("zone.js"));
    }

    #[test]
    fn missing_semicolon_does_not_swallow_following_code() {
        let source = "import { A } from './a'\n\nexport class AppModule {}\n";
        let found = imports(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].symbols, vec!["A"]);
        assert_eq!(found[0].source.as_deref(), Some("./a"));
        assert!(!has_import(source, "AppModule"));
    }

    #[test]
    fn clause_without_specifier_stops_at_the_next_declaration() {
        let source = "import { A }\n@Component({})\nclass C {}\n";
        let found = imports(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].symbols, vec!["A"]);
        assert!(!has_import(source, "Component"));
        assert!(!has_import(source, "C"));
    }

    #[test]
    fn insert_lands_after_last_import() {
        let change = insert_import_change(MAIN, "OnsenModule", "ngx-onsenui");
        let expected_pos = last_import_end(MAIN).unwrap();
        assert_eq!(change.pos, expected_pos);
        assert!(change.text.contains("from 'ngx-onsenui';"));
    }

    #[test]
    fn insert_into_empty_file_goes_to_the_top() {
        let change = insert_import_change("export class A {}", "B", "b");
        assert_eq!(change.pos, TextSize::new(0));
        assert!(change.text.ends_with('\n'));
    }
}
