//! Logos-based lexer for the TypeScript subset the setup edits touch.
//!
//! Nothing is skipped; trivia tokens are kept so byte offsets stay exact.
//! Characters outside the token set (operators, arrows) come out as
//! [`TokenKind::Error`] tokens, which the scanners step over.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its kind, text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    /// Offset just past the token.
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }

    /// Byte range covered by the token.
    pub fn range(&self) -> TextRange {
        TextRange::new(self.offset, self.end())
    }

    /// String token text without the surrounding quotes.
    pub fn unquoted(&self) -> &str {
        if self.kind == TokenKind::Str && self.text.len() >= 2 {
            &self.text[1..self.text.len() - 1]
        } else {
            self.text
        }
    }
}

/// Public token kind, collapsing the three string forms into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    Ident,
    Str,
    Number,
    At,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Error,
}

impl TokenKind {
    /// Whitespace and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec, trivia included.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Tokenize and drop trivia.
pub fn significant(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).filter(|t| !t.kind.is_trivia()).collect()
}

/// Logos token enum - maps to TokenKind.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    SingleQuoteStr,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    DoubleQuoteStr,

    #[regex(r"`[^`]*`")]
    TemplateStr,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[token("@")]
    At,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(".")]
    Dot,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => TokenKind::Whitespace,
            LogosToken::LineComment => TokenKind::LineComment,
            LogosToken::BlockComment => TokenKind::BlockComment,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::SingleQuoteStr | LogosToken::DoubleQuoteStr | LogosToken::TemplateStr => {
                TokenKind::Str
            }
            LogosToken::Number => TokenKind::Number,
            LogosToken::At => TokenKind::At,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Semicolon => TokenKind::Semicolon,
            LogosToken::Dot => TokenKind::Dot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_cover_the_whole_input() {
        let input = "import { A } from './a'; // trailing";
        let tokens = tokenize(input);
        let total: u32 = tokens.iter().map(|t| t.text.len() as u32).sum();
        assert_eq!(total, input.len() as u32);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "import");
        assert_eq!(tokens[0].range(), TextRange::new(TextSize::new(0), TextSize::new(6)));
    }

    #[test]
    fn string_forms_collapse_to_str() {
        let tokens = significant(r#"'a' "b" `c`"#);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Str));
        assert_eq!(tokens[0].unquoted(), "a");
        assert_eq!(tokens[1].unquoted(), "b");
        assert_eq!(tokens[2].unquoted(), "c");
    }

    #[test]
    fn unknown_characters_become_error_tokens() {
        let tokens = significant("a => b");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[2].kind, TokenKind::Error);
    }
}
