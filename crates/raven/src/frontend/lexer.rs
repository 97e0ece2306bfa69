//! Lexical scanning
//!
//! `logos` recognises the raw lexemes; this module turns them into
//! [`Token`]s with line/column spans, resolved literal values and keyword
//! kinds. Lexical faults are collected and scanning carries on, except for
//! an unterminated string, which swallows the rest of the source.

use logos::Logos;

use crate::error::Fault;
use crate::token::{Literal, Span, Token, TokenKind};

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Raw {
    #[regex(r"''[^\n]*", logos::skip)]
    Comment,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftSquare,
    #[token("]")]
    RightSquare,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,

    #[token("&")]
    Ampersand,
    #[token("&&")]
    DoubleAmpersand,
    #[token("|")]
    Pipe,
    #[token("||")]
    DoublePipe,
    #[token("~")]
    Tilde,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    #[token("!")]
    Bang,

    #[token("=")]
    Assign,
    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("^=")]
    BeginsWith,
    #[token("$=")]
    EndsWith,
    #[token("~=")]
    Contains,

    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"[0-9]+\.[0-9]+")]
    Real,
    #[regex(r#""([^"\\]|\\.|\\\n)*""#)]
    String,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,
}

impl Raw {
    /// Token kind for lexemes that map one to one.
    fn kind(self) -> TokenKind {
        match self {
            Raw::LeftParen => TokenKind::LeftParen,
            Raw::RightParen => TokenKind::RightParen,
            Raw::LeftBrace => TokenKind::LeftBrace,
            Raw::RightBrace => TokenKind::RightBrace,
            Raw::LeftSquare => TokenKind::LeftSquare,
            Raw::RightSquare => TokenKind::RightSquare,
            Raw::Comma => TokenKind::Comma,
            Raw::Dot => TokenKind::Dot,
            Raw::Colon => TokenKind::Colon,
            Raw::Semicolon => TokenKind::Semicolon,
            Raw::Plus => TokenKind::Plus,
            Raw::Minus => TokenKind::Minus,
            Raw::Star => TokenKind::Star,
            Raw::Slash => TokenKind::Slash,
            Raw::DoubleSlash => TokenKind::DoubleSlash,
            Raw::Percent => TokenKind::Percent,
            Raw::Caret => TokenKind::Caret,
            Raw::Ampersand => TokenKind::Ampersand,
            Raw::DoubleAmpersand => TokenKind::DoubleAmpersand,
            Raw::Pipe => TokenKind::Pipe,
            Raw::DoublePipe => TokenKind::DoublePipe,
            Raw::Tilde => TokenKind::Tilde,
            Raw::ShiftLeft => TokenKind::ShiftLeft,
            Raw::ShiftRight => TokenKind::ShiftRight,
            Raw::Bang => TokenKind::Bang,
            Raw::Assign => TokenKind::Assign,
            Raw::Equal => TokenKind::Equal,
            Raw::NotEqual => TokenKind::NotEqual,
            Raw::Less => TokenKind::Less,
            Raw::LessEqual => TokenKind::LessEqual,
            Raw::Greater => TokenKind::Greater,
            Raw::GreaterEqual => TokenKind::GreaterEqual,
            Raw::BeginsWith => TokenKind::BeginsWith,
            Raw::EndsWith => TokenKind::EndsWith,
            Raw::Contains => TokenKind::Contains,
            Raw::Integer => TokenKind::Integer,
            Raw::Real => TokenKind::Real,
            Raw::String => TokenKind::String,
            Raw::Word | Raw::Comment => TokenKind::Identifier,
        }
    }
}

/// Maps byte offsets to 1-based line/column positions.
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    fn span(&self, offset: usize) -> Span {
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];
        let column = self.source[start..offset].chars().count() + 1;
        Span::new(line, column)
    }
}

/// Scan `source` into tokens, ending with an `Eof` token.
///
/// Returns every token that could be recognised together with the
/// SyntaxFaults found along the way.
pub fn scan(source: &str) -> (Vec<Token>, Vec<Fault>) {
    let index = LineIndex::new(source);
    let mut lexer = Raw::lexer(source);
    let mut tokens = Vec::new();
    let mut faults = Vec::new();

    while let Some(raw) = lexer.next() {
        let slice = lexer.slice();
        let span = index.span(lexer.span().start);

        let raw = match raw {
            Ok(raw) => raw,
            Err(()) if slice.starts_with('"') => {
                faults.push(Fault::syntax("Unterminated string", span));
                break;
            }
            Err(()) => {
                faults.push(Fault::syntax(
                    format!("Unexpected character '{}'", slice),
                    span,
                ));
                continue;
            }
        };

        match token(raw, slice, span) {
            Ok(token) => tokens.push(token),
            Err(fault) => faults.push(fault),
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "", index.span(source.len())));
    (tokens, faults)
}

fn token(raw: Raw, slice: &str, span: Span) -> Result<Token, Fault> {
    let token = match raw {
        Raw::Integer => {
            let value = slice.parse::<i64>().map_err(|_| {
                Fault::syntax(format!("Integer literal '{}' is too large", slice), span)
            })?;
            Token::literal(TokenKind::Integer, slice, Literal::Int(value), span)
        }
        Raw::Real => {
            let value = slice
                .parse::<f64>()
                .map_err(|_| Fault::syntax(format!("Invalid real literal '{}'", slice), span))?;
            Token::literal(TokenKind::Real, slice, Literal::Real(value), span)
        }
        Raw::String => {
            let body = &slice[1..slice.len() - 1];
            Token::literal(
                TokenKind::String,
                slice,
                Literal::Str(unescape(body, span)?),
                span,
            )
        }
        Raw::Word => match TokenKind::keyword(slice) {
            Some(TokenKind::True) => {
                Token::literal(TokenKind::True, slice, Literal::Bool(true), span)
            }
            Some(TokenKind::False) => {
                Token::literal(TokenKind::False, slice, Literal::Bool(false), span)
            }
            Some(TokenKind::None) => Token::literal(TokenKind::None, slice, Literal::None, span),
            Some(kind) => Token::new(kind, slice, span),
            None => Token::new(TokenKind::Identifier, slice, span),
        },
        other => Token::new(other.kind(), slice, span),
    };
    Ok(token)
}

fn unescape(body: &str, span: Span) -> Result<String, Fault> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                return Err(Fault::syntax(
                    format!("Unknown escape sequence '\\{}'", other),
                    span,
                ))
            }
            None => return Err(Fault::syntax("Unterminated escape sequence", span)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, faults) = scan(source);
        assert!(faults.is_empty(), "unexpected faults: {:?}", faults);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a // b ^= c >> 1"),
            vec![
                TokenKind::Identifier,
                TokenKind::DoubleSlash,
                TokenKind::Identifier,
                TokenKind::BeginsWith,
                TokenKind::Identifier,
                TokenKind::ShiftRight,
                TokenKind::Integer,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("int x = 1 '' the answer\nx"),
            vec![
                TokenKind::TypeInt,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        let (tokens, _) = scan(r#"42 3.5 "a\tb" true none"#);
        let literals: Vec<_> = tokens.iter().filter_map(|t| t.literal.clone()).collect();
        assert_eq!(
            literals,
            vec![
                Literal::Int(42),
                Literal::Real(3.5),
                Literal::Str("a\tb".to_string()),
                Literal::Bool(true),
                Literal::None,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let (tokens, _) = scan("int x\n  y");
        assert_eq!(tokens[0].span, Span::new(1, 1));
        assert_eq!(tokens[1].span, Span::new(1, 5));
        assert_eq!(tokens[2].span, Span::new(2, 3));
    }

    #[test]
    fn test_multiline_string_advances_lines() {
        let (tokens, faults) = scan("\"a\nb\" x");
        assert!(faults.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::Str("a\nb".to_string())));
        assert_eq!(tokens[1].span, Span::new(2, 4));
    }

    #[test]
    fn test_faults_are_collected() {
        let (tokens, faults) = scan("x @ y # z");
        assert_eq!(faults.len(), 2);
        assert_eq!(faults[0].kind(), "SyntaxFault");
        assert_eq!(faults[0].span(), Some(Span::new(1, 3)));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_unterminated_string() {
        let (_, faults) = scan("print(\"oops");
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].to_string(), "Unterminated string");
    }
}
