//! Token metadata shared by the frontend, the AST and fault reporting

use std::fmt;

use crate::types::Type;

/// A source position. Lines and columns are 1-based; `0:0` marks a
/// synthetic position (builtins, interrupts).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column number (1-indexed)
    pub column: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Whether this span points at real source text.
    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftSquare,
    /// `]`
    RightSquare,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `;`
    Semicolon,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `%`
    Percent,
    /// `^`
    Caret,

    // Bitwise and logical
    /// `&`
    Ampersand,
    /// `&&`
    DoubleAmpersand,
    /// `|`
    Pipe,
    /// `||`
    DoublePipe,
    /// `~`
    Tilde,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `!`
    Bang,

    // Comparison and assignment
    /// `=`
    Assign,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `^=`
    BeginsWith,
    /// `$=`
    EndsWith,
    /// `~=`
    Contains,

    // Literals
    /// Integer literal
    Integer,
    /// Real literal
    Real,
    /// String literal
    String,
    /// `true`
    True,
    /// `false`
    False,
    /// `none`
    None,
    /// Identifier
    Identifier,

    // Type keywords
    /// `int`
    TypeInt,
    /// `real`
    TypeReal,
    /// `string`
    TypeString,
    /// `bool`
    TypeBool,
    /// `rational`
    TypeRational,
    /// `any`
    TypeAny,
    /// `type`
    TypeType,
    /// `array`
    TypeArray,
    /// `optional`
    TypeOptional,
    /// `func`
    Func,

    // Statement keywords
    /// `struct`
    Struct,
    /// `if`
    If,
    /// `else`
    Else,
    /// `while`
    While,
    /// `with`
    With,
    /// `defer`
    Defer,
    /// `return`
    Return,
    /// `assert`
    Assert,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Look up the keyword kind for an identifier-shaped lexeme.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "none" => TokenKind::None,
            "int" => TokenKind::TypeInt,
            "real" => TokenKind::TypeReal,
            "string" => TokenKind::TypeString,
            "bool" => TokenKind::TypeBool,
            "rational" => TokenKind::TypeRational,
            "any" => TokenKind::TypeAny,
            "type" => TokenKind::TypeType,
            "array" => TokenKind::TypeArray,
            "optional" => TokenKind::TypeOptional,
            "func" => TokenKind::Func,
            "struct" => TokenKind::Struct,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "with" => TokenKind::With,
            "defer" => TokenKind::Defer,
            "return" => TokenKind::Return,
            "assert" => TokenKind::Assert,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this kind starts a type (struct names aside).
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::TypeInt
                | TokenKind::TypeReal
                | TokenKind::TypeString
                | TokenKind::TypeBool
                | TokenKind::TypeRational
                | TokenKind::TypeAny
                | TokenKind::TypeType
                | TokenKind::TypeArray
                | TokenKind::TypeOptional
                | TokenKind::Func
        )
    }
}

/// A literal value resolved by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal
    Int(i64),
    /// Real literal
    Real(f64),
    /// String literal with escapes already applied
    Str(String),
    /// `true` / `false`
    Bool(bool),
    /// `none`
    None,
    /// A type used as a value (`int`, `array<real>`)
    Type(Type),
}

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is
    pub kind: TokenKind,

    /// The exact source text
    pub lexeme: String,

    /// The literal value, for literal tokens
    pub literal: Option<Literal>,

    /// Where the token starts
    pub span: Span,
}

impl Token {
    /// Create a token without a literal value.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            span,
        }
    }

    /// Create a literal token.
    pub fn literal(
        kind: TokenKind,
        lexeme: impl Into<String>,
        literal: Literal,
        span: Span,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: Some(literal),
            span,
        }
    }

    /// A token for names the system defines (builtins).
    pub fn system(name: &str) -> Self {
        Self::new(TokenKind::Identifier, name, Span::default())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}'", self.kind, self.lexeme)?;
        if let Some(literal) = &self.literal {
            write!(f, " {:?}", literal)?;
        }
        Ok(())
    }
}
