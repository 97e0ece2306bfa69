//! Recursive-descent parser
//!
//! Turns the token stream into top-level [`Stmt`]s. On a ParseFault the
//! parser records it, skips ahead to the next line or statement keyword and
//! carries on, so one run reports every grammar error.

use std::rc::Rc;

use tracing::debug;

use crate::ast::{
    BinaryOp, Expr, ExprKind, FieldInit, FunctionDecl, LogicalOp, Param, Stmt, StmtKind,
    StructDecl, UnaryOp, VarDecl,
};
use crate::error::{Fault, Result};
use crate::token::{Literal, Token, TokenKind};
use crate::types::Type;

/// Parser state over a scanned token stream.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    block_depth: usize,
    faults: Vec<Fault>,
}

impl Parser {
    /// Create a parser. `tokens` must end with an `Eof` token.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }
        Self {
            tokens,
            current: 0,
            block_depth: 0,
            faults: Vec::new(),
        }
    }

    /// Parse the whole program.
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<Fault>) {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        (stmts, self.faults)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Declarations
    // ═══════════════════════════════════════════════════════════════════

    /// Parse one declaration, recovering from a fault.
    fn declaration(&mut self) -> Option<Stmt> {
        match self.try_declaration() {
            Ok(stmt) => {
                while self.matches(&[TokenKind::Semicolon]) {}
                Some(stmt)
            }
            Err(fault) => {
                debug!(fault = %fault, "parse fault, synchronising");
                self.faults.push(fault);
                self.synchronize();
                None
            }
        }
    }

    fn try_declaration(&mut self) -> Result<Stmt> {
        if self.check(TokenKind::Struct) {
            return self.struct_declaration();
        }
        if self.check(TokenKind::Func) && self.check_next(TokenKind::Identifier) {
            return self.function_declaration();
        }
        if self.starts_declaration() {
            let decl = self.variable_declaration()?;
            let token = decl.token.clone();
            return Ok(Stmt::new(StmtKind::VariableDeclaration(decl), token));
        }
        self.statement()
    }

    /// A type keyword (other than a `func(` literal) or `Name name`.
    fn starts_declaration(&self) -> bool {
        let kind = self.peek().kind;
        match kind {
            TokenKind::Func => self.check_next(TokenKind::Less),
            TokenKind::Identifier => self.check_next(TokenKind::Identifier),
            _ => kind.is_type_keyword(),
        }
    }

    /// `struct Name { type field (= default)? ... }`
    fn struct_declaration(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        let name = self.consume(TokenKind::Identifier, "Expected struct name")?;
        self.consume(TokenKind::LeftBrace, "Expected '{' after struct name")?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            fields.push(self.variable_declaration()?);
            while self.matches(&[TokenKind::Semicolon, TokenKind::Comma]) {}
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after struct fields")?;

        let decl = StructDecl {
            name: name.lexeme.clone(),
            fields,
        };
        Ok(Stmt::new(StmtKind::StructDeclaration(Rc::new(decl)), keyword))
    }

    /// `func name(params) type? { body }`, sugar for a variable holding a
    /// function literal.
    fn function_declaration(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        let name = self.consume(TokenKind::Identifier, "Expected function name")?;
        let func = self.function_body(Some(name.lexeme.clone()))?;
        let ty = func.signature();

        let initializer = Expr::new(ExprKind::Function(Rc::new(func)), keyword);
        let decl = VarDecl {
            name: name.lexeme.clone(),
            ty,
            initializer: Some(initializer),
            token: name.clone(),
        };
        Ok(Stmt::new(StmtKind::VariableDeclaration(decl), name))
    }

    /// `type name (= initializer)?`
    fn variable_declaration(&mut self) -> Result<VarDecl> {
        let ty = self.parse_type()?;
        let name = self.consume(TokenKind::Identifier, "Expected variable name")?;
        let initializer = if self.matches(&[TokenKind::Assign]) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(VarDecl {
            name: name.lexeme.clone(),
            ty,
            initializer,
            token: name,
        })
    }

    /// `(params) type? { body }` after `func` (and the name, if any).
    fn function_body(&mut self, name: Option<String>) -> Result<FunctionDecl> {
        self.consume(TokenKind::LeftParen, "Expected '(' before parameters")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let ty = self.parse_type()?;
                let token = self.consume(TokenKind::Identifier, "Expected parameter name")?;
                params.push(Param {
                    name: token.lexeme.clone(),
                    ty,
                    token,
                });
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;

        let ret = if self.check(TokenKind::LeftBrace) {
            Type::Void
        } else {
            self.parse_type()?
        };
        let body = self.block()?;

        Ok(FunctionDecl {
            name,
            params,
            ret,
            body,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Types
    // ═══════════════════════════════════════════════════════════════════

    fn parse_type(&mut self) -> Result<Type> {
        let token = self.advance();
        let ty = match token.kind {
            TokenKind::TypeInt => Type::Int,
            TokenKind::TypeReal => Type::Real,
            TokenKind::TypeString => Type::String,
            TokenKind::TypeBool => Type::Bool,
            TokenKind::TypeRational => Type::Rational,
            TokenKind::TypeAny => Type::Any,
            TokenKind::TypeType => Type::Type,
            TokenKind::TypeArray => Type::array(self.type_argument()?),
            TokenKind::TypeOptional => Type::optional(self.type_argument()?),
            TokenKind::Func => self.function_type()?,
            TokenKind::Identifier => Type::Struct(token.lexeme),
            _ => return Err(self.fault_at(&token, "Expected a type")),
        };
        Ok(ty)
    }

    /// `< type >`
    fn type_argument(&mut self) -> Result<Type> {
        self.consume(TokenKind::Less, "Expected '<' after type name")?;
        let ty = self.parse_type()?;
        self.close_type_arguments()?;
        Ok(ty)
    }

    /// `< ( (type ("," type)*)? )? type? >` after `func`
    fn function_type(&mut self) -> Result<Type> {
        self.consume(TokenKind::Less, "Expected '<' after 'func'")?;
        let mut params = Vec::new();
        if self.matches(&[TokenKind::LeftParen]) {
            if !self.check(TokenKind::RightParen) {
                loop {
                    params.push(self.parse_type()?);
                    if !self.matches(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, "Expected ')' after parameter types")?;
        }
        let ret = if self.check_closing_angle() {
            Type::Void
        } else {
            self.parse_type()?
        };
        self.close_type_arguments()?;
        Ok(Type::func(params, ret))
    }

    fn check_closing_angle(&self) -> bool {
        self.check(TokenKind::Greater) || self.check(TokenKind::ShiftRight)
    }

    /// Consume one `>`. A `>>` closing two argument lists is split, and the
    /// second half is left in place for the outer list.
    fn close_type_arguments(&mut self) -> Result<()> {
        if self.check(TokenKind::ShiftRight) {
            let token = &mut self.tokens[self.current];
            token.kind = TokenKind::Greater;
            token.lexeme = ">".to_string();
            token.span.column += 1;
            return Ok(());
        }
        self.consume(TokenKind::Greater, "Expected '>' after type argument")?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════

    fn statement(&mut self) -> Result<Stmt> {
        match self.peek().kind {
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::With => self.with_statement(),
            TokenKind::Defer => {
                let keyword = self.advance();
                let deferred = self.statement()?;
                Ok(Stmt::new(StmtKind::Defer(Rc::new(deferred)), keyword))
            }
            TokenKind::Return => self.return_statement(),
            TokenKind::Assert => {
                let keyword = self.advance();
                let condition = self.expression()?;
                Ok(Stmt::new(StmtKind::TestAssert(condition), keyword))
            }
            TokenKind::LeftBrace => {
                let brace = self.peek().clone();
                let stmts = self.block()?;
                Ok(Stmt::new(StmtKind::Block(stmts), brace))
            }
            _ => self.expression_statement(),
        }
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        self.consume(TokenKind::LeftParen, "Expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after if condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = self.else_branch()?;
        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            keyword,
        ))
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        self.consume(TokenKind::LeftParen, "Expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after while condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::new(StmtKind::While { condition, body }, keyword))
    }

    /// `with (type name = initializer) statement (else statement)?`
    fn with_statement(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        self.consume(TokenKind::LeftParen, "Expected '(' after 'with'")?;
        let declaration = self.variable_declaration()?;
        if declaration.initializer.is_none() {
            return Err(Fault::parse(
                "Expected an initializer in 'with' declaration",
                declaration.token.span,
            ));
        }
        self.consume(TokenKind::RightParen, "Expected ')' after with declaration")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = self.else_branch()?;
        Ok(Stmt::new(
            StmtKind::With {
                declaration,
                then_branch,
                else_branch,
            },
            keyword,
        ))
    }

    fn else_branch(&mut self) -> Result<Option<Box<Stmt>>> {
        if self.matches(&[TokenKind::Else]) {
            Ok(Some(Box::new(self.statement()?)))
        } else {
            Ok(None)
        }
    }

    /// The value belongs to the `return` only if it starts on the same line.
    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        let next = self.peek();
        let has_value = next.span.line == keyword.span.line
            && !matches!(
                next.kind,
                TokenKind::RightBrace | TokenKind::Semicolon | TokenKind::Eof
            );
        let value = if has_value {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Stmt::new(StmtKind::Return(value), keyword))
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        self.consume(TokenKind::LeftBrace, "Expected '{' to start a block")?;
        self.block_depth += 1;
        let stmts = self.block_statements();
        self.block_depth -= 1;
        stmts
    }

    fn block_statements(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after block")?;
        Ok(stmts)
    }

    /// An expression, or an assignment if followed by `=`.
    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.expression()?;
        if !self.check(TokenKind::Assign) {
            let token = expr.token.clone();
            return Ok(Stmt::new(StmtKind::Expression(expr), token));
        }

        let equals = self.advance();
        let value = self.expression()?;
        let token = expr.token.clone();
        match expr.kind {
            ExprKind::Variable(name) => Ok(Stmt::new(StmtKind::Assignment { name, value }, token)),
            ExprKind::Property { object, field } => Ok(Stmt::new(
                StmtKind::PropertyAssignment {
                    object: *object,
                    field,
                    value,
                },
                token,
            )),
            _ => Err(Fault::parse("Invalid assignment target", equals.span)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════

    fn expression(&mut self) -> Result<Expr> {
        self.logical(LogicalOp::Or)
    }

    fn logical(&mut self, op: LogicalOp) -> Result<Expr> {
        let (kind, next) = match op {
            LogicalOp::Or => (TokenKind::DoublePipe, Some(LogicalOp::And)),
            LogicalOp::And => (TokenKind::DoubleAmpersand, None),
        };
        let operand = |parser: &mut Self| match next {
            Some(next) => parser.logical(next),
            None => parser.equality(),
        };

        let mut expr = operand(self)?;
        while self.check(kind) {
            let token = self.advance();
            let right = operand(self)?;
            expr = Expr::new(
                ExprKind::ShortCircuit {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                token,
            );
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.binary_level(Self::comparison, |kind| match kind {
            TokenKind::Equal => Some(BinaryOp::Equal),
            TokenKind::NotEqual => Some(BinaryOp::NotEqual),
            TokenKind::BeginsWith => Some(BinaryOp::BeginsWith),
            TokenKind::EndsWith => Some(BinaryOp::EndsWith),
            TokenKind::Contains => Some(BinaryOp::Contains),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.binary_level(Self::bit_or, |kind| match kind {
            TokenKind::Less => Some(BinaryOp::Less),
            TokenKind::LessEqual => Some(BinaryOp::LessEqual),
            TokenKind::Greater => Some(BinaryOp::Greater),
            TokenKind::GreaterEqual => Some(BinaryOp::GreaterEqual),
            _ => None,
        })
    }

    fn bit_or(&mut self) -> Result<Expr> {
        self.binary_level(Self::bit_and, |kind| match kind {
            TokenKind::Pipe => Some(BinaryOp::BitOr),
            TokenKind::Tilde => Some(BinaryOp::BitXor),
            _ => None,
        })
    }

    fn bit_and(&mut self) -> Result<Expr> {
        self.binary_level(Self::shift, |kind| match kind {
            TokenKind::Ampersand => Some(BinaryOp::BitAnd),
            _ => None,
        })
    }

    fn shift(&mut self) -> Result<Expr> {
        self.binary_level(Self::term, |kind| match kind {
            TokenKind::ShiftLeft => Some(BinaryOp::ShiftLeft),
            TokenKind::ShiftRight => Some(BinaryOp::ShiftRight),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary_level(Self::factor, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn factor(&mut self) -> Result<Expr> {
        self.binary_level(Self::power, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::DoubleSlash => Some(BinaryOp::FloorDiv),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    /// `unary ("^" power)?`, right associative.
    fn power(&mut self) -> Result<Expr> {
        let base = self.unary()?;
        if !self.check(TokenKind::Caret) {
            return Ok(base);
        }
        let token = self.advance();
        let exponent = self.power()?;
        Ok(Expr::new(
            ExprKind::Binary {
                left: Box::new(base),
                op: BinaryOp::Pow,
                right: Box::new(exponent),
            },
            token,
        ))
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr>,
        operator: fn(TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expr> {
        let mut expr = operand(self)?;
        while let Some(op) = operator(self.peek().kind) {
            let token = self.advance();
            let right = operand(self)?;
            expr = Expr::new(
                ExprKind::Binary {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                token,
            );
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.postfix(),
        };
        let token = self.advance();
        let operand = self.unary()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            token,
        ))
    }

    /// Calls, indexing and property access. `(` and `[` only continue an
    /// expression on the line where it left off.
    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            let same_line = self.peek().span.line == self.previous().span.line;
            if same_line && self.check(TokenKind::LeftParen) {
                self.advance();
                let args = self.arguments()?;
                let token = expr.token.clone();
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    token,
                );
            } else if same_line && self.check(TokenKind::LeftSquare) {
                let bracket = self.advance();
                let index = self.expression()?;
                self.consume(TokenKind::RightSquare, "Expected ']' after index")?;
                expr = Expr::new(
                    ExprKind::Index {
                        collection: Box::new(expr),
                        index: Box::new(index),
                    },
                    bracket,
                );
            } else if self.matches(&[TokenKind::Dot]) {
                let name = self.consume(TokenKind::Identifier, "Expected property name after '.'")?;
                expr = Expr::new(
                    ExprKind::Property {
                        object: Box::new(expr),
                        field: name.lexeme.clone(),
                    },
                    name,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Integer
            | TokenKind::Real
            | TokenKind::String
            | TokenKind::True
            | TokenKind::False
            | TokenKind::None => {
                self.advance();
                let literal = token
                    .literal
                    .clone()
                    .ok_or_else(|| self.fault_at(&token, "Malformed literal"))?;
                Ok(Expr::new(ExprKind::Literal(literal), token))
            }
            TokenKind::Identifier if self.starts_struct_literal() => self.struct_literal(),
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::new(ExprKind::Variable(token.lexeme.clone()), token))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
                Ok(Expr::new(ExprKind::Grouping(Box::new(inner)), token))
            }
            TokenKind::LeftSquare => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(TokenKind::RightSquare) && !self.is_at_end() {
                    elements.push(self.expression()?);
                    if !self.matches(&[TokenKind::Comma]) {
                        break;
                    }
                }
                self.consume(TokenKind::RightSquare, "Expected ']' after array elements")?;
                Ok(Expr::new(ExprKind::Array(elements), token))
            }
            TokenKind::Func if self.check_next(TokenKind::LeftParen) => {
                self.advance();
                let func = self.function_body(None)?;
                Ok(Expr::new(ExprKind::Function(Rc::new(func)), token))
            }
            kind if kind.is_type_keyword() => {
                let ty = self.parse_type()?;
                Ok(Expr::new(ExprKind::Literal(Literal::Type(ty)), token))
            }
            _ => Err(self.fault_at(&token, "Expected expression")),
        }
    }

    /// `Name {` on one line, followed by `}` or `field:`.
    fn starts_struct_literal(&self) -> bool {
        let brace = self.token_at(1);
        if brace.kind != TokenKind::LeftBrace || brace.span.line != self.peek().span.line {
            return false;
        }
        let first = self.token_at(2);
        first.kind == TokenKind::RightBrace
            || (first.kind == TokenKind::Identifier && self.token_at(3).kind == TokenKind::Colon)
    }

    /// `Name { field: value, ... }`
    fn struct_literal(&mut self) -> Result<Expr> {
        let name = self.advance();
        self.consume(TokenKind::LeftBrace, "Expected '{' after struct name")?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            let field = self.consume(TokenKind::Identifier, "Expected field name")?;
            self.consume(TokenKind::Colon, "Expected ':' after field name")?;
            let value = self.expression()?;
            fields.push(FieldInit {
                name: field.lexeme.clone(),
                token: field,
                value,
            });
            self.matches(&[TokenKind::Comma]);
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after struct fields")?;
        Ok(Expr::new(
            ExprKind::Struct {
                name: name.lexeme.clone(),
                fields,
            },
            name,
        ))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Token Helpers
    // ═══════════════════════════════════════════════════════════════════

    fn peek(&self) -> &Token {
        self.token_at(0)
    }

    /// The token `offset` places ahead, clamped to `Eof`.
    fn token_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.current + offset).min(last)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_next(&self, kind: TokenKind) -> bool {
        self.token_at(1).kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.contains(&self.peek().kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.fault_at(self.peek(), message))
        }
    }

    fn fault_at(&self, token: &Token, message: &str) -> Fault {
        let found = if token.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            format!("'{}'", token.lexeme)
        };
        Fault::parse(format!("{}, found {}", message, found), token.span)
    }

    /// Skip to a point where a new statement can start: after a semicolon,
    /// at the start of a line, or at a statement keyword. Inside a block the
    /// closing brace is left for the block to consume.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon
                || self.peek().span.line > self.previous().span.line
            {
                return;
            }
            match self.peek().kind {
                TokenKind::Struct
                | TokenKind::Func
                | TokenKind::If
                | TokenKind::While
                | TokenKind::With
                | TokenKind::Defer
                | TokenKind::Return
                | TokenKind::Assert => return,
                TokenKind::RightBrace if self.block_depth > 0 => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

/// Parse a token stream into top-level statements.
pub fn parse(tokens: Vec<Token>) -> (Vec<Stmt>, Vec<Fault>) {
    Parser::new(tokens).parse()
}
