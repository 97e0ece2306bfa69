//! Abstract syntax for Raven programs
//!
//! Two closed node families, [`Expr`] and [`Stmt`], consumed by both the
//! type checker and the interpreter. Every node keeps the token it came from
//! so faults can point at source. Expressions additionally carry the type the
//! checker resolved for them.

mod display;

use std::cell::RefCell;
use std::rc::Rc;

use crate::token::{Literal, Span, Token};
use crate::types::Type;

// ═══════════════════════════════════════════════════════════════════════
// Operators
// ═══════════════════════════════════════════════════════════════════════

/// Binary operators with eager operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` (exact for integers)
    Div,
    /// `//` (floored integer quotient)
    FloorDiv,
    /// `%`
    Rem,
    /// `^`
    Pow,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `~` (exclusive or)
    BitXor,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `^=`
    BeginsWith,
    /// `$=`
    EndsWith,
    /// `~=`
    Contains,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

impl BinaryOp {
    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "~",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::BeginsWith => "^=",
            BinaryOp::EndsWith => "$=",
            BinaryOp::Contains => "~=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `~x`
    BitNot,
    /// `!x`
    Not,
}

impl UnaryOp {
    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
        }
    }
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
}

impl LogicalOp {
    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    /// What kind of expression this is
    pub kind: ExprKind,

    /// The originating token (operator, name, or opening token)
    pub token: Token,

    resolved: RefCell<Option<Type>>,
}

/// The expression variants.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// `left op right`
    Binary {
        /// Left operand
        left: Box<Expr>,
        /// Operator
        op: BinaryOp,
        /// Right operand
        right: Box<Expr>,
    },
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expr>,
    },
    /// `(inner)`
    Grouping(Box<Expr>),
    /// A literal value
    Literal(Literal),
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `left && right`, `left || right`
    ShortCircuit {
        /// Left operand, always evaluated
        left: Box<Expr>,
        /// Operator
        op: LogicalOp,
        /// Right operand, evaluated only when needed
        right: Box<Expr>,
    },
    /// A name reference
    Variable(String),
    /// `func(int a) int { ... }`
    Function(Rc<FunctionDecl>),
    /// `callee(args)`
    Call {
        /// The value being called
        callee: Box<Expr>,
        /// Positional arguments
        args: Vec<Expr>,
    },
    /// `collection[index]`
    Index {
        /// The array
        collection: Box<Expr>,
        /// The position
        index: Box<Expr>,
    },
    /// `Point { x: 1 }`
    Struct {
        /// Struct type name
        name: String,
        /// Explicit field initialisers, in source order
        fields: Vec<FieldInit>,
    },
    /// `object.field`
    Property {
        /// The struct instance
        object: Box<Expr>,
        /// Field name
        field: String,
    },
}

/// One `name: value` entry of a struct literal.
#[derive(Debug, Clone)]
pub struct FieldInit {
    /// Field name
    pub name: String,
    /// Token of the field name
    pub token: Token,
    /// Initial value
    pub value: Expr,
}

/// A typed function parameter.
#[derive(Debug, Clone)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Token of the parameter name
    pub token: Token,
}

/// A function literal. Shared (`Rc`) so closures can outlive the tree walk
/// that created them.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    /// Name for diagnostics, when declared with `func name(...)`
    pub name: Option<String>,
    /// Parameters in order
    pub params: Vec<Param>,
    /// Declared return type (`void` when omitted)
    pub ret: Type,
    /// Body statements
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    /// The `func` descriptor for this literal.
    pub fn signature(&self) -> Type {
        Type::func(
            self.params.iter().map(|p| p.ty.clone()).collect(),
            self.ret.clone(),
        )
    }

    /// Name used in diagnostics and scope names.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl Expr {
    /// Create an expression node.
    pub fn new(kind: ExprKind, token: Token) -> Self {
        Self {
            kind,
            token,
            resolved: RefCell::new(None),
        }
    }

    /// Where this expression starts.
    pub fn span(&self) -> Span {
        self.token.span
    }

    /// The type recorded by the checker, if it has run.
    pub fn resolved_type(&self) -> Option<Type> {
        self.resolved.borrow().clone()
    }

    /// Record the checker's type for this node.
    pub(crate) fn set_resolved_type(&self, ty: Type) {
        *self.resolved.borrow_mut() = Some(ty);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════

/// A statement node.
#[derive(Debug, Clone)]
pub struct Stmt {
    /// What kind of statement this is
    pub kind: StmtKind,

    /// The originating token (keyword or name)
    pub token: Token,
}

/// `type name = initializer`
#[derive(Debug, Clone)]
pub struct VarDecl {
    /// Variable name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Initial value; zero value of the type when absent
    pub initializer: Option<Expr>,
    /// Token of the name
    pub token: Token,
}

/// `struct Name { fields }`
#[derive(Debug, Clone)]
pub struct StructDecl {
    /// Struct type name
    pub name: String,
    /// Field declarations; initialisers are the defaults
    pub fields: Vec<VarDecl>,
}

/// The statement variants.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// An expression evaluated for effect
    Expression(Expr),
    /// `int x = 5`
    VariableDeclaration(VarDecl),
    /// `struct Point { ... }`
    StructDeclaration(Rc<StructDecl>),
    /// `x = value`
    Assignment {
        /// Target variable
        name: String,
        /// New value
        value: Expr,
    },
    /// `object.field = value`
    PropertyAssignment {
        /// The struct instance
        object: Expr,
        /// Field name
        field: String,
        /// New value
        value: Expr,
    },
    /// `while (condition) body`
    While {
        /// Loop condition
        condition: Expr,
        /// Loop body
        body: Box<Stmt>,
    },
    /// `{ ... }`
    Block(Vec<Stmt>),
    /// `defer statement`
    Defer(Rc<Stmt>),
    /// `if (condition) then else otherwise`
    If {
        /// Branch condition
        condition: Expr,
        /// Taken when truthy
        then_branch: Box<Stmt>,
        /// Taken otherwise
        else_branch: Option<Box<Stmt>>,
    },
    /// `with (type name = initializer) then else recover`
    With {
        /// The fallible declaration
        declaration: VarDecl,
        /// Runs with the variable bound when the initializer succeeds
        then_branch: Box<Stmt>,
        /// Runs when the initializer faults
        else_branch: Option<Box<Stmt>>,
    },
    /// `return value`
    Return(Option<Expr>),
    /// `assert condition`
    TestAssert(Expr),
}

impl Stmt {
    /// Create a statement node.
    pub fn new(kind: StmtKind, token: Token) -> Self {
        Self { kind, token }
    }

    /// Where this statement starts.
    pub fn span(&self) -> Span {
        self.token.span
    }

    /// Whether every path through this statement ends in `return`.
    pub fn always_returns(&self) -> bool {
        match &self.kind {
            StmtKind::Return(_) => true,
            StmtKind::Block(stmts) => always_returns(stmts),
            StmtKind::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            }
            | StmtKind::With {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => then_branch.always_returns() && else_branch.always_returns(),
            _ => false,
        }
    }
}

/// Whether a statement list always ends in `return`.
pub fn always_returns(stmts: &[Stmt]) -> bool {
    stmts.iter().any(Stmt::always_returns)
}
