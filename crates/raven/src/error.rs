//! Fault types for Raven checking and evaluation

use thiserror::Error;

use crate::token::Span;
use crate::types::Type;

/// A fault raised while scanning, parsing, checking or running a program.
///
/// Every kind except [`Fault::Interrupted`] points at the source position
/// of the token that caused it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Fault {
    /// Lexical error
    #[error("{message}")]
    Syntax {
        /// Description
        message: String,
        /// Location
        span: Span,
    },

    /// Grammar error
    #[error("{message}")]
    Parse {
        /// Description
        message: String,
        /// Location
        span: Span,
    },

    /// Static type incompatibility
    #[error("{message}")]
    Type {
        /// Description
        message: String,
        /// Location
        span: Span,
    },

    /// Illegal `return` or `defer` placement
    #[error("{message}")]
    Scope {
        /// Description
        message: String,
        /// Location
        span: Span,
    },

    /// Call arity mismatch
    #[error("Expected {expected} arguments but got {got}")]
    Argument {
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
        /// Location
        span: Span,
    },

    /// Call on something that is not a function
    #[error("Can only call functions, '{type_name}' is not callable")]
    NotCallable {
        /// Type of the callee
        type_name: String,
        /// Location
        span: Span,
    },

    /// Name defined twice in one scope
    #[error("'{name}' is already defined in this scope")]
    DuplicateDefinition {
        /// The name
        name: String,
        /// Location
        span: Span,
    },

    /// Name not found in any enclosing scope
    #[error("Undefined variable '{name}'")]
    UndefinedVariable {
        /// The name
        name: String,
        /// Location
        span: Span,
    },

    /// Field not declared by the struct
    #[error("'{type_name}' has no field '{field}'")]
    UndefinedField {
        /// Field name
        field: String,
        /// Struct type name
        type_name: String,
        /// Location
        span: Span,
    },

    /// Array index outside `0..len`
    #[error("Index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Array length
        len: usize,
        /// Location
        span: Span,
    },

    /// Division or modulo by zero
    #[error("Division by zero")]
    DivisionByZero {
        /// Location
        span: Span,
    },

    /// Overflow or an operation with no result in the operand domain
    #[error("{message}")]
    Arithmetic {
        /// Description
        message: String,
        /// Location
        span: Span,
    },

    /// Call depth limit exceeded
    #[error("Stack overflow: call depth {depth} exceeds maximum {max}")]
    StackOverflow {
        /// Depth reached
        depth: usize,
        /// Configured limit
        max: usize,
        /// Location
        span: Span,
    },

    /// Builtin misuse and other dynamic failures
    #[error("{message}")]
    Runtime {
        /// Description
        message: String,
        /// Location
        span: Span,
    },

    /// `assert` on a false condition
    #[error("Assertion failed: {message}")]
    TestFailure {
        /// The asserted expression
        message: String,
        /// Location
        span: Span,
    },

    /// The host asked evaluation to stop
    #[error("Execution interrupted")]
    Interrupted,
}

impl Fault {
    /// A TypeFault with a free-form message.
    pub fn type_fault(message: impl Into<String>, span: Span) -> Self {
        Fault::Type {
            message: message.into(),
            span,
        }
    }

    /// A TypeFault for a value that matched none of the accepted types.
    pub fn mismatch(subject: &str, expected: &[Type], got: &Type, span: Span) -> Self {
        let expected = expected
            .iter()
            .map(Type::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Fault::type_fault(
            format!(
                "Invalid type for '{}'. Was expecting one of {}. Got {}",
                subject, expected, got
            ),
            span,
        )
    }

    /// A ScopeFault.
    pub fn scope(message: impl Into<String>, span: Span) -> Self {
        Fault::Scope {
            message: message.into(),
            span,
        }
    }

    /// A ParseFault.
    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Fault::Parse {
            message: message.into(),
            span,
        }
    }

    /// A SyntaxFault.
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Fault::Syntax {
            message: message.into(),
            span,
        }
    }

    /// A RuntimeFault.
    pub fn runtime(message: impl Into<String>, span: Span) -> Self {
        Fault::Runtime {
            message: message.into(),
            span,
        }
    }

    /// An ArithmeticFault.
    pub fn arithmetic(message: impl Into<String>, span: Span) -> Self {
        Fault::Arithmetic {
            message: message.into(),
            span,
        }
    }

    /// The user-visible name of this fault kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::Syntax { .. } => "SyntaxFault",
            Fault::Parse { .. } => "ParseFault",
            Fault::Type { .. } => "TypeFault",
            Fault::Scope { .. } => "ScopeFault",
            Fault::Argument { .. } => "ArgumentFault",
            Fault::NotCallable { .. } => "NotCallable",
            Fault::DuplicateDefinition { .. } => "DuplicateDefinition",
            Fault::UndefinedVariable { .. } => "UndefinedVariable",
            Fault::UndefinedField { .. } => "UndefinedField",
            Fault::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            Fault::DivisionByZero { .. } => "DivisionByZero",
            Fault::Arithmetic { .. } => "ArithmeticFault",
            Fault::StackOverflow { .. } => "StackOverflow",
            Fault::Runtime { .. } => "RuntimeFault",
            Fault::TestFailure { .. } => "TestFailure",
            Fault::Interrupted => "Interrupted",
        }
    }

    /// Where the fault happened, if it has a location.
    pub fn span(&self) -> Option<Span> {
        match self {
            Fault::Syntax { span, .. }
            | Fault::Parse { span, .. }
            | Fault::Type { span, .. }
            | Fault::Scope { span, .. }
            | Fault::Argument { span, .. }
            | Fault::NotCallable { span, .. }
            | Fault::DuplicateDefinition { span, .. }
            | Fault::UndefinedVariable { span, .. }
            | Fault::UndefinedField { span, .. }
            | Fault::IndexOutOfBounds { span, .. }
            | Fault::DivisionByZero { span }
            | Fault::Arithmetic { span, .. }
            | Fault::StackOverflow { span, .. }
            | Fault::Runtime { span, .. }
            | Fault::TestFailure { span, .. } => Some(*span),
            Fault::Interrupted => None,
        }
    }

    /// Whether a `with` statement may recover from this fault.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Fault::Interrupted)
    }
}

/// Errors from environment operations, before a source location is known.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// Name already defined in the target scope
    #[error("'{name}' is already defined in this scope")]
    DuplicateDefinition {
        /// The name
        name: String,
    },

    /// Name not found in the scope chain
    #[error("Undefined variable '{name}'")]
    UndefinedVariable {
        /// The name
        name: String,
    },

    /// `defer` with no enclosing function call
    #[error("Cannot defer outside of a function")]
    DeferOutsideFunction,
}

impl EnvironmentError {
    /// Attach a source location.
    pub fn at(self, span: Span) -> Fault {
        match self {
            EnvironmentError::DuplicateDefinition { name } => {
                Fault::DuplicateDefinition { name, span }
            }
            EnvironmentError::UndefinedVariable { name } => Fault::UndefinedVariable { name, span },
            EnvironmentError::DeferOutsideFunction => {
                Fault::scope("Cannot defer outside of a function", span)
            }
        }
    }
}

/// Result type alias for Raven operations
pub type Result<T> = std::result::Result<T, Fault>;
