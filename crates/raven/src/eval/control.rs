//! Control flow mechanism for return, faults and exit

use crate::error::Fault;
use crate::Value;

/// How a statement completed.
///
/// `Return` travels up through blocks, loops and branches until the
/// enclosing function call catches it.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    /// Ran to completion; continue with the next statement.
    Normal,

    /// A `return` statement executed with this value.
    Return(Value),
}

impl ControlFlow {
    /// Create a return.
    pub fn return_value(value: Value) -> Self {
        ControlFlow::Return(value)
    }

    /// Whether this is a `return` in flight.
    pub fn is_return(&self) -> bool {
        matches!(self, ControlFlow::Return(_))
    }
}

/// Abnormal completion that unwinds past function boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
    /// A runtime fault. `with` may intercept it.
    Fault(Fault),

    /// The program asked to terminate with this exit code.
    Exit(i32),
}

impl From<Fault> for Unwind {
    fn from(fault: Fault) -> Self {
        Unwind::Fault(fault)
    }
}

/// Result of evaluating an expression or executing a statement.
pub type EvalResult<T> = std::result::Result<T, Unwind>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;

    #[test]
    fn test_return_value() {
        let cf = ControlFlow::return_value(Value::Int(42));
        assert_eq!(cf, ControlFlow::Return(Value::Int(42)));
        assert!(cf.is_return());
        assert!(!ControlFlow::Normal.is_return());
    }

    #[test]
    fn test_fault_converts_to_unwind() {
        let unwind: Unwind = Fault::DivisionByZero {
            span: Span::new(1, 1),
        }
        .into();
        match unwind {
            Unwind::Fault(fault) => assert_eq!(fault.kind(), "DivisionByZero"),
            Unwind::Exit(_) => panic!("Expected Fault"),
        }
    }
}
