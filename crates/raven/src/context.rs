//! Evaluation context configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration and host policy for a run.
///
/// Owned by the interpreter and consulted on every call and statement.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Maximum call depth (stack overflow protection)
    pub max_call_depth: usize,

    /// Interrupt flag - set to true to abort evaluation
    pub interrupt: Arc<AtomicBool>,

    /// Whether a failed `assert` halts the run
    pub fatal_test_failures: bool,

    /// Whether top-level expression statements print their value (REPL)
    pub echo: bool,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            max_call_depth: 512,
            interrupt: Arc::new(AtomicBool::new(false)),
            fatal_test_failures: false,
            echo: false,
        }
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            max_call_depth: max_depth,
            ..Default::default()
        }
    }

    /// Check if evaluation has been interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Request interruption of evaluation.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Reset the interrupt flag.
    pub fn reset_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_round_trip() {
        let ctx = EvalContext::new();
        assert!(!ctx.is_interrupted());
        let shared = ctx.clone();
        shared.interrupt();
        assert!(ctx.is_interrupted());
        ctx.reset_interrupt();
        assert!(!shared.is_interrupted());
    }

    #[test]
    fn test_custom_depth_keeps_other_defaults() {
        let ctx = EvalContext::with_max_call_depth(8);
        assert_eq!(ctx.max_call_depth, 8);
        assert!(!ctx.fatal_test_failures);
        assert!(!ctx.echo);
    }
}
