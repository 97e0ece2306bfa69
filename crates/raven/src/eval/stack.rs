//! Native stack growth for deeply recursive Raven programs
//!
//! Call depth is bounded by `EvalContext::max_call_depth`, but each Raven
//! call costs several native frames. Growing the stack on demand keeps that
//! bound reachable on small thread stacks (test threads, embedders).

/// Run `f`, first growing the native stack if little of it remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Grow once less than this remains (128KB)
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each new stack segment (1MB)
    const SEGMENT: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_native_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }
}
