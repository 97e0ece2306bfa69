//! User-facing fault reports
//!
//! A report names the fault kind, the message and the position, followed by
//! the faulting line and up to three lines before it:
//!
//! ```text
//! TypeFault: Invalid type for 'x'. Was expecting one of int. Got string
//!   --> 2:5
//!    1 | int y = 1
//! >  2 | int x = "two"
//! ```

use std::fmt::Write;

use crate::error::Fault;

/// Source lines shown per report, including the faulting one.
const CONTEXT_LINES: usize = 4;

/// Render one fault against the source it came from.
pub fn render(fault: &Fault, source: &str) -> String {
    let mut out = format!("{}: {}", fault.kind(), fault);

    let Some(span) = fault.span().filter(|span| !span.is_synthetic()) else {
        return out;
    };
    let _ = write!(out, "\n  --> {}", span);

    let lines: Vec<&str> = source.lines().collect();
    if span.line > lines.len() {
        return out;
    }
    let first = span.line.saturating_sub(CONTEXT_LINES - 1).max(1);
    let width = span.line.to_string().len();
    for number in first..=span.line {
        let marker = if number == span.line { '>' } else { ' ' };
        let _ = write!(
            out,
            "\n{} {:>width$} | {}",
            marker,
            number,
            lines[number - 1],
            width = width + 1
        );
    }
    out
}

/// Render every fault, separated by blank lines.
pub fn render_all(faults: &[Fault], source: &str) -> String {
    faults
        .iter()
        .map(|fault| render(fault, source))
        .collect::<Vec<_>>()
        .join("\n\n")
}
