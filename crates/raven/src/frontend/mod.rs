//! Raven frontend: source text to syntax tree
//!
//! ```text
//! Source → [lexer] → tokens → [parser] → Vec<Stmt> → check → interpret
//! ```
//!
//! Both stages collect their faults instead of stopping at the first one.
//! Parsing only starts once scanning is clean, so a stray character does not
//! cascade into a page of grammar errors.

pub mod lexer;
pub mod parser;

pub use lexer::scan;
pub use parser::{parse, Parser};

use tracing::info;

use crate::ast::Stmt;
use crate::error::Fault;

/// Scan and parse a whole program.
///
/// # Errors
///
/// Every SyntaxFault, or if scanning was clean, every ParseFault.
pub fn parse_source(source: &str) -> Result<Vec<Stmt>, Vec<Fault>> {
    info!(bytes = source.len(), "parsing");
    let (tokens, faults) = scan(source);
    if !faults.is_empty() {
        return Err(faults);
    }

    let (stmts, faults) = parse(tokens);
    if faults.is_empty() {
        Ok(stmts)
    } else {
        Err(faults)
    }
}
