//! Grammar-construction errors: raised once, at [`crate::parser::RuleSet::new`]
//! time, never mid-parse. Syntax errors are a different thing entirely —
//! they're [`crate::match_result::Match`] nodes, not [`GrammarError`]s.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("rule {0:?} not found in grammar")]
    UnknownRule(String),

    #[error("rule {0:?} declared both transparent (~{0}) and non-transparent")]
    ConflictingTransparency(String),
}
