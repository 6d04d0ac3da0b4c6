//! A packrat PEG parsing engine with transparent left-recursion support
//! and bounded syntax-error recovery.
//!
//! Grammars are built directly as [`clause::Clause`] trees (see the
//! constructor functions in [`clause`]) and validated into a
//! [`parser::RuleSet`]. A [`parser::Parser`] then runs a two-phase parse
//! over an input string: phase one tries to match without recovery; if
//! the result doesn't span the whole input, phase two re-runs with
//! recovery enabled, inserting syntax-error nodes so the final parse
//! tree's yield always equals the input.
//!
//! Parsing grammar *source text* into a [`clause::Clause`] tree (a
//! PEG meta-grammar) and walking the resulting parse tree into an
//! AST/CST are out of scope here — this crate is the engine those
//! layers would sit on top of.

pub mod clause;
pub mod combinators;
pub mod error;
pub mod match_result;
pub mod memo;
pub mod parser;
pub mod stats;
pub mod terminals;

pub use clause::Clause;
pub use error::GrammarError;
pub use match_result::{Match, MatchResult, SyntaxErrorKind};
pub use parser::{describe_syntax_error, ParseResult, Parser, RuleSet};
pub use stats::ParserStats;
