//! The grammar representation: an immutable tree of [`Clause`] nodes.
//!
//! A `Clause` is either a terminal (matches characters directly) or a
//! combinator (matches by composing other clauses). Identity is by
//! reference, not structure — the memo table in [`crate::parser::Parser`]
//! keys on `&Clause` addresses, so two structurally identical clauses
//! built at different call sites are distinct cache entries.

use std::collections::{HashMap, HashSet};

use crate::error::GrammarError;

/// A single node in a grammar's clause tree.
#[derive(Debug)]
pub enum Clause {
    /// Matches a literal string byte-for-byte (code-point-for-code-point).
    Literal(String),
    /// Matches a single specific character.
    CharSingle(char),
    /// Matches a single character against a set of inclusive ranges,
    /// optionally inverted (`[^...]`).
    CharSet {
        ranges: Vec<(char, char)>,
        inverted: bool,
    },
    /// Matches any single character (fails only at EOF).
    AnyChar,
    /// Matches nothing; always succeeds with a zero-length match.
    Nothing,
    /// Matches each child in order.
    Seq(Vec<Clause>),
    /// Matches the first child that succeeds.
    Choice(Vec<Clause>),
    /// Matches the child one or more (`require_one = true`) or zero or
    /// more (`require_one = false`) times.
    Repeat { child: Box<Clause>, require_one: bool },
    /// Matches the child zero or one times; never fails.
    Optional(Box<Clause>),
    /// Refers to a named rule, resolved at match time through the rule map.
    RuleRef(String),
    /// Lookahead: matches without consuming. `positive = true` succeeds
    /// iff the child matches; `positive = false` succeeds iff it doesn't.
    Lookahead { child: Box<Clause>, positive: bool },
}

impl Clause {
    /// Validate that every [`Clause::RuleRef`] reachable from this clause
    /// resolves in `grammar_map` (which may carry `~`-prefixed transparent
    /// names as distinct keys at validation time — see [`crate::parser::RuleSet::new`]).
    pub fn check_refs(&self, grammar_map: &HashMap<String, Clause>) -> Result<(), GrammarError> {
        match self {
            Clause::Literal(_)
            | Clause::CharSingle(_)
            | Clause::CharSet { .. }
            | Clause::AnyChar
            | Clause::Nothing => Ok(()),
            Clause::Seq(children) | Clause::Choice(children) => {
                children.iter().try_for_each(|c| c.check_refs(grammar_map))
            }
            Clause::Repeat { child, .. } | Clause::Optional(child) => child.check_refs(grammar_map),
            Clause::Lookahead { child, .. } => child.check_refs(grammar_map),
            Clause::RuleRef(name) => {
                if grammar_map.contains_key(name) || grammar_map.contains_key(&format!("~{name}")) {
                    Ok(())
                } else {
                    Err(GrammarError::UnknownRule(name.clone()))
                }
            }
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Clause::Literal(text) => write!(f, "{text:?}"),
            Clause::CharSingle(c) => write!(f, "{c:?}"),
            Clause::CharSet { ranges, inverted } => {
                write!(f, "[")?;
                if *inverted {
                    write!(f, "^")?;
                }
                for (lo, hi) in ranges {
                    if lo == hi {
                        write!(f, "{lo}")?;
                    } else {
                        write!(f, "{lo}-{hi}")?;
                    }
                }
                write!(f, "]")
            }
            Clause::AnyChar => write!(f, "."),
            Clause::Nothing => write!(f, "()"),
            Clause::Seq(children) => {
                write!(f, "(")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            Clause::Choice(children) => {
                write!(f, "(")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " / ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            Clause::Repeat { child, require_one } => {
                write!(f, "{child}{}", if *require_one { "+" } else { "*" })
            }
            Clause::Optional(child) => write!(f, "{child}?"),
            Clause::RuleRef(name) => write!(f, "{name}"),
            Clause::Lookahead { child, positive } => {
                write!(f, "{}{child}", if *positive { "&" } else { "!" })
            }
        }
    }
}

// --------------------------------------------------------------------------------------------
// Construction helpers. Stand-ins for the clause-builder surface a PEG-source
// meta-grammar would target; see SPEC_FULL.md.

/// A literal string terminal.
pub fn lit(text: impl Into<String>) -> Clause {
    Clause::Literal(text.into())
}

/// A single-character terminal.
pub fn ch(c: char) -> Clause {
    Clause::CharSingle(c)
}

/// A character class spanning one inclusive range.
pub fn char_range(lo: char, hi: char) -> Clause {
    Clause::CharSet { ranges: vec![(lo, hi)], inverted: false }
}

/// A character class over arbitrary ranges, optionally inverted.
pub fn char_set(ranges: Vec<(char, char)>, inverted: bool) -> Clause {
    Clause::CharSet { ranges, inverted }
}

/// Matches any single character.
pub fn any_char() -> Clause {
    Clause::AnyChar
}

/// Matches nothing (empty group).
pub fn nothing() -> Clause {
    Clause::Nothing
}

/// Matches each clause in order.
pub fn seq(children: Vec<Clause>) -> Clause {
    Clause::Seq(children)
}

/// Matches the first clause that succeeds (ordered choice).
pub fn choice(children: Vec<Clause>) -> Clause {
    Clause::Choice(children)
}

/// One or more repetitions of `child`.
pub fn one_or_more(child: Clause) -> Clause {
    Clause::Repeat { child: Box::new(child), require_one: true }
}

/// Zero or more repetitions of `child`.
pub fn zero_or_more(child: Clause) -> Clause {
    Clause::Repeat { child: Box::new(child), require_one: false }
}

/// Zero or one occurrence of `child`.
pub fn optional(child: Clause) -> Clause {
    Clause::Optional(Box::new(child))
}

/// A reference to a named rule, resolved at match time.
pub fn rule_ref(name: impl Into<String>) -> Clause {
    Clause::RuleRef(name.into())
}

/// Positive lookahead: succeeds without consuming iff `child` matches.
pub fn followed_by(child: Clause) -> Clause {
    Clause::Lookahead { child: Box::new(child), positive: true }
}

/// Negative lookahead: succeeds without consuming iff `child` mismatches.
pub fn not_followed_by(child: Clause) -> Clause {
    Clause::Lookahead { child: Box::new(child), positive: false }
}

/// The set of transparent rule names extracted from a grammar's key set
/// (see [`crate::parser::RuleSet::new`]).
pub type TransparentRules = HashSet<String>;
