//! [`MatchResult`]: the sum type every clause match produces.

use crate::clause::Clause;

/// Which kind of syntax error a [`Match`] node represents.
#[derive(Debug, Clone, Copy)]
pub enum SyntaxErrorKind<'g> {
    /// `len` input characters could not be matched and were skipped.
    Skipped,
    /// A grammar element was missing at EOF and is recorded as deleted.
    /// Carries the clause that was expected, for diagnostics.
    Deleted(Option<&'g Clause>),
}

/// A successful match, or a syntax-error node standing in for one.
///
/// Terminals carry no children; combinators carry one or more. A
/// `syntax_error` of `Some(..)` marks this node as a recovery-inserted
/// error rather than a genuine grammar match — see
/// [`Match::is_syntax_error`].
#[derive(Debug, Clone)]
pub struct Match<'g> {
    pub clause: Option<&'g Clause>,
    pub pos: usize,
    pub len: usize,
    pub children: Vec<MatchResult<'g>>,
    pub is_complete: bool,
    pub is_from_lr_context: bool,
    pub tot_descendant_errors: usize,
    pub syntax_error: Option<SyntaxErrorKind<'g>>,
}

impl<'g> Match<'g> {
    /// Build a match from its children, computing `pos`/`len` as the span
    /// from the first child's start to the last child's end (§3
    /// invariant: children are non-decreasing and non-overlapping).
    pub fn from_children(
        clause: Option<&'g Clause>,
        children: Vec<MatchResult<'g>>,
        is_complete: bool,
    ) -> Match<'g> {
        let (pos, len) = span_of(&children);
        let is_from_lr_context = children.iter().any(|c| c.is_from_lr_context());
        let tot_descendant_errors = children.iter().map(|c| c.tot_descendant_errors()).sum();
        Match {
            clause,
            pos,
            len,
            children,
            is_complete,
            is_from_lr_context,
            tot_descendant_errors,
            syntax_error: None,
        }
    }

    /// A leaf match (terminal): no children, explicit position and length.
    pub fn leaf(clause: Option<&'g Clause>, pos: usize, len: usize) -> Match<'g> {
        Match {
            clause,
            pos,
            len,
            children: Vec::new(),
            is_complete: true,
            is_from_lr_context: false,
            tot_descendant_errors: 0,
            syntax_error: None,
        }
    }

    /// A skipped-input syntax error: `[pos, pos+len)` of input consumed
    /// but not matched by any clause.
    pub fn skipped(pos: usize, len: usize) -> Match<'g> {
        Match {
            clause: None,
            pos,
            len,
            children: Vec::new(),
            is_complete: true,
            is_from_lr_context: false,
            tot_descendant_errors: 1,
            syntax_error: Some(SyntaxErrorKind::Skipped),
        }
    }

    /// A grammar-deletion syntax error: `clause` was expected at EOF but
    /// absent. Zero length by definition.
    pub fn deleted(pos: usize, clause: Option<&'g Clause>) -> Match<'g> {
        Match {
            clause,
            pos,
            len: 0,
            children: Vec::new(),
            is_complete: true,
            is_from_lr_context: false,
            tot_descendant_errors: 1,
            syntax_error: Some(SyntaxErrorKind::Deleted(clause)),
        }
    }

    /// A zero-length match with no children and an explicit completeness
    /// flag — used by `Optional`/`Repeat` when their child mismatched.
    pub fn empty(clause: Option<&'g Clause>, pos: usize, is_complete: bool) -> Match<'g> {
        Match { is_complete, ..Match::leaf(clause, pos, 0) }
    }

    pub fn is_syntax_error(&self) -> bool {
        self.syntax_error.is_some()
    }

    /// Create a copy marked as produced by a completed LR seed-growing
    /// cycle. A no-op if already so marked.
    pub fn with_lr_context(self) -> MatchResult<'g> {
        if self.is_from_lr_context {
            return MatchResult::Match(self);
        }
        let errors = self.tot_descendant_errors;
        MatchResult::Match(Match {
            is_from_lr_context: true,
            tot_descendant_errors: errors,
            ..self
        })
    }
}

fn span_of(children: &[MatchResult<'_>]) -> (usize, usize) {
    match (children.first(), children.last()) {
        (Some(first), Some(last)) => {
            let pos = first.pos();
            let len = last.pos() + last.len() - pos;
            (pos, len)
        }
        _ => (0, 0),
    }
}

/// Result of matching a clause at a position.
///
/// `Mismatch` and `LrPending` are payload-free sentinels: `Mismatch`
/// means "this clause cannot match here"; `LrPending` means "this call is
/// inside a detected left-recursion cycle with no seed yet" — the two
/// must never be conflated (see spec.md Design Notes).
#[derive(Debug, Clone)]
pub enum MatchResult<'g> {
    Match(Match<'g>),
    Mismatch,
    LrPending,
}

impl<'g> MatchResult<'g> {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, MatchResult::Mismatch)
    }

    pub fn is_lr_pending(&self) -> bool {
        matches!(self, MatchResult::LrPending)
    }

    /// True for either non-match sentinel. In the original, `lr_pending` is
    /// itself a `Match(None, -1, -1)` whose `is_mismatch` is `True`, so every
    /// combinator's single `is_mismatch` check already treats a pending
    /// left-recursion seed the same as an outright mismatch. `Mismatch` and
    /// `LrPending` are split into distinct variants here, so call sites that
    /// mean "did this clause fail to produce a usable match" must check both.
    pub fn is_non_match(&self) -> bool {
        matches!(self, MatchResult::Mismatch | MatchResult::LrPending)
    }

    pub fn as_match(&self) -> Option<&Match<'g>> {
        match self {
            MatchResult::Match(m) => Some(m),
            _ => None,
        }
    }

    pub fn pos(&self) -> usize {
        self.as_match().map(|m| m.pos).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.as_match().map(|m| m.len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.as_match().map(|m| m.is_complete).unwrap_or(true)
    }

    pub fn is_from_lr_context(&self) -> bool {
        self.as_match().map(|m| m.is_from_lr_context).unwrap_or(false)
    }

    pub fn tot_descendant_errors(&self) -> usize {
        self.as_match().map(|m| m.tot_descendant_errors).unwrap_or(0)
    }

    pub fn with_lr_context(self) -> MatchResult<'g> {
        match self {
            MatchResult::Match(m) => m.with_lr_context(),
            MatchResult::Mismatch => MatchResult::LrPending,
            MatchResult::LrPending => MatchResult::LrPending,
        }
    }

    /// Pretty-print the match tree against the original input, one line
    /// per node, children indented.
    pub fn to_pretty_string(&self, input: &[char], indent: usize) -> String {
        let pad = "  ".repeat(indent);
        match self {
            MatchResult::Mismatch => format!("{pad}MISMATCH\n"),
            MatchResult::LrPending => format!("{pad}LR_PENDING\n"),
            MatchResult::Match(m) => {
                let mut out = String::new();
                out.push_str(&pad);
                if let Some(kind) = m.syntax_error {
                    match kind {
                        SyntaxErrorKind::Skipped => {
                            let text: String = input[m.pos..m.pos + m.len].iter().collect();
                            out.push_str(&format!("<SyntaxError>: {} characters skipped {:?}\n", m.len, text));
                        }
                        SyntaxErrorKind::Deleted(clause) => {
                            let name = clause.map(|c| c.to_string()).unwrap_or_else(|| "unknown".into());
                            out.push_str(&format!("<SyntaxError>: missing {name} at pos {}\n", m.pos));
                        }
                    }
                    return out;
                }
                match m.clause {
                    Some(Clause::RuleRef(name)) => out.push_str(name),
                    Some(clause) => out.push_str(variant_name(clause)),
                    None => out.push_str("None"),
                }
                if m.children.is_empty() {
                    let text: String = input[m.pos..m.pos + m.len].iter().collect();
                    out.push_str(&format!(": {text:?}"));
                }
                out.push('\n');
                for child in &m.children {
                    out.push_str(&child.to_pretty_string(input, indent + 1));
                }
                out
            }
        }
    }
}

fn variant_name(clause: &Clause) -> &'static str {
    match clause {
        Clause::Literal(_) => "Literal",
        Clause::CharSingle(_) => "CharSingle",
        Clause::CharSet { .. } => "CharSet",
        Clause::AnyChar => "AnyChar",
        Clause::Nothing => "Nothing",
        Clause::Seq(_) => "Seq",
        Clause::Choice(_) => "Choice",
        Clause::Repeat { require_one: true, .. } => "OneOrMore",
        Clause::Repeat { require_one: false, .. } => "ZeroOrMore",
        Clause::Optional(_) => "Optional",
        Clause::RuleRef(_) => "RuleRef",
        Clause::Lookahead { positive: true, .. } => "FollowedBy",
        Clause::Lookahead { positive: false, .. } => "NotFollowedBy",
    }
}
