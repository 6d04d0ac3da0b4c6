//! The parser: owns the memo table, the per-position version counters, and
//! the discovery/recovery phase flag, and orchestrates the two-phase parse
//! described in spec.md §4.9.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use by_address::ByAddress;
use tracing::trace;

use crate::clause::Clause;
use crate::error::GrammarError;
use crate::match_result::{Match, MatchResult, SyntaxErrorKind};
use crate::memo::MemoEntry;
use crate::stats::ParserStats;

/// A validated grammar: a name-to-clause map plus the set of rule names
/// declared transparent (a leading `~` in the name passed to
/// [`RuleSet::new`]). Transparent rules are never materialized as their
/// own tree node by an AST/CST builder; their children are hoisted into
/// the parent. The engine itself doesn't act on transparency — it's
/// carried here purely as data for that (out-of-scope) downstream layer.
pub struct RuleSet {
    rules: HashMap<String, Clause>,
    transparent_rules: HashSet<String>,
}

impl RuleSet {
    /// Validate and construct a rule set. Strips a leading `~` from each
    /// key into the transparent set, rejects a name declared as both
    /// `name` and `~name`, and checks every [`Clause::RuleRef`] resolves.
    pub fn new(rules: HashMap<String, Clause>) -> Result<RuleSet, GrammarError> {
        let mut plain_rules: HashMap<String, Clause> = HashMap::new();
        let mut transparent_rules: HashSet<String> = HashSet::new();

        for (key, value) in rules {
            if let Some(name) = key.strip_prefix('~') {
                if plain_rules.contains_key(name) || transparent_rules.contains(name) {
                    return Err(GrammarError::ConflictingTransparency(name.to_string()));
                }
                transparent_rules.insert(name.to_string());
                plain_rules.insert(name.to_string(), value);
            } else {
                if transparent_rules.contains(&key) {
                    return Err(GrammarError::ConflictingTransparency(key));
                }
                plain_rules.insert(key, value);
            }
        }

        for clause in plain_rules.values() {
            clause.check_refs(&plain_rules)?;
        }

        Ok(RuleSet { rules: plain_rules, transparent_rules })
    }

    pub fn get(&self, name: &str) -> Option<&Clause> {
        self.rules.get(name)
    }

    pub fn transparent_rules(&self) -> &HashSet<String> {
        &self.transparent_rules
    }
}

/// The parser. Borrows a validated [`RuleSet`] and owns everything that
/// changes during a parse: the memo table, the per-position version
/// counters, and the discovery/recovery phase flag.
///
/// Single-threaded and not reentrant: one `Parser` drives exactly one
/// `parse()` call over one input.
type MemoTable<'g> = HashMap<(ByAddress<&'g Clause>, usize), Rc<MemoEntry<'g>>>;

pub struct Parser<'g> {
    grammar: &'g RuleSet,
    top_rule_name: String,
    input: Vec<char>,
    memo: RefCell<MemoTable<'g>>,
    memo_version: RefCell<Vec<u32>>,
    in_recovery_phase: Cell<bool>,
    stats: RefCell<ParserStats>,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g RuleSet, top_rule_name: impl Into<String>, input: impl AsRef<str>) -> Parser<'g> {
        let chars: Vec<char> = input.as_ref().chars().collect();
        let version_len = chars.len() + 1;
        Parser {
            grammar,
            top_rule_name: top_rule_name.into(),
            input: chars,
            memo: RefCell::new(HashMap::new()),
            memo_version: RefCell::new(vec![0; version_len]),
            in_recovery_phase: Cell::new(false),
            stats: RefCell::new(ParserStats::default()),
        }
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    pub fn in_recovery_phase(&self) -> bool {
        self.in_recovery_phase.get()
    }

    pub fn stats(&self) -> ParserStats {
        *self.stats.borrow()
    }

    pub(crate) fn memo_version_at(&self, pos: usize) -> u32 {
        self.memo_version.borrow()[pos]
    }

    pub(crate) fn bump_memo_version(&self, pos: usize) {
        self.memo_version.borrow_mut()[pos] += 1;
    }

    pub(crate) fn record_match(&self) {
        self.stats.borrow_mut().record_match();
    }

    pub(crate) fn record_cache_hit(&self) {
        self.stats.borrow_mut().record_cache_hit();
    }

    pub(crate) fn record_lr_expansion(&self) {
        self.stats.borrow_mut().record_lr_expansion();
    }

    pub(crate) fn record_recovery(&self) {
        self.stats.borrow_mut().record_recovery();
    }

    /// Primitive dispatch used by clauses during their own `match`:
    /// bypasses the memo table for [`Clause::RuleRef`] (so LR
    /// re-expansion sees the referenced clause's live entry rather than a
    /// second, independently-staled cache), otherwise routes through the
    /// clause's `MemoEntry`.
    pub fn r#match(&self, clause: &'g Clause, pos: usize, bound: Option<&'g Clause>) -> MatchResult<'g> {
        if pos > self.input.len() {
            return MatchResult::Mismatch;
        }

        if let Clause::RuleRef(name) = clause {
            let target = match self.grammar.get(name) {
                Some(c) => c,
                None => return MatchResult::Mismatch,
            };
            let result = self.r#match(target, pos, bound);
            if result.is_non_match() {
                return result;
            }
            return MatchResult::Match(Match::from_children(
                Some(clause),
                vec![result.clone()],
                result.is_complete(),
            ));
        }

        let entry = {
            let mut table = self.memo.borrow_mut();
            table
                .entry((ByAddress(clause), pos))
                .or_insert_with(|| Rc::new(MemoEntry::new()))
                .clone()
        };
        entry.r#match(self, clause, pos, bound)
    }

    /// Ask "could `clause` match at `pos` without itself triggering
    /// recovery?" by temporarily leaving recovery context (spec.md §4.7).
    /// Still goes through the memo table — the phase flag is part of what
    /// makes a cached result valid, so a probe result cached under
    /// `phase=false` never leaks into a real phase-2 lookup.
    pub fn probe(&self, clause: &'g Clause, pos: usize) -> MatchResult<'g> {
        let saved = self.in_recovery_phase.get();
        self.in_recovery_phase.set(false);
        let result = self.r#match(clause, pos, None);
        self.in_recovery_phase.set(saved);
        result
    }

    /// Used by repetition to decide whether to stop before a boundary
    /// clause rather than consume into it.
    pub fn can_match_nonzero_at(&self, clause: &'g Clause, pos: usize) -> bool {
        let result = self.probe(clause, pos);
        !result.is_mismatch() && !result.is_empty()
    }

    fn match_rule(&self, name: &str, pos: usize) -> MatchResult<'g> {
        match self.grammar.get(name) {
            Some(clause) => self.r#match(clause, pos, None),
            None => MatchResult::Mismatch,
        }
    }

    /// Run the two-phase parse: discovery, then (if the root didn't span
    /// the whole input) recovery. Always returns a result whose yield can
    /// be extended to cover `[0, input.len())` — the spanning invariant.
    pub fn parse(&'g self) -> ParseResult<'g> {
        let mut result = self.match_rule(&self.top_rule_name, 0);
        let has_syntax_errors =
            result.is_mismatch() || result.pos() != 0 || result.len() != self.input.len();

        if has_syntax_errors {
            trace!(top_rule = %self.top_rule_name, "discovery phase left input unmatched, entering recovery");
            self.in_recovery_phase.set(true);
            result = self.match_rule(&self.top_rule_name, 0);
        }

        let root = match result {
            MatchResult::Match(m) => MatchResult::Match(m),
            _ => MatchResult::Match(Match::skipped(0, self.input.len())),
        };

        let unmatched_input = if has_syntax_errors && root.len() < self.input.len() {
            Some(Match::skipped(root.len(), self.input.len() - root.len()))
        } else {
            None
        };

        ParseResult {
            input: &self.input,
            root,
            top_rule_name: self.top_rule_name.clone(),
            transparent_rules: self.grammar.transparent_rules().clone(),
            has_syntax_errors,
            unmatched_input,
        }
    }
}

/// The result of a [`Parser::parse`] call.
pub struct ParseResult<'g> {
    pub input: &'g [char],
    pub root: MatchResult<'g>,
    pub top_rule_name: String,
    pub transparent_rules: HashSet<String>,
    pub has_syntax_errors: bool,
    pub unmatched_input: Option<Match<'g>>,
}

impl<'g> ParseResult<'g> {
    /// Pre-order collection of every syntax-error node in the tree, plus
    /// the trailing unmatched-input error if the parse fell short of EOF.
    pub fn get_syntax_errors(&self) -> Vec<&Match<'g>> {
        if !self.has_syntax_errors {
            return Vec::new();
        }

        let mut errors = Vec::new();
        collect_errors(&self.root, &mut errors);
        if let Some(trailing) = &self.unmatched_input {
            errors.push(trailing);
        }
        errors
    }
}

fn collect_errors<'a, 'g>(result: &'a MatchResult<'g>, out: &mut Vec<&'a Match<'g>>) {
    if let MatchResult::Match(m) = result {
        if m.is_syntax_error() {
            out.push(m);
        } else {
            for child in &m.children {
                collect_errors(child, out);
            }
        }
    }
}

/// Format a [`SyntaxErrorKind`] for a user-facing message, given the
/// original input.
pub fn describe_syntax_error(m: &Match<'_>, input: &[char]) -> String {
    match m.syntax_error {
        Some(SyntaxErrorKind::Skipped) => {
            let text: String = input[m.pos..m.pos + m.len].iter().collect();
            format!("{} unexpected character(s) at position {}: {:?}", m.len, m.pos, text)
        }
        Some(SyntaxErrorKind::Deleted(clause)) => {
            let name = clause.map(|c| c.to_string()).unwrap_or_else(|| "<unknown>".into());
            format!("missing {name} at position {}", m.pos)
        }
        None => String::new(),
    }
}
