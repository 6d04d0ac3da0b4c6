//! Match logic for the combinator [`Clause`] variants: sequence recovery,
//! ordered-choice longest-best-with-errors selection, and repetition with
//! bound propagation and first-iteration recovery (spec.md §4.4–§4.8).

use crate::clause::Clause;
use crate::match_result::{Match, MatchResult};
use crate::parser::Parser;
use crate::terminals::match_terminal;

fn all_complete(children: &[MatchResult<'_>]) -> bool {
    children.iter().all(|c| c.is_non_match() || c.is_complete())
}

impl Clause {
    /// Match this clause at `pos`, propagating `bound` (the next sibling
    /// clause in an enclosing sequence, used by repetitions to avoid
    /// eating into it) where relevant.
    pub fn r#match<'g>(&'g self, parser: &Parser<'g>, pos: usize, bound: Option<&'g Clause>) -> MatchResult<'g> {
        // Grammar nesting recurses through this dispatch on every clause;
        // grow the stack rather than overflow it on deeply nested grammars.
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || match self {
            Clause::Literal(_)
            | Clause::CharSingle(_)
            | Clause::CharSet { .. }
            | Clause::AnyChar
            | Clause::Nothing => match_terminal(self, parser, pos),
            Clause::Seq(children) => match_seq(self, children, parser, pos, bound),
            Clause::Choice(children) => match_choice(self, children, parser, pos, bound),
            Clause::Repeat { child, require_one } => {
                match_repeat(self, child, *require_one, parser, pos, bound)
            }
            Clause::Optional(child) => match_optional(self, child, parser, pos, bound),
            Clause::Lookahead { child, positive } => match_lookahead(self, child, *positive, parser, pos, bound),
            Clause::RuleRef(_) => unreachable!("Parser::r#match resolves RuleRef before reaching Clause::r#match"),
        })
    }
}

// --------------------------------------------------------------------------------------------
// Sequence

#[allow(unused_assignments)]
fn match_seq<'g>(
    clause: &'g Clause,
    children: &'g [Clause],
    parser: &Parser<'g>,
    pos: usize,
    bound: Option<&'g Clause>,
) -> MatchResult<'g> {
    let mut out: Vec<MatchResult<'g>> = Vec::new();
    let mut curr = pos;
    let mut i = 0;

    while i < children.len() {
        let sub = &children[i];
        let next_clause = children.get(i + 1);
        let effective_bound = if parser.in_recovery_phase() && next_clause.is_some() {
            next_clause
        } else {
            bound
        };
        let result = parser.r#match(sub, curr, effective_bound);

        if result.is_non_match() {
            if parser.in_recovery_phase() && !result.is_from_lr_context() {
                if let Some((input_skip, grammar_skip, probe)) = seq_recover(children, parser, curr, i) {
                    parser.record_recovery();

                    if input_skip > 0 {
                        out.push(MatchResult::Match(Match::skipped(curr, input_skip)));
                    }
                    for j in 0..grammar_skip {
                        out.push(MatchResult::Match(Match::deleted(curr + input_skip, Some(&children[i + j]))));
                    }

                    match probe {
                        None => {
                            curr += input_skip;
                            break;
                        }
                        Some(probe_result) => {
                            let probe_len = probe_result.len();
                            out.push(probe_result);
                            curr += input_skip + probe_len;
                            i += grammar_skip + 1;
                            continue;
                        }
                    }
                }
            }
            return MatchResult::Mismatch;
        }

        let result_len = result.len();
        out.push(result);
        curr += result_len;
        i += 1;
    }

    if out.is_empty() {
        return MatchResult::Match(Match::leaf(Some(clause), pos, 0));
    }
    let complete = all_complete(&out);
    MatchResult::Match(Match::from_children(Some(clause), out, complete))
}

/// Search for the smallest `(input_skip, grammar_skip)` pair letting the
/// sequence resume: skip `input_skip` input characters, delete
/// `grammar_skip` grammar elements starting at index `i`, then match
/// `children[i + grammar_skip]` at `curr + input_skip`.
///
/// `grammar_skip > 0` is only ever taken at EOF (`input_skip == 0` and the
/// position is already past the end) — deleting grammar elements mid-parse
/// would desync the parse tree's yield from the visible input, so every
/// other branch restricts itself to `grammar_skip == 0`.
fn seq_recover<'g>(
    children: &'g [Clause],
    parser: &Parser<'g>,
    curr: usize,
    i: usize,
) -> Option<(usize, usize, Option<MatchResult<'g>>)> {
    let input = parser.input();
    let max_scan = input.len() - curr + 1;
    let max_grammar = children.len() - i;

    for input_skip in 0..max_scan {
        let probe_pos = curr + input_skip;

        if probe_pos >= input.len() {
            if input_skip == 0 {
                tracing::trace!(pos = curr, deletions = max_grammar, "sequence recovery: EOF completion");
                return Some((input_skip, max_grammar, None));
            }
            continue;
        }

        for grammar_skip in 0..max_grammar {
            if grammar_skip == 0 && input_skip == 0 {
                continue;
            }
            if grammar_skip > 0 {
                continue;
            }

            let clause_idx = i + grammar_skip;
            let candidate = &children[clause_idx];

            let failed_clause = &children[i];
            if let Clause::Literal(text) = failed_clause {
                if text.chars().count() == 1 && input_skip > 1 && clause_idx + 1 < children.len() {
                    if let Clause::Literal(next_text) = &children[clause_idx + 1] {
                        let skipped: String = input[curr..curr + input_skip].iter().collect();
                        if skipped.contains(next_text.as_str()) {
                            continue;
                        }
                    }
                }
            }

            let probe = parser.probe(candidate, probe_pos);
            if !probe.is_non_match() {
                if let Clause::Literal(text) = candidate {
                    let text_len = text.chars().count();
                    if input_skip > text_len {
                        if text_len > 1 {
                            continue;
                        }
                        let skipped: String = input[curr..curr + input_skip].iter().collect();
                        if skipped.contains(text.as_str()) {
                            continue;
                        }
                    }
                }
                tracing::trace!(pos = curr, input_skip, grammar_skip, "sequence recovery: found");
                return Some((input_skip, grammar_skip, Some(probe)));
            }
        }
    }
    None
}

// --------------------------------------------------------------------------------------------
// Ordered choice

fn match_choice<'g>(
    clause: &'g Clause,
    children: &'g [Clause],
    parser: &Parser<'g>,
    pos: usize,
    bound: Option<&'g Clause>,
) -> MatchResult<'g> {
    for (i, sub) in children.iter().enumerate() {
        let result = parser.r#match(sub, pos, bound);
        if result.is_non_match() {
            continue;
        }

        if parser.in_recovery_phase() && i == 0 && result.tot_descendant_errors() > 0 {
            let mut best = result;
            let mut best_len = best.len();
            let mut best_errors = best.tot_descendant_errors();

            for alt_sub in &children[1..] {
                let alt = parser.r#match(alt_sub, pos, bound);
                if alt.is_non_match() {
                    continue;
                }
                let alt_len = alt.len();
                let alt_errors = alt.tot_descendant_errors();

                let best_rate = if best_len > 0 { best_errors as f64 / best_len as f64 } else { 0.0 };
                let alt_rate = if alt_len > 0 { alt_errors as f64 / alt_len as f64 } else { 0.0 };
                let error_rate_threshold = 0.5;

                if (best_rate >= error_rate_threshold && alt_rate < error_rate_threshold)
                    || alt_len > best_len
                    || (alt_len == best_len && alt_errors < best_errors)
                {
                    best = alt;
                    best_len = alt_len;
                    best_errors = alt_errors;
                }
                if alt_errors == 0 && alt_len >= best_len {
                    break;
                }
            }

            return MatchResult::Match(Match::from_children(Some(clause), vec![best.clone()], best.is_complete()));
        }

        return MatchResult::Match(Match::from_children(Some(clause), vec![result.clone()], result.is_complete()));
    }
    MatchResult::Mismatch
}

// --------------------------------------------------------------------------------------------
// Repetition

#[allow(unused_assignments)]
fn match_repeat<'g>(
    clause: &'g Clause,
    child: &'g Clause,
    require_one: bool,
    parser: &Parser<'g>,
    pos: usize,
    bound: Option<&'g Clause>,
) -> MatchResult<'g> {
    let mut out: Vec<MatchResult<'g>> = Vec::new();
    let mut curr = pos;
    let mut incomplete = false;
    let mut has_recovered = false;
    let input_len = parser.input_len();

    while curr <= input_len {
        if parser.in_recovery_phase() {
            if let Some(b) = bound {
                if parser.can_match_nonzero_at(b, curr) {
                    break;
                }
            }
        }

        let result = parser.r#match(child, curr, None);
        if result.is_non_match() {
            if !parser.in_recovery_phase() && curr < input_len {
                incomplete = true;
            }

            if parser.in_recovery_phase() {
                if let Some((skip, probe)) = repeat_recover(child, parser, curr, has_recovered) {
                    parser.record_recovery();
                    out.push(MatchResult::Match(Match::skipped(curr, skip)));
                    has_recovered = true;
                    match probe {
                        Some(probe_result) => {
                            let probe_len = probe_result.len();
                            out.push(probe_result);
                            curr += skip + probe_len;
                            continue;
                        }
                        None => {
                            curr += skip;
                            break;
                        }
                    }
                }
            }
            break;
        }

        if result.is_empty() {
            break;
        }
        let result_len = result.len();
        out.push(result);
        curr += result_len;
    }

    if require_one && out.is_empty() {
        return MatchResult::Mismatch;
    }
    if out.is_empty() {
        return MatchResult::Match(Match::empty(Some(clause), pos, !incomplete));
    }
    let complete = !incomplete && all_complete(&out);
    MatchResult::Match(Match::from_children(Some(clause), out, complete))
}

/// Smallest positive skip at which `child` matches again, for
/// first-iteration-allowed repetition recovery. If none exists but at
/// least one recovery already happened this repetition, fall back to a
/// single trailing error spanning to EOF.
fn repeat_recover<'g>(
    child: &'g Clause,
    parser: &Parser<'g>,
    curr: usize,
    has_recovered: bool,
) -> Option<(usize, Option<MatchResult<'g>>)> {
    let input_len = parser.input_len();
    for skip in 1..=(input_len - curr) {
        let probe = parser.probe(child, curr + skip);
        if !probe.is_non_match() {
            return Some((skip, Some(probe)));
        }
    }
    if has_recovered && curr < input_len {
        return Some((input_len - curr, None));
    }
    None
}

// --------------------------------------------------------------------------------------------
// Optional

fn match_optional<'g>(
    clause: &'g Clause,
    child: &'g Clause,
    parser: &Parser<'g>,
    pos: usize,
    bound: Option<&'g Clause>,
) -> MatchResult<'g> {
    let result = parser.r#match(child, pos, bound);
    if result.is_non_match() {
        let incomplete = !parser.in_recovery_phase() && pos < parser.input_len();
        return MatchResult::Match(Match::empty(Some(clause), pos, !incomplete));
    }
    MatchResult::Match(Match::from_children(Some(clause), vec![result.clone()], result.is_complete()))
}

// --------------------------------------------------------------------------------------------
// Lookahead

fn match_lookahead<'g>(
    clause: &'g Clause,
    child: &'g Clause,
    positive: bool,
    parser: &Parser<'g>,
    pos: usize,
    bound: Option<&'g Clause>,
) -> MatchResult<'g> {
    let result = parser.r#match(child, pos, bound);
    match (positive, result.is_non_match()) {
        (true, true) | (false, false) => MatchResult::Mismatch,
        (true, false) | (false, true) => MatchResult::Match(Match::leaf(Some(clause), pos, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::*;
    use crate::parser::RuleSet;

    fn rules(pairs: Vec<(&str, Clause)>) -> RuleSet {
        let map = pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        RuleSet::new(map).unwrap()
    }

    #[test]
    fn seq_matches_all_children_in_order() {
        let grammar = rules(vec![("S", seq(vec![lit("a"), lit("b"), lit("c")]))]);
        let parser = Parser::new(&grammar, "S", "abc");
        let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn seq_mismatches_outside_recovery_on_any_child_failure() {
        let grammar = rules(vec![("S", seq(vec![lit("a"), lit("b"), lit("c")]))]);
        let parser = Parser::new(&grammar, "S", "aXc");
        let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
        assert!(result.is_mismatch());
    }

    #[test]
    fn choice_matches_first_alternative() {
        let grammar = rules(vec![("S", choice(vec![lit("a"), lit("b")]))]);
        let parser = Parser::new(&grammar, "S", "b");
        let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn zero_or_more_matches_empty_string() {
        let grammar = rules(vec![("S", zero_or_more(lit("x")))]);
        let parser = Parser::new(&grammar, "S", "");
        let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
        assert!(!result.is_mismatch());
        assert_eq!(result.len(), 0);
    }

    #[test]
    fn one_or_more_mismatches_on_empty_string() {
        let grammar = rules(vec![("S", one_or_more(lit("x")))]);
        let parser = Parser::new(&grammar, "S", "");
        let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
        assert!(result.is_mismatch());
    }

    #[test]
    fn optional_matches_zero_length_when_child_mismatches() {
        let grammar = rules(vec![("S", optional(lit("x")))]);
        let parser = Parser::new(&grammar, "S", "");
        let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
        assert!(!result.is_mismatch());
        assert_eq!(result.len(), 0);
    }

    #[test]
    fn negative_lookahead_succeeds_when_child_mismatches() {
        let grammar = rules(vec![("S", seq(vec![not_followed_by(lit("x")), lit("y")]))]);
        let parser = Parser::new(&grammar, "S", "y");
        let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn char_set_inversion_in_practice() {
        let grammar = rules(vec![("S", char_set(vec![('a', 'z')], true))]);
        let upper = Parser::new(&grammar, "S", "A");
        let lower = Parser::new(&grammar, "S", "a");
        assert_eq!(upper.r#match(grammar.get("S").unwrap(), 0, None).len(), 1);
        assert!(lower.r#match(grammar.get("S").unwrap(), 0, None).is_mismatch());
    }
}
