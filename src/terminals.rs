//! Match logic for the five terminal [`Clause`] variants (spec.md §4.3).

use crate::clause::Clause;
use crate::match_result::{Match, MatchResult};
use crate::parser::Parser;

pub(crate) fn match_terminal<'g>(clause: &'g Clause, parser: &Parser<'g>, pos: usize) -> MatchResult<'g> {
    match clause {
        Clause::Literal(text) => match_literal(clause, parser, pos, text),
        Clause::CharSingle(c) => match_char_single(clause, parser, pos, *c),
        Clause::CharSet { ranges, inverted } => match_char_set(clause, parser, pos, ranges, *inverted),
        Clause::AnyChar => match_any_char(clause, parser, pos),
        Clause::Nothing => MatchResult::Match(Match::leaf(Some(clause), pos, 0)),
        _ => unreachable!("match_terminal called on a non-terminal clause"),
    }
}

fn match_literal<'g>(clause: &'g Clause, parser: &Parser<'g>, pos: usize, text: &str) -> MatchResult<'g> {
    let wanted: Vec<char> = text.chars().collect();
    let input = parser.input();
    if pos + wanted.len() > input.len() {
        return MatchResult::Mismatch;
    }
    if input[pos..pos + wanted.len()] == wanted[..] {
        MatchResult::Match(Match::leaf(Some(clause), pos, wanted.len()))
    } else {
        MatchResult::Mismatch
    }
}

fn match_char_single<'g>(clause: &'g Clause, parser: &Parser<'g>, pos: usize, want: char) -> MatchResult<'g> {
    let input = parser.input();
    if pos >= input.len() || input[pos] != want {
        return MatchResult::Mismatch;
    }
    MatchResult::Match(Match::leaf(Some(clause), pos, 1))
}

fn match_char_set<'g>(
    clause: &'g Clause,
    parser: &Parser<'g>,
    pos: usize,
    ranges: &[(char, char)],
    inverted: bool,
) -> MatchResult<'g> {
    let input = parser.input();
    if pos >= input.len() {
        return MatchResult::Mismatch;
    }
    let c = input[pos];
    let in_set = ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi);
    if in_set != inverted {
        MatchResult::Match(Match::leaf(Some(clause), pos, 1))
    } else {
        MatchResult::Mismatch
    }
}

fn match_any_char<'g>(clause: &'g Clause, parser: &Parser<'g>, pos: usize) -> MatchResult<'g> {
    if pos >= parser.input().len() {
        return MatchResult::Mismatch;
    }
    MatchResult::Match(Match::leaf(Some(clause), pos, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::{any_char, ch, char_range, char_set, lit, nothing};
    use crate::parser::RuleSet;
    use std::collections::HashMap;

    #[test]
    fn literal_matches_exact_text() {
        let grammar = RuleSet::new(HashMap::from([("S".to_string(), lit("abc"))])).unwrap();
        let parser = Parser::new(&grammar, "S", "abcd");
        let clause = grammar.get("S").unwrap();
        let result = parser.r#match(clause, 0, None);
        assert!(!result.is_mismatch());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn literal_mismatches_on_divergence() {
        let grammar = RuleSet::new(HashMap::from([("S".to_string(), lit("abc"))])).unwrap();
        let parser = Parser::new(&grammar, "S", "abd");
        let clause = grammar.get("S").unwrap();
        assert!(parser.r#match(clause, 0, None).is_mismatch());
    }

    #[test]
    fn char_single_matches_one_char() {
        let grammar = RuleSet::new(HashMap::from([("S".to_string(), ch('x'))])).unwrap();
        let parser = Parser::new(&grammar, "S", "x");
        let clause = grammar.get("S").unwrap();
        assert_eq!(parser.r#match(clause, 0, None).len(), 1);
    }

    #[test]
    fn char_set_range_matches() {
        let grammar = RuleSet::new(HashMap::from([("S".to_string(), char_range('a', 'z'))])).unwrap();
        let parser = Parser::new(&grammar, "S", "m");
        let clause = grammar.get("S").unwrap();
        assert!(!parser.r#match(clause, 0, None).is_mismatch());
    }

    #[test]
    fn char_set_inverted_excludes_range() {
        let grammar =
            RuleSet::new(HashMap::from([("S".to_string(), char_set(vec![('a', 'z')], true))])).unwrap();
        let upper = Parser::new(&grammar, "S", "A");
        let lower = Parser::new(&grammar, "S", "a");
        let clause = grammar.get("S").unwrap();
        assert!(!upper.r#match(clause, 0, None).is_mismatch());
        assert!(lower.r#match(clause, 0, None).is_mismatch());
    }

    #[test]
    fn any_char_fails_at_eof() {
        let grammar = RuleSet::new(HashMap::from([("S".to_string(), any_char())])).unwrap();
        let parser = Parser::new(&grammar, "S", "");
        let clause = grammar.get("S").unwrap();
        assert!(parser.r#match(clause, 0, None).is_mismatch());
    }

    #[test]
    fn nothing_always_matches_zero_length() {
        let grammar = RuleSet::new(HashMap::from([("S".to_string(), nothing())])).unwrap();
        let parser = Parser::new(&grammar, "S", "whatever");
        let clause = grammar.get("S").unwrap();
        let result = parser.r#match(clause, 3, None);
        assert!(!result.is_mismatch());
        assert_eq!(result.len(), 0);
    }
}
