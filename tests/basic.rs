//! Terminal matching and grammar-construction validation (spec.md §4.3, §4.10).

use std::collections::HashMap;

use ratpeg::clause::{any_char, char_range, char_set, ch, lit, nothing, rule_ref, seq};
use ratpeg::{GrammarError, Parser, RuleSet};

fn grammar(rules: Vec<(&str, ratpeg::Clause)>) -> RuleSet {
    RuleSet::new(rules.into_iter().map(|(k, v)| (k.to_string(), v)).collect()).unwrap()
}

#[test]
fn literal_matches_exact_text() {
    let grammar = grammar(vec![("S", lit("hello"))]);
    let parser = Parser::new(&grammar, "S", "hello world");
    let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
    assert_eq!(result.len(), 5);
}

#[test]
fn literal_mismatches_on_prefix_divergence() {
    let grammar = grammar(vec![("S", lit("hello"))]);
    let parser = Parser::new(&grammar, "S", "help");
    assert!(parser.r#match(grammar.get("S").unwrap(), 0, None).is_mismatch());
}

#[test]
fn char_single_matches_one_character() {
    let grammar = grammar(vec![("S", ch('a'))]);
    let parser = Parser::new(&grammar, "S", "abc");
    assert_eq!(parser.r#match(grammar.get("S").unwrap(), 0, None).len(), 1);
}

#[test]
fn char_set_inverted_excludes_range() {
    let grammar = grammar(vec![("S", char_set(vec![('a', 'z')], true))]);
    let parser = Parser::new(&grammar, "S", "5");
    assert_eq!(parser.r#match(grammar.get("S").unwrap(), 0, None).len(), 1);

    let parser2 = Parser::new(&grammar, "S", "m");
    assert!(parser2.r#match(grammar.get("S").unwrap(), 0, None).is_mismatch());
}

#[test]
fn char_range_is_inclusive() {
    let grammar = grammar(vec![("S", char_range('0', '9'))]);
    let parser = Parser::new(&grammar, "S", "9");
    assert_eq!(parser.r#match(grammar.get("S").unwrap(), 0, None).len(), 1);
}

#[test]
fn any_char_fails_only_at_eof() {
    let grammar = grammar(vec![("S", any_char())]);
    let parser = Parser::new(&grammar, "S", "");
    assert!(parser.r#match(grammar.get("S").unwrap(), 0, None).is_mismatch());

    let parser2 = Parser::new(&grammar, "S", "z");
    assert_eq!(parser2.r#match(grammar.get("S").unwrap(), 0, None).len(), 1);
}

#[test]
fn nothing_always_matches_zero_length() {
    let grammar = grammar(vec![("S", nothing())]);
    let parser = Parser::new(&grammar, "S", "anything");
    let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
    assert!(!result.is_mismatch());
    assert_eq!(result.len(), 0);
}

#[test]
fn sequence_composes_terminals() {
    let grammar = grammar(vec![("S", seq(vec![lit("foo"), lit("bar")]))]);
    let parser = Parser::new(&grammar, "S", "foobar");
    assert_eq!(parser.r#match(grammar.get("S").unwrap(), 0, None).len(), 6);
}

#[test]
fn unknown_rule_reference_is_rejected() {
    let rules: HashMap<String, ratpeg::Clause> =
        HashMap::from([("S".to_string(), rule_ref("Missing"))]);
    let err = match RuleSet::new(rules) {
        Err(e) => e,
        Ok(_) => panic!("expected GrammarError"),
    };
    assert_eq!(err, GrammarError::UnknownRule("Missing".to_string()));
}

#[test]
fn conflicting_transparency_declaration_is_rejected() {
    let rules: HashMap<String, ratpeg::Clause> = HashMap::from([
        ("S".to_string(), lit("a")),
        ("~S".to_string(), lit("b")),
    ]);
    let err = match RuleSet::new(rules) {
        Err(e) => e,
        Ok(_) => panic!("expected GrammarError"),
    };
    assert_eq!(err, GrammarError::ConflictingTransparency("S".to_string()));
}

#[test]
fn transparent_rule_name_is_stripped_and_tracked() {
    let rules: HashMap<String, ratpeg::Clause> =
        HashMap::from([("~Whitespace".to_string(), lit(" "))]);
    let grammar = RuleSet::new(rules).unwrap();
    assert!(grammar.get("Whitespace").is_some());
    assert!(grammar.transparent_rules().contains("Whitespace"));
}

#[test]
fn unicode_input_is_indexed_by_code_point() {
    // "café" has 4 code points but 5 UTF-8 bytes.
    let grammar = grammar(vec![("S", lit("café"))]);
    let parser = Parser::new(&grammar, "S", "café!");
    let result = parser.r#match(grammar.get("S").unwrap(), 0, None);
    assert_eq!(result.len(), 4);
}

#[test]
fn parser_stats_record_cache_hits_on_repeated_lookup() {
    let grammar = grammar(vec![("S", seq(vec![lit("a"), lit("a")]))]);
    let parser = Parser::new(&grammar, "S", "aa");
    let _ = parser.r#match(grammar.get("S").unwrap(), 0, None);
    let stats = parser.stats();
    assert!(stats.total_work() > 0);
}
