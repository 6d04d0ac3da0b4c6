use ratpeg::clause::{char_range, choice, lit, rule_ref, seq};
use ratpeg::{describe_syntax_error, Parser, RuleSet};

fn main() {
    tracing_subscriber::fmt::init();

    // PlusMinusExpr <- MultDivExpr (("+" / "-") MultDivExpr)* ;
    // MultDivExpr   <- AtomicExpr (("*" / "/") AtomicExpr)* ;
    // AtomicExpr    <- Digit / "(" PlusMinusExpr ")" ;
    // Digit         <- [0-9] ;
    let grammar = RuleSet::new(
        [
            (
                "PlusMinusExpr".to_string(),
                seq(vec![
                    rule_ref("MultDivExpr"),
                    ratpeg::clause::zero_or_more(seq(vec![
                        choice(vec![lit("+"), lit("-")]),
                        rule_ref("MultDivExpr"),
                    ])),
                ]),
            ),
            (
                "MultDivExpr".to_string(),
                seq(vec![
                    rule_ref("AtomicExpr"),
                    ratpeg::clause::zero_or_more(seq(vec![
                        choice(vec![lit("*"), lit("/")]),
                        rule_ref("AtomicExpr"),
                    ])),
                ]),
            ),
            (
                "AtomicExpr".to_string(),
                choice(vec![
                    rule_ref("Digit"),
                    seq(vec![lit("("), rule_ref("PlusMinusExpr"), lit(")")]),
                ]),
            ),
            ("Digit".to_string(), char_range('0', '9')),
        ]
        .into_iter()
        .collect(),
    )
    .expect("grammar is well-formed");

    let parser = Parser::new(&grammar, "PlusMinusExpr", "1+2*3+4Q+5");
    let result = parser.parse();

    println!("{}", result.root.to_pretty_string(result.input, 0));

    if result.has_syntax_errors {
        println!("recovered from {} syntax error(s):", result.get_syntax_errors().len());
        for error in result.get_syntax_errors() {
            println!("  {}", describe_syntax_error(error, result.input));
        }
    }

    let stats = parser.stats();
    println!(
        "work={} cache_hits={} lr_expansions={} recovery_attempts={}",
        stats.total_work(),
        stats.cache_hits(),
        stats.lr_expansions(),
        stats.recovery_attempts(),
    );
}
