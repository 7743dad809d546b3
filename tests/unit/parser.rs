// Parser behaviour: canonical rendering and error collection.
use deprules::deprules_rules::{
    parse_grammar, render_rules, GrammarError, ParseErrorKind, RawRule, RuleBody,
};
use proptest::prelude::*;

const PATTERNS: &[&str] = &[
    "notehead-full",
    "notehead-*",
    "*-up",
    "*head*",
    "stem",
    "beam",
    "*",
];

const SUFFIXES: &[&str] = &["", "{1}", "{1,}", "{,2}", "{0,3}", "{2,5}", "{,}", "{0,}"];

fn bodies(rules: &[RawRule]) -> Vec<RuleBody> {
    rules.iter().map(|rule| rule.body.clone()).collect()
}

fn token() -> impl Strategy<Value = String> {
    (0..PATTERNS.len(), 0..SUFFIXES.len())
        .prop_map(|(pattern, suffix)| format!("{}{}", PATTERNS[pattern], SUFFIXES[suffix]))
}

fn line() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(token(), 0..4),
        prop::collection::vec(token(), 0..4),
        " {0,3}",
    )
        .prop_filter("at least one side", |(lhs, rhs, _)| !lhs.is_empty() || !rhs.is_empty())
        .prop_map(|(lhs, rhs, pad)| format!("{}{}|{}{}", lhs.join(" "), pad, pad, rhs.join("  ")))
}

proptest! {
    #[test]
    fn rendering_reparses_to_the_same_rules(
        lines in prop::collection::vec(line(), 1..12),
        comment_every in 2usize..5,
    ) {
        let mut text = String::new();
        for (index, line) in lines.iter().enumerate() {
            if index % comment_every == 0 {
                text.push_str("# staff symbols\n\n");
            }
            text.push_str(line);
            text.push('\n');
        }

        let parsed = parse_grammar(&text).expect("generated grammar parses");
        prop_assert_eq!(parsed.len(), lines.len());
        let reparsed = parse_grammar(&render_rules(&parsed)).expect("rendered grammar parses");
        prop_assert_eq!(bodies(&parsed), bodies(&reparsed));
    }
}

#[test]
fn collects_every_malformed_line() {
    let err = parse_grammar("notehead-full stem\nstem | beam\n | \na | b | c\nx{3,1} |\n")
        .unwrap_err();
    let GrammarError::Syntax(errors) = err else {
        panic!("expected syntax errors");
    };

    let found: Vec<(usize, ParseErrorKind)> =
        errors.into_iter().map(|error| (error.line, error.kind)).collect();
    assert_eq!(
        found,
        vec![
            (1, ParseErrorKind::MissingSeparator),
            (3, ParseErrorKind::EmptyRule),
            (4, ParseErrorKind::ExtraSeparator),
            (
                5,
                ParseErrorKind::EmptyRange {
                    token: "x{3,1}".into(),
                    min: 3,
                    max: 1
                }
            ),
        ]
    );
}

#[test]
fn aggregate_lines_keep_their_side() {
    let rules = parse_grammar("notehead-*{1,} |\n| beam{1,} stem{1,}\n").expect("parse");
    assert!(matches!(rules[0].body, RuleBody::SourceAggregate { .. }));
    assert!(matches!(rules[1].body, RuleBody::TargetAggregate { .. }));
    assert_eq!(rules[1].line, 2);
    assert_eq!(render_rules(&rules), "notehead-*{1,} |\n| beam{1,} stem{1,}\n");
}
