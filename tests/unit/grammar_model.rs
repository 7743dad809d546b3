// Compiled grammar model: wildcard expansion, allowed relation, merged bounds.
use deprules::deprules_rules::{ClassPattern, CompileError, CompileWarning, Side};
use deprules::{Cardinality, ClassUniverse, CompileOptions, Grammar, GrammarError, Role};
use proptest::prelude::*;

const CLASSES: &[&str] = &[
    "notehead-full",
    "notehead-empty",
    "stem",
    "beam",
    "flag-8th-up",
    "flag-16th-up",
    "sharp",
    "flat",
];

const PATTERNS: &[&str] = &[
    "notehead-full",
    "notehead-*",
    "*-up",
    "flag-*",
    "*e*",
    "stem",
    "beam",
    "sharp",
    "natural",
    "*",
];

fn compile(source: &str) -> Result<Grammar, GrammarError> {
    let universe = ClassUniverse::new(CLASSES.iter().copied());
    Grammar::from_source(source, &universe, &CompileOptions::default()).map(|c| c.grammar)
}

fn side() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(PATTERNS), 1..4)
}

fn universe() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(CLASSES, 1..=CLASSES.len())
}

proptest! {
    #[test]
    fn allowed_relation_matches_brute_force(
        names in universe(),
        rules in prop::collection::vec((side(), side()), 0..8),
    ) {
        let text: String = rules
            .iter()
            .map(|(lhs, rhs)| format!("{} | {}\n", lhs.join(" "), rhs.join(" ")))
            .collect();
        let universe = ClassUniverse::new(names.iter().copied());
        let grammar = Grammar::from_source(&text, &universe, &CompileOptions::default())
            .expect("unbounded grammar compiles")
            .grammar;

        let known = |class: &str| names.iter().any(|name| *name == class);
        for source in CLASSES {
            for target in CLASSES {
                let expected = known(source)
                    && known(target)
                    && rules.iter().any(|(lhs, rhs)| {
                        lhs.iter().any(|p| ClassPattern::new(*p).matches(source))
                            && rhs.iter().any(|p| ClassPattern::new(*p).matches(target))
                    });
                prop_assert_eq!(grammar.is_allowed(source, target), expected, "{} -> {}", source, target);
            }
        }
    }
}

#[test]
fn wildcards_expand_over_the_universe() {
    let grammar = compile("notehead-* | sharp flat stem\n").expect("compiles");
    assert!(grammar.is_allowed("notehead-full", "sharp"));
    assert!(grammar.is_allowed("notehead-empty", "flat"));
    assert!(!grammar.is_allowed("sharp", "notehead-full"));
    assert!(!grammar.is_allowed("notehead-full", "beam"));
}

#[test]
fn repeated_bounds_intersect() {
    let grammar = compile("notehead-* | stem\nnotehead-*{1,} |\nnotehead-full{0,2} |\n")
        .expect("compiles");
    assert_eq!(
        grammar.cardinality_bound("notehead-full", &Role::Source),
        Cardinality::new(1, Some(2)).expect("range")
    );
    assert_eq!(
        grammar.cardinality_bound("notehead-empty", &Role::Source),
        Cardinality::at_least(1)
    );
}

#[test]
fn scoped_bounds_are_keyed_by_the_other_class() {
    let grammar = compile("notehead-*{1} | stem{0,1}\n").expect("compiles");
    assert_eq!(
        grammar.cardinality_bound("notehead-full", &Role::SourceOf("stem".into())),
        Cardinality::exactly(1)
    );
    assert_eq!(
        grammar.cardinality_bound("stem", &Role::TargetOf("notehead-empty".into())),
        Cardinality::new(0, Some(1)).expect("range")
    );
    assert_eq!(
        grammar.cardinality_bound("stem", &Role::Target),
        Cardinality::UNBOUNDED
    );
}

#[test]
fn disjoint_bounds_name_both_lines() {
    let err = compile("notehead-full | stem\nnotehead-full{1,2} |\nnotehead-full{3,} |\n")
        .unwrap_err();
    let errors = err.compile_errors();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        CompileError::ConflictingCardinality {
            class,
            role,
            existing_lines,
            incoming_line,
            ..
        } => {
            assert_eq!(class, "notehead-full");
            assert_eq!(role, &Role::Source);
            assert_eq!(existing_lines, &vec![2usize]);
            assert_eq!(*incoming_line, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unmatched_patterns_warn_unless_strict() {
    let universe = ClassUniverse::new(CLASSES.iter().copied());
    let source = "notehead-* | stem natural\n";

    let compiled =
        Grammar::from_source(source, &universe, &CompileOptions::default()).expect("compiles");
    assert_eq!(
        compiled.warnings,
        vec![CompileWarning::UnmatchedPattern {
            line: 1,
            side: Side::Right,
            pattern: "natural".into(),
        }]
    );

    let strict = CompileOptions {
        strict_patterns: true,
    };
    let err = Grammar::from_source(source, &universe, &strict).unwrap_err();
    assert!(matches!(
        err.compile_errors(),
        [CompileError::UnmatchedPattern { line: 1, .. }]
    ));
}

#[test]
fn compilation_is_deterministic() {
    let source = "*-up | stem\nnotehead-* | stem{1} beam\n| stem{1,}\nflag-*{0,1} |\n";
    assert_eq!(compile(source).expect("first"), compile(source).expect("second"));
}
