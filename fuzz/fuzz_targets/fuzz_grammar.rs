// Fuzz target feeding arbitrary text through the grammar parser and compiler.
#![no_main]

use deprules_rules::{compile, parse_grammar, render_rules, ClassUniverse, CompileOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(rules) = parse_grammar(text) else {
        return;
    };

    // Canonical rendering must parse back to the same rule bodies.
    let rendered = render_rules(&rules);
    let reparsed = parse_grammar(&rendered).expect("rendered grammar parses");
    let bodies = |rules: &[deprules_rules::RawRule]| {
        rules.iter().map(|rule| rule.body.clone()).collect::<Vec<_>>()
    };
    assert_eq!(bodies(&rules), bodies(&reparsed));

    let universe = ClassUniverse::new(["notehead-full", "notehead-empty", "stem", "beam", "sharp"]);
    let _ = compile(&rules, &universe, &CompileOptions::default());
});
