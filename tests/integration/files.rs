// Loading grammars from disk and sharing compiled grammars through the store.
use std::fs;
use std::path::PathBuf;

use deprules::deprules_rules::GrammarStore;
use deprules::{validate, AttachmentGraph, ClassUniverse, CompileOptions, Grammar, GrammarError};

fn write_grammar(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("mff.grammar");
    fs::write(&path, contents).expect("write grammar");
    path
}

#[test]
fn grammar_file_validates_a_json_graph() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_grammar(
        &dir,
        "# minimal grammar\nnotehead-* | stem\n\n| stem{1}\n",
    );
    let universe = ClassUniverse::from_class_list("notehead-full\nnotehead-empty\nstem\n");
    let compiled =
        Grammar::from_path(&path, &universe, &CompileOptions::default()).expect("grammar loads");
    assert!(compiled.warnings.is_empty());

    let graph = AttachmentGraph::from_json(
        r#"{
            "nodes": [
                {"id": 10, "class": "notehead-full"},
                {"id": 11, "class": "notehead-empty"},
                {"id": 12, "class": "stem"}
            ],
            "edges": [[10, 12], [11, 12]]
        }"#,
    )
    .expect("graph parses");

    let report = validate(&compiled.grammar, &graph);
    assert_eq!(report.cardinality_violations.len(), 1);
    assert_eq!(report.cardinality_violations[0].actual, 2);

    let json = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(json["cardinality_violations"][0]["node"], 12);
    assert_eq!(json["edge_violations"], serde_json::json!([]));
}

#[test]
fn missing_grammar_file_is_reported() {
    let universe = ClassUniverse::new(["stem"]);
    let err = Grammar::from_path(
        "/definitely/not/here.grammar",
        &universe,
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GrammarError::MissingPath(_)));
}

#[test]
fn store_rebinds_to_a_new_vocabulary() {
    let store = GrammarStore::new();
    let universe = ClassUniverse::new(["notehead-full", "stem"]);
    store
        .install("mff", "notehead-* | stem\n", &universe, &CompileOptions::default())
        .expect("install");
    assert!(!store.current("mff").expect("current").is_allowed("notehead-empty", "stem"));

    let grown = ClassUniverse::new(["notehead-full", "notehead-empty", "stem"]);
    let outcomes = store.rebind_universe(&grown, &CompileOptions::default());
    assert!(matches!(outcomes.as_slice(), [(name, Ok(2))] if name == "mff"));

    let grammar = store.current("mff").expect("current");
    assert!(grammar.is_allowed("notehead-empty", "stem"));
    assert_eq!(store.history("mff").len(), 2);
}
