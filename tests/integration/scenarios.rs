// Validation of small notation graphs against hand-written grammars.
use deprules::deprules_engine::{CardinalityViolation, EDGE_NOT_PERMITTED};
use deprules::{
    validate, AttachmentGraph, Cardinality, ClassUniverse, CompileOptions, Grammar,
    IncrementalValidator, NodeId, Role,
};

fn grammar(source: &str) -> Grammar {
    let universe = ClassUniverse::new(["notehead-full", "notehead-empty", "stem", "beam", "sharp"]);
    Grammar::from_source(source, &universe, &CompileOptions::default())
        .expect("grammar compiles")
        .grammar
}

const NOTEHEADS: &str = "notehead-full | stem beam\nnotehead-full{1,} |\n| beam{1,} stem{1,}\n";

#[test]
fn notehead_without_attachments_violates_its_lower_bound() {
    let grammar = grammar(NOTEHEADS);
    let mut graph = AttachmentGraph::new();
    graph.add_node(1, "notehead-full").expect("node");

    let report = validate(&grammar, &graph);
    assert!(report.edge_violations.is_empty());
    assert_eq!(
        report.cardinality_violations,
        vec![CardinalityViolation {
            node: NodeId(1),
            class: "notehead-full".into(),
            role: Role::Source,
            actual: 0,
            expected: Cardinality::at_least(1),
        }]
    );

    graph.add_node(2, "stem").expect("node");
    graph.add_edge(1, 2).expect("edge");
    assert!(validate(&grammar, &graph).is_valid());
}

#[test]
fn reversed_attachment_is_a_single_edge_violation() {
    let grammar = grammar("notehead-full | stem\n");
    let mut graph = AttachmentGraph::new();
    graph.add_node(1, "stem").expect("node");
    graph.add_node(2, "notehead-full").expect("node");
    graph.add_edge(1, 2).expect("edge");

    let report = validate(&grammar, &graph);
    assert_eq!(report.edge_violations.len(), 1);
    let violation = &report.edge_violations[0];
    assert_eq!((violation.source, violation.target), (NodeId(1), NodeId(2)));
    assert_eq!(violation.source_class, "stem");
    assert_eq!(violation.target_class, "notehead-full");
    assert_eq!(violation.reason, EDGE_NOT_PERMITTED);
    assert!(report.cardinality_violations.is_empty());
}

#[test]
fn adding_an_edge_only_touches_its_endpoints() {
    let grammar = grammar(NOTEHEADS);
    let mut graph = AttachmentGraph::new();
    graph.add_node(1, "notehead-full").expect("node");
    graph.add_node(2, "notehead-full").expect("node");
    graph.add_node(3, "stem").expect("node");
    graph.add_node(4, "beam").expect("node");
    graph.add_edge(2, 4).expect("edge");

    let mut incremental = IncrementalValidator::new(&grammar, &graph);
    let before = incremental.report();

    let changes = graph.add_edge(1, 3).expect("edge");
    assert_eq!(changes.nodes().collect::<Vec<_>>(), [NodeId(1), NodeId(3)]);
    incremental.apply(&graph, &changes);
    let after = incremental.report();

    assert_eq!(after, validate(&grammar, &graph));
    assert!(after.is_valid());

    // Nodes 2 and 4 were fine before and are untouched.
    let untouched = |report: &deprules::ValidationReport| {
        report
            .cardinality_violations
            .iter()
            .filter(|v| v.node == NodeId(2) || v.node == NodeId(4))
            .count()
    };
    assert_eq!(untouched(&before), 0);
    assert_eq!(untouched(&after), 0);
    assert_eq!(
        before.offending_nodes().into_iter().collect::<Vec<_>>(),
        [NodeId(1), NodeId(3)]
    );
}

#[test]
fn scoped_bounds_ignore_absent_neighbour_classes() {
    let grammar = grammar("notehead-*{1} | stem\nnotehead-* | sharp\n");
    let mut graph = AttachmentGraph::new();
    graph.add_node(1, "notehead-empty").expect("node");
    graph.add_node(2, "sharp").expect("node");
    graph.add_edge(1, 2).expect("edge");
    assert!(validate(&grammar, &graph).is_valid());

    graph.add_node(3, "stem").expect("node");
    graph.add_node(4, "stem").expect("node");
    graph.add_edge(1, 3).expect("edge");
    graph.add_edge(1, 4).expect("edge");
    let report = validate(&grammar, &graph);
    assert_eq!(report.cardinality_violations.len(), 1);
    assert_eq!(
        report.cardinality_violations[0].role,
        Role::SourceOf("stem".into())
    );
    assert_eq!(report.cardinality_violations[0].actual, 2);
}

#[test]
fn reports_are_ordered_by_node_then_role() {
    let grammar = grammar("notehead-full | stem\nnotehead-full{1} |\n| stem{1}\nnotehead-full{0,1} | stem\n");
    let mut graph = AttachmentGraph::new();
    graph.add_node(5, "stem").expect("node");
    graph.add_node(1, "notehead-full").expect("node");
    graph.add_node(2, "stem").expect("node");
    graph.add_edge(1, 2).expect("edge");
    graph.add_edge(1, 5).expect("edge");
    graph.add_node(7, "notehead-full").expect("node");

    let report = validate(&grammar, &graph);
    let found: Vec<(NodeId, Role)> = report
        .cardinality_violations
        .iter()
        .map(|v| (v.node, v.role.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            (NodeId(1), Role::Source),
            (NodeId(1), Role::SourceOf("stem".into())),
            (NodeId(7), Role::Source),
        ]
    );
}
