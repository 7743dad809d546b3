// Incremental revalidation must agree with full validation after any edit sequence.
use deprules::{
    validate, AttachmentGraph, ClassUniverse, CompileOptions, Grammar, IncrementalValidator,
};
use proptest::prelude::*;

const CLASSES: &[&str] = &["notehead-full", "notehead-empty", "stem", "beam", "flag-8th", "mystery"];

const GRAMMAR: &str = "\
# noteheads carry stems and beams
notehead-* | stem beam
notehead-*{1,} |
notehead-full | stem{1}
| stem{1,2}
stem{0,1} | beam flag-*
flag-8th{0,} |
";

#[derive(Debug, Clone)]
enum Edit {
    AddNode(u64, usize),
    RemoveNode(u64),
    Relabel(u64, usize),
    AddEdge(u64, u64),
    RemoveEdge(u64, u64),
}

fn edit() -> impl Strategy<Value = Edit> {
    let node = 0u64..6;
    let class = 0..CLASSES.len();
    prop_oneof![
        3 => (node.clone(), class.clone()).prop_map(|(n, c)| Edit::AddNode(n, c)),
        1 => node.clone().prop_map(Edit::RemoveNode),
        1 => (node.clone(), class).prop_map(|(n, c)| Edit::Relabel(n, c)),
        4 => (node.clone(), node.clone()).prop_map(|(s, t)| Edit::AddEdge(s, t)),
        2 => (node.clone(), node).prop_map(|(s, t)| Edit::RemoveEdge(s, t)),
    ]
}

fn grammar() -> Grammar {
    let universe = ClassUniverse::new(CLASSES.iter().copied().filter(|c| *c != "mystery"));
    Grammar::from_source(GRAMMAR, &universe, &CompileOptions::default())
        .expect("grammar compiles")
        .grammar
}

proptest! {
    #[test]
    fn incremental_matches_full_validation(edits in prop::collection::vec(edit(), 1..40)) {
        let grammar = grammar();
        let mut graph = AttachmentGraph::new();
        let mut incremental = IncrementalValidator::new(&grammar, &graph);

        for edit in edits {
            let changes = match edit {
                Edit::AddNode(node, class) => graph.add_node(node, CLASSES[class]),
                Edit::RemoveNode(node) => graph.remove_node(node),
                Edit::Relabel(node, class) => graph.set_class(node, CLASSES[class]),
                Edit::AddEdge(source, target) => graph.add_edge(source, target),
                Edit::RemoveEdge(source, target) => graph.remove_edge(source, target),
            };
            // Rejected edits leave the graph untouched.
            let Ok(changes) = changes else { continue };

            incremental.apply(&graph, &changes);
            prop_assert_eq!(incremental.report(), validate(&grammar, &graph));
        }
    }
}

#[test]
fn seeding_from_an_existing_graph_matches_full_validation() {
    let grammar = grammar();
    let mut graph = AttachmentGraph::new();
    graph.add_node(1, "notehead-full").expect("node");
    graph.add_node(2, "stem").expect("node");
    graph.add_node(3, "mystery").expect("node");
    graph.add_edge(2, 1).expect("edge");
    graph.add_edge(3, 2).expect("edge");

    let incremental = IncrementalValidator::new(&grammar, &graph);
    let report = incremental.report();
    assert_eq!(report, validate(&grammar, &graph));
    assert_eq!(report.unknown_classes.len(), 1);
    assert_eq!(report.edge_violations.len(), 2);
}
