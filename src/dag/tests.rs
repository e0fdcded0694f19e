use crate::dag::{NodeValue, SearchDag};
use crate::trapezoid::Trapezoid;

fn cell() -> Trapezoid {
    Trapezoid::new(0, 1, 0, Some(1))
}

#[test]
fn child_registration_is_idempotent() {
    let mut dag = SearchDag::with_root(NodeValue::Trap(cell()));
    let parent = dag.add_node(NodeValue::Point(0));
    let child = dag.add_leaf(cell());

    dag.set_left_child(parent, child);
    dag.set_left_child(parent, child);

    assert_eq!(dag.node(child).parents.len(), 1);
    assert_eq!(dag.node(parent).left, Some(child));
    assert!(dag.is_leaf(child));
    assert!(!dag.is_leaf(parent));
}

#[test]
fn update_node_without_parents_signals_root_rewrite() {
    let mut dag = SearchDag::with_root(NodeValue::Trap(cell()));
    let replacement = dag.add_node(NodeValue::Point(0));
    assert!(!dag.update_node(dag.root, replacement));
}

#[test]
fn update_node_retargets_every_parent() {
    let mut dag = SearchDag::with_root(NodeValue::Trap(cell()));
    let shared = dag.add_leaf(cell());
    let other = dag.add_leaf(cell());

    // Two Y-nodes both pointing at the shared leaf.
    let y1 = dag.add_branch(NodeValue::Segment(0), shared, other);
    let y2 = dag.add_branch(NodeValue::Segment(1), other, shared);

    let replacement = dag.add_leaf(cell());
    assert!(dag.update_node(shared, replacement));

    assert_eq!(dag.node(y1).left, Some(replacement));
    assert_eq!(dag.node(y2).right, Some(replacement));
    assert_eq!(dag.node(replacement).parents.as_slice(), &[y1, y2]);
}

#[test]
fn leaves_deduplicates_shared_nodes() {
    let mut dag = SearchDag::with_root(NodeValue::Trap(cell()));
    let shared = dag.add_leaf(cell());
    let left_only = dag.add_leaf(cell());
    let right_only = dag.add_leaf(cell());

    let y1 = dag.add_branch(NodeValue::Segment(0), left_only, shared);
    let y2 = dag.add_branch(NodeValue::Segment(1), shared, right_only);
    let top = dag.add_branch(NodeValue::Point(0), y1, y2);
    dag.root = top;

    let leaves = dag.leaves();
    assert_eq!(leaves, vec![left_only, shared, right_only]);
}

#[test]
fn edges_counts_one_edge_per_child_slot() {
    let mut dag = SearchDag::with_root(NodeValue::Trap(cell()));
    let shared = dag.add_leaf(cell());
    let a = dag.add_leaf(cell());
    let b = dag.add_leaf(cell());

    let y1 = dag.add_branch(NodeValue::Segment(0), a, shared);
    let y2 = dag.add_branch(NodeValue::Segment(1), shared, b);
    let top = dag.add_branch(NodeValue::Point(0), y1, y2);
    dag.root = top;

    let edges = dag.edges();
    // 3 internal nodes, two child slots each.
    assert_eq!(edges.len(), 6);
    let into_shared = edges.iter().filter(|(_, c)| *c == shared).count();
    assert_eq!(into_shared, 2);
}
