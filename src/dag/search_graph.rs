use std::collections::HashSet;

use smallvec::SmallVec;

use crate::geom::{PointId, SegmentId};
use crate::trapezoid::Trapezoid;

// Type alias for node indices, same convention as the id types in geom.
pub type NodeId = usize;

/// Payload of a search node. Leaves hold trapezoids; internal nodes hold a
/// point (X-node, branches on x-coordinate) or a segment (Y-node, branches
/// on above/below).
#[derive(Clone, Debug)]
pub enum NodeValue {
    Point(PointId),
    Segment(SegmentId),
    Trap(Trapezoid),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub value: NodeValue,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Back-references to every parent. The structure is a DAG, not a
    /// tree: a node reused by a split is reachable from several parents.
    pub parents: SmallVec<[NodeId; 2]>,
}

/// Arena-backed point-location structure.
///
/// Nodes are addressed by stable indices; rewiring a split retargets parent
/// child-slots in place and simply abandons detached nodes in the arena.
pub struct SearchDag {
    pub nodes: Vec<Node>,
    pub root: NodeId,
}

impl SearchDag {
    /// Creates the structure with a single leaf as root.
    pub fn with_root(value: NodeValue) -> Self {
        Self {
            nodes: vec![Node {
                value,
                left: None,
                right: None,
                parents: SmallVec::new(),
            }],
            root: 0,
        }
    }

    pub fn add_node(&mut self, value: NodeValue) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            value,
            left: None,
            right: None,
            parents: SmallVec::new(),
        });
        id
    }

    /// Adds an internal node with both children wired up.
    pub fn add_branch(&mut self, value: NodeValue, left: NodeId, right: NodeId) -> NodeId {
        let id = self.add_node(value);
        self.set_left_child(id, left);
        self.set_right_child(id, right);
        id
    }

    pub fn add_leaf(&mut self, cell: Trapezoid) -> NodeId {
        self.add_node(NodeValue::Trap(cell))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].value, NodeValue::Trap(_))
    }

    /// Both children of an internal node, `None` for leaves.
    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match (self.nodes[id].left, self.nodes[id].right) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }

    pub fn trapezoid(&self, id: NodeId) -> Option<&Trapezoid> {
        match &self.nodes[id].value {
            NodeValue::Trap(t) => Some(t),
            _ => None,
        }
    }

    pub fn trapezoid_mut(&mut self, id: NodeId) -> Option<&mut Trapezoid> {
        match &mut self.nodes[id].value {
            NodeValue::Trap(t) => Some(t),
            _ => None,
        }
    }

    /// Assigns the left child and registers `parent` in the child's parent
    /// set. Registration is idempotent.
    pub fn set_left_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].left = Some(child);
        self.register_parent(child, parent);
    }

    pub fn set_right_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].right = Some(child);
        self.register_parent(child, parent);
    }

    fn register_parent(&mut self, child: NodeId, parent: NodeId) {
        let parents = &mut self.nodes[child].parents;
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }

    /// Retargets every parent slot currently pointing at `old` to point at
    /// `new` instead. Returns false when `old` had no parents, in which
    /// case the caller must promote `new` to be the root.
    pub fn update_node(&mut self, old: NodeId, new: NodeId) -> bool {
        let parents: SmallVec<[NodeId; 2]> = self.nodes[old].parents.clone();
        if parents.is_empty() {
            return false;
        }
        for parent in parents {
            if self.nodes[parent].left == Some(old) {
                self.set_left_child(parent, new);
            } else {
                self.set_right_child(parent, new);
            }
        }
        true
    }

    /// Collects every leaf reachable from the root exactly once, depth
    /// first with left subtrees before right ones.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let node = &self.nodes[id];
            if node.left.is_none() && node.right.is_none() {
                found.push(id);
                continue;
            }
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }
        found
    }

    /// Every (parent, child) edge reachable from the root, each counted
    /// once per child slot. Shared children contribute one edge per parent.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let node = &self.nodes[id];
            if let Some(left) = node.left {
                out.push((id, left));
                stack.push(left);
            }
            if let Some(right) = node.right {
                out.push((id, right));
                stack.push(right);
            }
        }
        out
    }
}
