use std::collections::HashSet;

use geo_types::{Line, Rect};
use log::{debug, warn};

use crate::dag::{NodeId, NodeValue, SearchDag};
use crate::geom::{Arrangement, Point, PointId, SegmentId};
use crate::matrix::AdjacencyMatrix;
use crate::trapezoid::Trapezoid;

/// Counters for the per-segment case split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub single_splits: usize,
    pub multi_splits: usize,
    pub skipped: usize,
}

/// The upper and lower strips being extended across consecutive crossed
/// cells during a multi-trapezoid split. Exactly one of them is open
/// (right bound unset) at any step of the walk.
struct MergeStrips {
    upper: NodeId,
    lower: NodeId,
    upper_open: bool,
}

/// Incremental trapezoidal map over a bounding box.
///
/// Segments are inserted one at a time, in input order; each insertion
/// locates the crossed cells through the search DAG and rewires the DAG in
/// place. The construction is a single sequential fold with no dependence
/// on future segments.
pub struct TrapezoidalMap {
    arrangement: Arrangement,
    dag: SearchDag,
    /// Inserted segments in input order; drives the exporter catalogue.
    inserted: Vec<SegmentId>,
    /// Points already materialized as X-nodes. Splitting never creates a
    /// second X-node for a coordinate in this set.
    visited: HashSet<PointId>,
    stats: BuildStats,
}

impl TrapezoidalMap {
    /// Creates the map holding a single cell: the bounding box itself.
    pub fn new(bounds: Rect<f64>) -> Self {
        let mut arrangement = Arrangement::new();
        let min = bounds.min();
        let max = bounds.max();
        let top_left = arrangement.intern_point(min.x, max.y, "Pb1");
        let top_right = arrangement.intern_point(max.x, max.y, "Qb1");
        let bottom_left = arrangement.intern_point(min.x, min.y, "Pb2");
        let bottom_right = arrangement.intern_point(max.x, min.y, "Qb2");
        let top = arrangement.add_segment(top_left, top_right, "Sb1");
        let bottom = arrangement.add_segment(bottom_left, bottom_right, "Sb2");

        let dag = SearchDag::with_root(NodeValue::Trap(Trapezoid::new(
            top,
            bottom,
            top_left,
            Some(top_right),
        )));

        Self {
            arrangement,
            dag,
            inserted: Vec::new(),
            visited: HashSet::new(),
            stats: BuildStats::default(),
        }
    }

    /// Builds the whole map as a fold over `segments` in input order.
    pub fn build(bounds: Rect<f64>, segments: impl IntoIterator<Item = Line<f64>>) -> Self {
        let mut map = Self::new(bounds);
        for line in segments {
            map.add_segment(line);
        }
        map
    }

    /// Registers and immediately inserts one segment. Endpoints are
    /// reordered so the smaller-x one becomes the start, and coordinate
    /// equal endpoints are interned to the points already known.
    pub fn add_segment(&mut self, line: Line<f64>) -> SegmentId {
        let n = self.inserted.len() + 1;
        let (s, e) = if line.start.x <= line.end.x {
            (line.start, line.end)
        } else {
            (line.end, line.start)
        };
        let p = self.arrangement.intern_point(s.x, s.y, format!("P{}", n));
        let q = self.arrangement.intern_point(e.x, e.y, format!("Q{}", n));
        let seg = self.arrangement.add_segment(p, q, format!("S{}", n));
        self.inserted.push(seg);
        self.insert(seg);
        seg
    }

    fn insert(&mut self, seg: SegmentId) {
        let mut crossed = Vec::new();
        self.locate(self.dag.root, seg, &mut crossed);
        debug!(
            "segment {} crosses {} trapezoid(s)",
            self.arrangement.segment(seg).label,
            crossed.len()
        );
        match crossed.len() {
            0 => {
                warn!(
                    "segment {} crosses no trapezoid, skipping",
                    self.arrangement.segment(seg).label
                );
                self.stats.skipped += 1;
            }
            1 => {
                self.split_single(seg, crossed[0]);
                self.stats.single_splits += 1;
            }
            _ => {
                self.split_many(seg, &crossed);
                self.stats.multi_splits += 1;
            }
        }
    }

    /// Descends the DAG collecting every leaf cell the segment crosses,
    /// left to right. `crossed` must be a fresh accumulator.
    fn locate(&self, node: NodeId, seg: SegmentId, crossed: &mut Vec<NodeId>) {
        let segment = self.arrangement.segment(seg);
        match &self.dag.node(node).value {
            NodeValue::Trap(cell) => {
                if cell.contains_segment(segment, &self.arrangement) && !crossed.contains(&node) {
                    crossed.push(node);
                }
            }
            NodeValue::Point(p) => {
                let (left, right) = self.dag.children(node).expect("X-node missing children");
                let px = self.arrangement.point(*p).x;
                if self.arrangement.point(segment.start).x >= px {
                    self.locate(right, seg, crossed);
                } else {
                    self.locate(left, seg, crossed);
                    // The segment straddles this x-split.
                    if self.arrangement.point(segment.end).x >= px {
                        self.locate(right, seg, crossed);
                    }
                }
            }
            NodeValue::Segment(y) => {
                let (left, right) = self.dag.children(node).expect("Y-node missing children");
                // One sample point suffices: inputs never cross.
                if self
                    .arrangement
                    .segment(*y)
                    .is_above(self.arrangement.point(segment.start))
                {
                    self.locate(left, seg, crossed);
                } else {
                    self.locate(right, seg, crossed);
                }
            }
        }
    }

    /// Splits the one cell containing the whole segment into up to four:
    /// a left flank, a right flank, and the cells above and below the
    /// segment. A flank whose bounding endpoint already has an X-node
    /// would be empty and is omitted, and the existing X-node is reused
    /// instead of creating a duplicate.
    fn split_single(&mut self, seg: SegmentId, leaf: NodeId) {
        let cell = self
            .dag
            .trapezoid(leaf)
            .expect("located nodes are leaves")
            .clone();
        let segment = self.arrangement.segment(seg);
        let (s_start, s_end) = (segment.start, segment.end);

        let above = self
            .dag
            .add_leaf(Trapezoid::new(cell.top, seg, s_start, Some(s_end)));
        let below = self
            .dag
            .add_leaf(Trapezoid::new(seg, cell.bottom, s_start, Some(s_end)));
        let s_node = self.dag.add_branch(NodeValue::Segment(seg), above, below);

        let inner = if self.visited.contains(&s_end) {
            s_node
        } else {
            let right_flank = self
                .dag
                .add_leaf(Trapezoid::new(cell.top, cell.bottom, s_end, cell.right));
            self.point_branch(s_end, s_node, right_flank)
        };
        let subtree = if self.visited.contains(&s_start) {
            inner
        } else {
            let left_flank =
                self.dag
                    .add_leaf(Trapezoid::new(cell.top, cell.bottom, cell.left, Some(s_start)));
            self.point_branch(s_start, left_flank, inner)
        };

        if !self.dag.update_node(leaf, subtree) {
            self.dag.root = subtree;
        }
    }

    /// Splits the chain of cells crossed by the segment, walking them left
    /// to right while extending an upper and a lower strip. At each wall
    /// the strip on the side where the segment exits stays open and the
    /// other one is finalized.
    fn split_many(&mut self, seg: SegmentId, crossed: &[NodeId]) {
        let segment = self.arrangement.segment(seg);
        let (s_start, s_end) = (segment.start, segment.end);
        let mut strips: Option<MergeStrips> = None;

        for &leaf in crossed {
            let cell = self
                .dag
                .trapezoid(leaf)
                .expect("located nodes are leaves")
                .clone();

            if cell.contains_point(self.arrangement.point(s_start), &self.arrangement) {
                // First cell: cut the left flank and open the strips.
                let wall = cell.right.expect("located cells are closed");
                let seg_below_wall = self
                    .arrangement
                    .segment(seg)
                    .is_above(self.arrangement.point(wall));
                let (upper_cell, lower_cell, upper_open) = if seg_below_wall {
                    (
                        Trapezoid::new(cell.top, seg, s_start, Some(wall)),
                        Trapezoid::new(seg, cell.bottom, s_start, None),
                        false,
                    )
                } else {
                    (
                        Trapezoid::new(cell.top, seg, s_start, None),
                        Trapezoid::new(seg, cell.bottom, s_start, Some(wall)),
                        true,
                    )
                };
                let upper = self.dag.add_leaf(upper_cell);
                let lower = self.dag.add_leaf(lower_cell);
                let s_node = self.dag.add_branch(NodeValue::Segment(seg), upper, lower);
                let subtree = if self.visited.contains(&s_start) {
                    // The start already has an X-node: it coincides with
                    // this cell's left bound, so there is no flank to cut.
                    s_node
                } else {
                    let left_flank = self.dag.add_leaf(Trapezoid::new(
                        cell.top,
                        cell.bottom,
                        cell.left,
                        Some(s_start),
                    ));
                    self.point_branch(s_start, left_flank, s_node)
                };
                if !self.dag.update_node(leaf, subtree) {
                    self.dag.root = subtree;
                }
                strips = Some(MergeStrips {
                    upper,
                    lower,
                    upper_open,
                });
            } else if cell.contains_point(self.arrangement.point(s_end), &self.arrangement) {
                // Last cell: close the open strip at the segment end and
                // cut the right flank.
                let strips = strips
                    .as_mut()
                    .expect("segment walk reaches the end cell after the start cell");
                if self.visited.contains(&s_end) {
                    // The end already has an X-node, so it sits on this
                    // cell's left bound and the segment only touches the
                    // wall: close the open strip and leave the leaf alone.
                    let open = if strips.upper_open {
                        strips.upper
                    } else {
                        strips.lower
                    };
                    self.dag
                        .trapezoid_mut(open)
                        .expect("merge strips are leaves")
                        .close(s_end);
                    continue;
                }
                if strips.upper_open {
                    self.dag
                        .trapezoid_mut(strips.upper)
                        .expect("merge strips are leaves")
                        .close(s_end);
                    strips.lower = self
                        .dag
                        .add_leaf(Trapezoid::new(seg, cell.bottom, cell.left, Some(s_end)));
                } else {
                    strips.upper = self
                        .dag
                        .add_leaf(Trapezoid::new(cell.top, seg, cell.left, Some(s_end)));
                    self.dag
                        .trapezoid_mut(strips.lower)
                        .expect("merge strips are leaves")
                        .close(s_end);
                }
                let s_node = self
                    .dag
                    .add_branch(NodeValue::Segment(seg), strips.upper, strips.lower);
                let right_flank =
                    self.dag
                        .add_leaf(Trapezoid::new(cell.top, cell.bottom, s_end, cell.right));
                let subtree = self.point_branch(s_end, s_node, right_flank);
                if !self.dag.update_node(leaf, subtree) {
                    self.dag.root = subtree;
                }
            } else {
                // Middle cell: the closed strip restarts here, then the
                // wall decides which side stays open for the next cell.
                let strips = strips
                    .as_mut()
                    .expect("segment walk crosses middle cells after the start cell");
                if strips.upper_open {
                    strips.lower = self
                        .dag
                        .add_leaf(Trapezoid::new(seg, cell.bottom, cell.left, None));
                } else {
                    strips.upper = self
                        .dag
                        .add_leaf(Trapezoid::new(cell.top, seg, cell.left, None));
                }
                let wall = cell.right.expect("located cells are closed");
                let seg_below_wall = self
                    .arrangement
                    .segment(seg)
                    .is_above(self.arrangement.point(wall));
                if seg_below_wall {
                    self.dag
                        .trapezoid_mut(strips.upper)
                        .expect("merge strips are leaves")
                        .close(wall);
                    strips.upper_open = false;
                } else {
                    self.dag
                        .trapezoid_mut(strips.lower)
                        .expect("merge strips are leaves")
                        .close(wall);
                    strips.upper_open = true;
                }
                let s_node = self
                    .dag
                    .add_branch(NodeValue::Segment(seg), strips.upper, strips.lower);
                let replaced = self.dag.update_node(leaf, s_node);
                debug_assert!(replaced, "a middle cell of a segment walk always has a parent");
                if !replaced {
                    self.dag.root = s_node;
                }
            }
        }
    }

    /// Creates an X-node and records its point as materialized.
    fn point_branch(&mut self, point: PointId, left: NodeId, right: NodeId) -> NodeId {
        self.visited.insert(point);
        self.dag.add_branch(NodeValue::Point(point), left, right)
    }

    /// Leaves of the final DAG, one per decomposition cell, harvested
    /// depth-first with left subtrees before right ones.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.dag.leaves()
    }

    /// Harvests the leaves and assigns their display labels `T1..Tn` in
    /// traversal order.
    pub fn label_trapezoids(&mut self) -> Vec<NodeId> {
        let leaves = self.dag.leaves();
        for (i, &leaf) in leaves.iter().enumerate() {
            if let Some(cell) = self.dag.trapezoid_mut(leaf) {
                cell.label = format!("T{}", i + 1);
            }
        }
        leaves
    }

    /// Harvests and labels the leaves, then encodes the DAG as an
    /// incidence matrix with row and column totals.
    pub fn adjacency_matrix(&mut self) -> AdjacencyMatrix {
        let leaves = self.label_trapezoids();
        AdjacencyMatrix::build(self, &leaves)
    }

    /// Point-location query: descends the DAG and returns the cell
    /// containing `(x, y)`, or `None` when the point lies outside the
    /// decomposition.
    pub fn locate_point(&self, x: f64, y: f64) -> Option<&Trapezoid> {
        let probe = Point::new(x, y, "query");
        let mut node = self.dag.root;
        loop {
            match &self.dag.node(node).value {
                NodeValue::Trap(cell) => {
                    return cell.contains_point(&probe, &self.arrangement).then_some(cell);
                }
                NodeValue::Point(p) => {
                    let (left, right) = self.dag.children(node)?;
                    node = if x >= self.arrangement.point(*p).x {
                        right
                    } else {
                        left
                    };
                }
                NodeValue::Segment(s) => {
                    let (left, right) = self.dag.children(node)?;
                    node = if self.arrangement.segment(*s).is_above(&probe) {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub fn dag(&self) -> &SearchDag {
        &self.dag
    }

    /// Inserted segments in input order, including any that were skipped.
    pub fn inserted(&self) -> &[SegmentId] {
        &self.inserted
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }
}
