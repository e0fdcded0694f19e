use std::collections::HashMap;

use crate::builder::TrapezoidalMap;
use crate::dag::{NodeId, NodeValue};
use crate::geom::{PointId, SegmentId};

/// Catalogue key: which entity a search node's value resolves to.
/// Trapezoids are keyed by their leaf node, points and segments by their
/// shared ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum CatalogueKey {
    Point(PointId),
    Segment(SegmentId),
    Trap(NodeId),
}

/// Incidence encoding of the search DAG.
///
/// `cells[child][parent]` counts the direct edges from the parent's entry
/// to the child's entry. The catalogue orders start points first, then end
/// points, then segments, then harvested trapezoids, each in first-seen
/// order. Row, column and grand totals are descriptive only.
pub struct AdjacencyMatrix {
    pub labels: Vec<String>,
    pub cells: Vec<Vec<u64>>,
    pub row_sums: Vec<u64>,
    pub col_sums: Vec<u64>,
    pub total: u64,
}

impl AdjacencyMatrix {
    pub(crate) fn build(map: &TrapezoidalMap, leaves: &[NodeId]) -> Self {
        let arr = map.arrangement();

        let mut starts: Vec<PointId> = Vec::new();
        let mut ends: Vec<PointId> = Vec::new();
        for &seg in map.inserted() {
            let segment = arr.segment(seg);
            if !starts.contains(&segment.start) {
                starts.push(segment.start);
            }
            if !ends.contains(&segment.end) {
                ends.push(segment.end);
            }
        }

        let mut labels = Vec::new();
        let mut index: HashMap<CatalogueKey, usize> = HashMap::new();
        for &p in &starts {
            index.insert(CatalogueKey::Point(p), labels.len());
            labels.push(arr.point(p).label.clone());
        }
        // A point used in both roles is catalogued twice; the end-role
        // entry overwrites the index, so counts credit the later entry.
        for &p in &ends {
            index.insert(CatalogueKey::Point(p), labels.len());
            labels.push(arr.point(p).label.clone());
        }
        for &seg in map.inserted() {
            index.insert(CatalogueKey::Segment(seg), labels.len());
            labels.push(arr.segment(seg).label.clone());
        }
        for &leaf in leaves {
            index.insert(CatalogueKey::Trap(leaf), labels.len());
            let label = map
                .dag()
                .trapezoid(leaf)
                .map(|t| t.label.clone())
                .unwrap_or_default();
            labels.push(label);
        }

        let n = labels.len();
        let mut cells = vec![vec![0u64; n]; n];
        for (parent, child) in map.dag().edges() {
            let p = *index
                .get(&key_of(map, parent))
                .expect("DAG node value missing from catalogue");
            let c = *index
                .get(&key_of(map, child))
                .expect("DAG node value missing from catalogue");
            cells[c][p] += 1;
        }

        let row_sums: Vec<u64> = cells.iter().map(|row| row.iter().sum()).collect();
        let col_sums: Vec<u64> = (0..n).map(|j| cells.iter().map(|row| row[j]).sum()).collect();
        let total = row_sums.iter().sum();

        Self {
            labels,
            cells,
            row_sums,
            col_sums,
            total,
        }
    }

    /// Number of catalogue entries (the matrix is `len x len`).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn key_of(map: &TrapezoidalMap, node: NodeId) -> CatalogueKey {
    match &map.dag().node(node).value {
        NodeValue::Point(p) => CatalogueKey::Point(*p),
        NodeValue::Segment(s) => CatalogueKey::Segment(*s),
        NodeValue::Trap(_) => CatalogueKey::Trap(node),
    }
}
