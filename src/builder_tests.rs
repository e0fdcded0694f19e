#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use geo_types::{Coord, Line, Rect};

    use crate::dag::{NodeId, NodeValue};
    use crate::geom::Point;
    use crate::TrapezoidalMap;

    fn bbox() -> Rect<f64> {
        Rect::new(Coord { x: -10.0, y: -10.0 }, Coord { x: 10.0, y: 10.0 })
    }

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Line<f64> {
        Line::new(Coord { x: x1, y: y1 }, Coord { x: x2, y: y2 })
    }

    /// Coordinates of every X-node reachable from the root.
    fn reachable_x_coords(map: &TrapezoidalMap) -> Vec<(f64, f64)> {
        let dag = map.dag();
        let mut ids: HashSet<NodeId> = HashSet::new();
        ids.insert(dag.root);
        for (parent, child) in dag.edges() {
            ids.insert(parent);
            ids.insert(child);
        }
        let mut coords = Vec::new();
        for id in ids {
            if let NodeValue::Point(p) = &dag.node(id).value {
                let point = map.arrangement().point(*p);
                coords.push((point.x, point.y));
            }
        }
        coords
    }

    fn assert_unique_x_coords(map: &TrapezoidalMap) {
        let coords = reachable_x_coords(map);
        let unique: HashSet<(u64, u64)> = coords
            .iter()
            .map(|&(x, y)| (x.to_bits(), y.to_bits()))
            .collect();
        assert_eq!(
            unique.len(),
            coords.len(),
            "duplicate X-node coordinates: {:?}",
            coords
        );
    }

    /// Every probe must fall in exactly one leaf cell, and the DAG query
    /// must agree with the exhaustive scan.
    fn assert_partition(map: &TrapezoidalMap, probes: &[(f64, f64)]) {
        let leaves = map.leaves();
        for &(x, y) in probes {
            let probe = Point::new(x, y, "probe");
            let hits: Vec<NodeId> = leaves
                .iter()
                .copied()
                .filter(|&leaf| {
                    map.dag()
                        .trapezoid(leaf)
                        .unwrap()
                        .contains_point(&probe, map.arrangement())
                })
                .collect();
            assert_eq!(hits.len(), 1, "probe ({}, {}) hit cells {:?}", x, y, hits);

            let located = map.locate_point(x, y).expect("probe inside the box");
            let scanned = map.dag().trapezoid(hits[0]).unwrap();
            assert_eq!(located.left, scanned.left);
            assert_eq!(located.right, scanned.right);
        }
    }

    #[test]
    fn single_interior_segment() {
        let mut map = TrapezoidalMap::build(bbox(), [line(-5.0, 0.0, 5.0, 0.0)]);

        assert_eq!(map.stats().single_splits, 1);
        assert_eq!(map.stats().multi_splits, 0);
        assert_eq!(map.leaves().len(), 4);

        let matrix = map.adjacency_matrix();
        // 1 start + 1 end + 1 segment + 4 trapezoids.
        assert_eq!(matrix.len(), 7);
        assert_eq!(matrix.total, 6);
        assert_eq!(
            matrix.labels,
            vec!["P1", "Q1", "S1", "T1", "T2", "T3", "T4"]
        );

        assert_partition(
            &map,
            &[(-7.0, 3.0), (0.0, 5.0), (0.0, -5.0), (7.0, 3.0), (-5.0, 8.0)],
        );
    }

    #[test]
    fn locate_point_routes_through_the_dag() {
        let mut map = TrapezoidalMap::build(bbox(), [line(-5.0, 0.0, 5.0, 0.0)]);
        map.label_trapezoids();

        assert_eq!(map.locate_point(-7.0, 0.0).unwrap().label, "T1");
        assert_eq!(map.locate_point(0.0, 5.0).unwrap().label, "T2");
        assert_eq!(map.locate_point(0.0, -5.0).unwrap().label, "T3");
        assert_eq!(map.locate_point(7.0, 0.0).unwrap().label, "T4");

        assert!(map.locate_point(20.0, 0.0).is_none());
        // The box is half-open on the right.
        assert!(map.locate_point(10.0, 0.0).is_none());
    }

    #[test]
    fn disjoint_segments_split_one_cell_each() {
        let mut map = TrapezoidalMap::new(bbox());
        map.add_segment(line(-8.0, 2.0, -4.0, 2.0));
        map.add_segment(line(-2.0, 5.0, 2.0, 5.0));

        assert_eq!(map.stats().single_splits, 2);
        assert_eq!(map.stats().multi_splits, 0);
        assert_eq!(map.leaves().len(), 7);

        assert_partition(
            &map,
            &[
                (-9.0, 0.0),
                (-6.0, 5.0),
                (-6.0, -5.0),
                (-3.0, 0.0),
                (0.0, 7.0),
                (0.0, 2.0),
                (5.0, 0.0),
            ],
        );
    }

    #[test]
    fn segment_crossing_several_cells_merges_strips() {
        let mut map = TrapezoidalMap::new(bbox());
        map.add_segment(line(-5.0, 0.0, 5.0, 0.0));
        map.add_segment(line(-8.0, -5.0, 8.0, -5.0));

        assert_eq!(map.stats().single_splits, 1);
        assert_eq!(map.stats().multi_splits, 1);
        assert_eq!(map.leaves().len(), 7);

        let matrix = map.adjacency_matrix();
        // 2 starts + 2 ends + 2 segments + 7 trapezoids.
        assert_eq!(matrix.len(), 13);
        // 8 internal nodes, two child edges each.
        assert_eq!(matrix.total, 16);

        // The lower merge strip spans all three crossed cells and is
        // reachable through more than one parent.
        let shared = map.leaves().into_iter().any(|leaf| {
            map.dag().node(leaf).parents.len() > 1
        });
        assert!(shared, "expected a multi-parent merge strip leaf");

        assert_partition(
            &map,
            &[
                (-9.0, 0.0),
                (-9.0, -7.0),
                (-6.5, 3.0),
                (0.0, 3.0),
                (0.0, -2.0),
                (0.0, -7.0),
                (6.5, 3.0),
                (9.0, -7.0),
            ],
        );
    }

    #[test]
    fn shared_endpoint_reuses_the_x_node_in_a_single_split() {
        let mut map = TrapezoidalMap::new(bbox());
        map.add_segment(line(-5.0, 0.0, 0.0, 0.0));
        map.add_segment(line(0.0, 0.0, 5.0, 0.0));

        assert_eq!(map.stats().single_splits, 2);
        assert_eq!(map.leaves().len(), 6);
        assert_unique_x_coords(&map);

        let matrix = map.adjacency_matrix();
        // The shared coordinate is catalogued twice, once per role:
        // 2 starts + 2 ends + 2 segments + 6 trapezoids.
        assert_eq!(matrix.len(), 12);
        // 5 internal nodes.
        assert_eq!(matrix.total, 10);

        assert_partition(
            &map,
            &[(-7.0, 0.0), (-2.0, 3.0), (-2.0, -3.0), (2.0, 3.0), (2.0, -3.0), (7.0, 0.0)],
        );
    }

    #[test]
    fn shared_endpoint_reuses_the_x_node_across_a_multi_split() {
        let mut map = TrapezoidalMap::new(bbox());
        map.add_segment(line(-5.0, 0.0, 0.0, 0.0));
        map.add_segment(line(3.0, 3.0, 8.0, 3.0));
        map.add_segment(line(0.0, 0.0, 6.0, 1.0));

        assert_eq!(map.stats().single_splits, 2);
        assert_eq!(map.stats().multi_splits, 1);
        assert_eq!(map.leaves().len(), 9);
        assert_unique_x_coords(&map);

        assert_partition(
            &map,
            &[
                (-7.0, 0.0),
                (-2.0, 2.0),
                (-2.0, -2.0),
                (1.0, 2.0),
                (1.0, -2.0),
                (4.0, 5.0),
                (4.0, 2.0),
                (4.0, -2.0),
                (7.0, 2.0),
                (9.0, 5.0),
            ],
        );
    }

    #[test]
    fn segment_ending_on_a_visited_wall_leaves_the_touched_cell_alone() {
        // The second segment ends exactly at the first one's start point,
        // so its walk reaches the cell right of that wall with zero
        // extent. That cell must survive untouched.
        let mut map = TrapezoidalMap::new(bbox());
        map.add_segment(line(0.0, 0.0, 5.0, 0.0));
        map.add_segment(line(-7.0, -3.0, 0.0, 0.0));

        assert_eq!(map.stats().single_splits, 1);
        assert_eq!(map.stats().multi_splits, 1);
        assert_eq!(map.leaves().len(), 6);
        assert_unique_x_coords(&map);

        let matrix = map.adjacency_matrix();
        // 2 starts + 2 ends + 2 segments + 6 trapezoids; the shared
        // coordinate is catalogued in both roles.
        assert_eq!(matrix.len(), 12);
        // 5 internal nodes.
        assert_eq!(matrix.total, 10);

        assert_partition(
            &map,
            &[
                (-9.0, 0.0),
                (-5.0, 1.0),
                (-5.0, -5.0),
                (2.0, 3.0),
                (2.0, -3.0),
                (7.0, 0.0),
            ],
        );
    }

    #[test]
    fn empty_map_is_one_cell() {
        let mut map = TrapezoidalMap::new(bbox());
        assert_eq!(map.leaves().len(), 1);
        assert!(map.locate_point(0.0, 0.0).is_some());
        assert!(map.locate_point(11.0, 0.0).is_none());

        let matrix = map.adjacency_matrix();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.total, 0);
        assert_eq!(matrix.labels, vec!["T1"]);
    }

    #[test]
    fn segment_missing_the_box_is_skipped() {
        let mut map = TrapezoidalMap::new(bbox());
        map.add_segment(line(20.0, 20.0, 30.0, 20.0));

        assert_eq!(map.stats().skipped, 1);
        assert_eq!(map.stats().single_splits, 0);
        assert_eq!(map.leaves().len(), 1);
    }

    #[test]
    fn matrix_balance_holds_on_a_mixed_arrangement() {
        let mut map = TrapezoidalMap::new(bbox());
        map.add_segment(line(-6.0, 4.0, 1.0, 5.0));
        map.add_segment(line(-8.0, -6.0, 8.0, -4.0));
        map.add_segment(line(2.0, 0.0, 7.0, 2.0));

        let edges = map.dag().edges().len();
        let matrix = map.adjacency_matrix();

        assert_eq!(matrix.total, edges as u64);
        assert_eq!(matrix.row_sums.iter().sum::<u64>(), matrix.total);
        assert_eq!(matrix.col_sums.iter().sum::<u64>(), matrix.total);
        // Leaves receive edges but contribute none.
        for (i, row) in matrix.cells.iter().enumerate() {
            assert_eq!(row.len(), matrix.len(), "row {} is not square", i);
        }
    }
}
