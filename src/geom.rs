use std::collections::HashMap;
use std::fmt;

// Type aliases for indices to ensure we don't mix them up
pub type PointId = usize;
pub type SegmentId = usize;

/// An endpoint of an input segment (or a bounding-box corner).
///
/// Identity is by coordinate: parsing interns coordinate-equal points to a
/// single `PointId`, so a shared endpoint across segments is one entity.
#[derive(Clone, Debug)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

impl Point {
    pub fn new(x: f64, y: f64, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            label: label.into(),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:.3},{:.3})", self.label, self.x, self.y)
    }
}

/// A non-vertical line segment, oriented so `start` has the smaller x.
///
/// The carrier line `a*x + b*y + c = 0` is derived once at construction;
/// `b != 0` is a precondition (no vertical segments).
#[derive(Clone, Debug)]
pub struct Segment {
    pub start: PointId,
    pub end: PointId,
    pub label: String,
    a: f64,
    b: f64,
    c: f64,
}

impl Segment {
    /// y of the carrier line at `x`. Undefined for vertical segments.
    pub fn y_at(&self, x: f64) -> f64 {
        (-self.c - self.a * x) / self.b
    }

    /// Is `p` strictly above the carrier line?
    pub fn is_above(&self, p: &Point) -> bool {
        p.y > self.y_at(p.x)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// Wrapper for a coordinate pair to be Hashable (since f64 is not Hash)
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct PointKey(i64, i64);

impl From<(f64, f64)> for PointKey {
    fn from((x, y): (f64, f64)) -> Self {
        PointKey(x.to_bits() as i64, y.to_bits() as i64)
    }
}

/// Owning store for the points and segments of one decomposition.
///
/// Everything downstream (trapezoids, search nodes) refers to these by id,
/// which is what lets a point or segment be shared by many cells without
/// ownership cycles.
#[derive(Default)]
pub struct Arrangement {
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
    /// Lookup map to dedup points during construction.
    point_index: HashMap<PointKey, PointId>,
}

impl Arrangement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical id for `(x, y)`, creating the point if this
    /// coordinate has not been seen before. On a hit the existing label is
    /// kept and the proposed one is dropped.
    pub fn intern_point(&mut self, x: f64, y: f64, label: impl Into<String>) -> PointId {
        let key = PointKey::from((x, y));
        if let Some(&id) = self.point_index.get(&key) {
            return id;
        }
        let id = self.points.len();
        self.points.push(Point::new(x, y, label));
        self.point_index.insert(key, id);
        id
    }

    /// Adds a segment between two interned points, reordering the endpoints
    /// so the smaller-x one becomes `start`.
    pub fn add_segment(
        &mut self,
        p: PointId,
        q: PointId,
        label: impl Into<String>,
    ) -> SegmentId {
        let (start, end) = if self.points[p].x <= self.points[q].x {
            (p, q)
        } else {
            (q, p)
        };
        let (x1, y1) = (self.points[start].x, self.points[start].y);
        let (x2, y2) = (self.points[end].x, self.points[end].y);
        debug_assert!(x2 - x1 != 0.0, "vertical segments are unsupported");

        let id = self.segments.len();
        self.segments.push(Segment {
            start,
            end,
            label: label.into(),
            a: y1 - y2,
            b: x2 - x1,
            c: x1 * y2 - x2 * y1,
        });
        id
    }

    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id]
    }

    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id]
    }
}
