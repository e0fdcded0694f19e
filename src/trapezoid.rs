use crate::geom::{Arrangement, Point, PointId, Segment, SegmentId};

/// One cell of the decomposition: the region `left.x <= x < right.x`
/// bounded above by `top` and below by `bottom`.
///
/// `right` is unset only while the cell is an open merge strip in the
/// middle of a multi-trapezoid split; every surviving leaf is closed.
#[derive(Clone, Debug)]
pub struct Trapezoid {
    pub top: SegmentId,
    pub bottom: SegmentId,
    pub left: PointId,
    pub right: Option<PointId>,
    /// Display identifier, assigned during leaf harvest.
    pub label: String,
}

impl Trapezoid {
    pub fn new(top: SegmentId, bottom: SegmentId, left: PointId, right: Option<PointId>) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            label: String::new(),
        }
    }

    /// Fixes the right bound of an open merge strip.
    pub fn close(&mut self, right: PointId) {
        self.right = Some(right);
    }

    /// Is `p` inside this cell? The left bound and the top boundary are
    /// included, the right bound and the bottom boundary excluded. An open
    /// cell contains nothing.
    pub fn contains_point(&self, p: &Point, arr: &Arrangement) -> bool {
        let Some(right) = self.right else {
            return false;
        };
        if !(arr.point(self.left).x <= p.x && p.x < arr.point(right).x) {
            return false;
        }
        !arr.segment(self.top).is_above(p) && arr.segment(self.bottom).is_above(p)
    }

    /// Does `seg` pass through this cell? True when either endpoint lies
    /// inside, or when the carrier line enters through the left bound.
    pub fn contains_segment(&self, seg: &Segment, arr: &Arrangement) -> bool {
        if self.contains_point(arr.point(seg.start), arr)
            || self.contains_point(arr.point(seg.end), arr)
        {
            return true;
        }
        let x = arr.point(self.left).x;
        let crossing = Point::new(x, seg.y_at(x), "I");
        self.contains_point(&crossing, arr)
    }

    /// Human-readable cell description for reports.
    pub fn describe(&self, arr: &Arrangement) -> String {
        let right = match self.right {
            Some(r) => arr.point(r).to_string(),
            None => "-".to_string(),
        };
        format!(
            "{} {{Top={}, Bottom={}, Left={}, Right={}}}",
            self.label,
            arr.segment(self.top),
            arr.segment(self.bottom),
            arr.point(self.left),
            right
        )
    }
}
