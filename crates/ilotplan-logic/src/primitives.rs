//! Planar primitives: points, axis-aligned rectangles, simple polygons.
//!
//! Everything is `f64` in physical units (metres once the CAD scale factor
//! has been applied). Rectangles are axis-aligned and stored as min corner +
//! size; polygons are closed implicitly (the last vertex connects back to the
//! first).
//!
//! Overlap tests are "positive area" tests: shapes that only share an edge or
//! a corner do not overlap. This is what lets îlots sit edge to edge and touch
//! walls.

use serde::{Deserialize, Serialize};

/// Length tolerance used by the interior tests.
pub const EPS: f64 = 1e-7;

/// A point (or vector) in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn scale(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(&self) -> Option<Point> {
        let len = self.length();
        if len <= EPS || !len.is_finite() {
            None
        } else {
            Some(self.scale(1.0 / len))
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Point::new(p[0], p[1])
    }
}

/// z-component of (a - o) × (b - o). Positive when o→a→b turns left.
pub fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Closest point to `p` on segment `a`–`b`.
pub fn nearest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let ab = b.sub(a);
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= EPS * EPS {
        return a;
    }
    let t = ((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq;
    a.add(ab.scale(t.clamp(0.0, 1.0)))
}

pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    p.distance(nearest_point_on_segment(p, a, b))
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    p.x >= a.x.min(b.x) - EPS
        && p.x <= a.x.max(b.x) + EPS
        && p.y >= a.y.min(b.y) - EPS
        && p.y <= a.y.max(b.y) + EPS
}

/// Segment intersection test, touching endpoints included.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
    {
        return true;
    }
    (d1.abs() <= EPS && on_segment(a1, b1, b2))
        || (d2.abs() <= EPS && on_segment(a2, b1, b2))
        || (d3.abs() <= EPS && on_segment(b1, a1, a2))
        || (d4.abs() <= EPS && on_segment(b2, a1, a2))
}

// ── Rectangles ──────────────────────────────────────────────────────────

/// Axis-aligned rectangle: min corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }
    pub fn min_y(&self) -> f64 {
        self.y
    }
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Corners in counter-clockwise order starting at the min corner.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x(), self.min_y()),
            Point::new(self.max_x(), self.min_y()),
            Point::new(self.max_x(), self.max_y()),
            Point::new(self.min_x(), self.max_y()),
        ]
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.corners().to_vec())
    }

    /// Shrink (positive margin) or grow (negative margin) on every side.
    pub fn inset(&self, margin: f64) -> Rect {
        Rect::new(
            self.x + margin,
            self.y + margin,
            (self.width - 2.0 * margin).max(0.0),
            (self.height - 2.0 * margin).max(0.0),
        )
    }

    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let ox = self.max_x().min(other.max_x()) - self.min_x().max(other.min_x());
        let oy = self.max_y().min(other.max_y()) - self.min_y().max(other.min_y());
        if ox <= 0.0 || oy <= 0.0 {
            0.0
        } else {
            ox * oy
        }
    }

    /// True when the two rectangles share interior (edge contact does not count).
    pub fn overlaps(&self, other: &Rect) -> bool {
        let ox = self.max_x().min(other.max_x()) - self.min_x().max(other.min_x());
        let oy = self.max_y().min(other.max_y()) - self.min_y().max(other.min_y());
        ox > EPS && oy > EPS
    }

    /// Clear separation between two rectangles: the larger of the per-axis
    /// gaps. Negative when they overlap.
    pub fn separation(&self, other: &Rect) -> f64 {
        let gap_x = (other.min_x() - self.max_x()).max(self.min_x() - other.max_x());
        let gap_y = (other.min_y() - self.max_y()).max(self.min_y() - other.max_y());
        gap_x.max(gap_y)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Closest point of the (closed) rectangle to `p`.
    pub fn nearest_point(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.min_x(), self.max_x()),
            p.y.clamp(self.min_y(), self.max_y()),
        )
    }

    pub fn distance_to_point(&self, p: Point) -> f64 {
        p.distance(self.nearest_point(p))
    }

    /// True when the open disc of radius `r` around `c` reaches the rectangle's interior.
    pub fn intersects_disc(&self, c: Point, r: f64) -> bool {
        self.distance_to_point(c) < r - EPS
    }

    /// Parameter range `(t0, t1)` of segment `a`–`b` that runs through the
    /// rectangle's interior, or `None` if the segment stays outside or only
    /// grazes the border.
    pub fn clip_segment_interior(&self, a: Point, b: Point) -> Option<(f64, f64)> {
        let inner = self.inset(EPS);
        if inner.width <= 0.0 || inner.height <= 0.0 {
            return None;
        }
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let p = [-dx, dx, -dy, dy];
        let q = [
            a.x - inner.min_x(),
            inner.max_x() - a.x,
            a.y - inner.min_y(),
            inner.max_y() - a.y,
        ];
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        for i in 0..4 {
            if p[i].abs() <= f64::EPSILON {
                if q[i] < 0.0 {
                    return None;
                }
            } else {
                let t = q[i] / p[i];
                if p[i] < 0.0 {
                    t0 = t0.max(t);
                } else {
                    t1 = t1.min(t);
                }
            }
            if t0 > t1 {
                return None;
            }
        }
        let len = dx.hypot(dy);
        if (t1 - t0) * len > EPS {
            Some((t0, t1))
        } else {
            None
        }
    }

    /// Distance from the rectangle to segment `a`–`b` (0 when they touch).
    pub fn distance_to_segment(&self, a: Point, b: Point) -> f64 {
        if self.contains_point(a) || self.contains_point(b) {
            return 0.0;
        }
        let corners = self.corners();
        for i in 0..4 {
            if segments_intersect(a, b, corners[i], corners[(i + 1) % 4]) {
                return 0.0;
            }
        }
        let from_ends = self.distance_to_point(a).min(self.distance_to_point(b));
        corners
            .iter()
            .map(|&c| segment_distance(c, a, b))
            .fold(from_ends, f64::min)
    }
}

// ── Polygons ────────────────────────────────────────────────────────────

/// Simple polygon, implicitly closed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edges as (start, end) pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        self.edges()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum::<f64>()
            / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn reversed(&self) -> Polygon {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Polygon::new(vertices)
    }

    /// Mirror across `y = x`, so x-scanlines can reuse [`Self::scanline_intervals`].
    pub fn transposed(&self) -> Polygon {
        Polygon::new(self.vertices.iter().map(|p| Point::new(p.y, p.x)).collect())
    }

    /// Area centroid; falls back to the vertex mean for degenerate polygons.
    pub fn centroid(&self) -> Point {
        let a = self.signed_area();
        if a.abs() <= EPS || self.vertices.is_empty() {
            let n = self.vertices.len().max(1) as f64;
            let sx: f64 = self.vertices.iter().map(|p| p.x).sum();
            let sy: f64 = self.vertices.iter().map(|p| p.y).sum();
            return Point::new(sx / n, sy / n);
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for (p, q) in self.edges() {
            let f = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * f;
            cy += (p.y + q.y) * f;
        }
        Point::new(cx / (6.0 * a), cy / (6.0 * a))
    }

    pub fn bounds(&self) -> Rect {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &self.vertices {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if self.vertices.is_empty() {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Even-odd point-in-polygon test. Points exactly on an edge may land
    /// either way.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// First pair of non-adjacent edges that intersect, if any.
    pub fn self_intersection(&self) -> Option<(usize, usize)> {
        let n = self.vertices.len();
        if n < 4 {
            return None;
        }
        for i in 0..n {
            let (a1, a2) = (self.vertices[i], self.vertices[(i + 1) % n]);
            for j in (i + 2)..n {
                // first and last edges share vertex 0
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (b1, b2) = (self.vertices[j], self.vertices[(j + 1) % n]);
                if segments_intersect(a1, a2, b1, b2) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// True when the polygon and the rectangle share interior area.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if self.edges().any(|(a, b)| rect.clip_segment_interior(a, b).is_some()) {
            return true;
        }
        // No edge enters the rectangle: either one contains the other or
        // they are disjoint.
        self.contains(rect.center())
    }

    /// True when the rectangle lies entirely inside the polygon (edge
    /// contact allowed).
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        if self.edges().any(|(a, b)| rect.clip_segment_interior(a, b).is_some()) {
            return false;
        }
        self.contains(rect.center())
    }

    /// Distance from the polygon's outline to `p`.
    pub fn boundary_distance(&self, p: Point) -> f64 {
        self.edges()
            .map(|(a, b)| segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Distance from the polygon (as a filled region) to `p`.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        if self.contains(p) {
            0.0
        } else {
            self.boundary_distance(p)
        }
    }

    /// Distance from the filled polygon to the rectangle (0 when they touch or overlap).
    pub fn distance_to_rect(&self, rect: &Rect) -> f64 {
        if self.intersects_rect(rect) {
            return 0.0;
        }
        self.edges()
            .map(|(a, b)| rect.distance_to_segment(a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Sorted x-intervals where the horizontal line at `y` is inside the polygon.
    pub fn scanline_intervals(&self, y: f64) -> Vec<(f64, f64)> {
        let mut xs: Vec<f64> = self
            .edges()
            .filter(|(a, b)| (a.y > y) != (b.y > y))
            .map(|(a, b)| a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y))
            .collect();
        xs.sort_by(|a, b| a.total_cmp(b));
        xs.chunks_exact(2).map(|c| (c[0], c[1])).collect()
    }
}

// ── 1-D interval sets (scanline helpers) ────────────────────────────────

/// Sort and merge overlapping intervals.
pub fn merge_intervals(mut intervals: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    intervals.retain(|(a, b)| b > a);
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(intervals.len());
    for (a, b) in intervals {
        match merged.last_mut() {
            Some(last) if a <= last.1 => last.1 = last.1.max(b),
            _ => merged.push((a, b)),
        }
    }
    merged
}

/// Remove every `cut` interval from `base`. Both inputs may be unsorted.
pub fn subtract_intervals(base: &[(f64, f64)], cut: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let cut = merge_intervals(cut.to_vec());
    let mut out = Vec::new();
    for &(mut a, b) in &merge_intervals(base.to_vec()) {
        for &(ca, cb) in &cut {
            if cb <= a || ca >= b {
                continue;
            }
            if ca > a {
                out.push((a, ca));
            }
            a = a.max(cb);
            if a >= b {
                break;
            }
        }
        if a < b {
            out.push((a, b));
        }
    }
    out
}

/// Parts covered by both `a` and `b`.
pub fn intersect_intervals(a: &[(f64, f64)], b: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let (a, b) = (merge_intervals(a.to_vec()), merge_intervals(b.to_vec()));
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::new();
    while i < a.len() && j < b.len() {
        let lo = a[i].0.max(b[j].0);
        let hi = a[i].1.min(b[j].1);
        if hi > lo {
            out.push((lo, hi));
        }
        if a[i].1 < b[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

pub fn total_length(intervals: &[(f64, f64)]) -> f64 {
    intervals.iter().map(|(a, b)| b - a).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Polygon {
        Rect::new(0.0, 0.0, size, size).to_polygon()
    }

    #[test]
    fn test_polygon_area_and_orientation() {
        let sq = square(10.0);
        assert!((sq.area() - 100.0).abs() < 1e-9);
        assert!(sq.is_ccw());
        assert!(!sq.reversed().is_ccw());
    }

    #[test]
    fn test_contains_rect_allows_edge_contact() {
        let sq = square(10.0);
        assert!(sq.contains_rect(&Rect::new(0.0, 0.0, 2.0, 2.0)));
        assert!(sq.contains_rect(&Rect::new(8.0, 8.0, 2.0, 2.0)));
        assert!(!sq.contains_rect(&Rect::new(9.0, 9.0, 2.0, 2.0)));
    }

    #[test]
    fn test_contains_rect_rejects_notch() {
        // L-shape: 10x10 minus the top-right 5x5 quadrant
        let l = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        assert!(l.contains_rect(&Rect::new(1.0, 1.0, 3.0, 3.0)));
        assert!(!l.contains_rect(&Rect::new(4.0, 4.0, 3.0, 3.0)));
        assert!(!l.contains_rect(&Rect::new(6.0, 6.0, 2.0, 2.0)));
    }

    #[test]
    fn test_intersects_rect_positive_area_only() {
        let obstacle = Rect::new(4.0, 4.0, 2.0, 2.0).to_polygon();
        assert!(obstacle.intersects_rect(&Rect::new(3.0, 3.0, 2.0, 2.0)));
        // touching along an edge
        assert!(!obstacle.intersects_rect(&Rect::new(6.0, 4.0, 2.0, 2.0)));
        // rect fully inside obstacle
        assert!(obstacle.intersects_rect(&Rect::new(4.5, 4.5, 0.5, 0.5)));
        // obstacle fully inside rect
        assert!(obstacle.intersects_rect(&Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rect_overlap_and_separation() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(2.0, 0.0, 2.0, 2.0);
        let c = Rect::new(1.0, 1.0, 2.0, 2.0);
        assert!(!a.overlaps(&b));
        assert_eq!(a.overlap_area(&b), 0.0);
        assert!(a.overlaps(&c));
        assert!((a.overlap_area(&c) - 1.0).abs() < 1e-12);
        assert!((a.separation(&Rect::new(0.0, 3.2, 2.0, 2.0)) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_rect_disc_intersection() {
        let r = Rect::new(4.0, 0.0, 2.0, 2.0);
        assert!(r.intersects_disc(Point::new(5.0, 0.0), 1.5));
        assert!(!Rect::new(0.0, 0.0, 2.0, 2.0).intersects_disc(Point::new(5.0, 0.0), 1.5));
    }

    #[test]
    fn test_self_intersection_detected() {
        let bowtie = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ]);
        assert!(bowtie.self_intersection().is_some());
        assert!(square(5.0).self_intersection().is_none());
    }

    #[test]
    fn test_interval_subtraction() {
        let base = vec![(0.0, 10.0)];
        let cut = vec![(2.0, 4.0), (3.0, 5.0), (8.0, 12.0)];
        let out = subtract_intervals(&base, &cut);
        assert_eq!(out, vec![(0.0, 2.0), (5.0, 8.0)]);
        assert!((total_length(&out) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_interval_intersection() {
        let both = intersect_intervals(&[(0.0, 6.0), (14.0, 20.0)], &[(2.0, 16.0)]);
        assert_eq!(both, vec![(2.0, 6.0), (14.0, 16.0)]);
        assert!(intersect_intervals(&[(0.0, 1.0)], &[(1.0, 2.0)]).is_empty());
        assert!(intersect_intervals(&[], &[(0.0, 1.0)]).is_empty());
    }

    #[test]
    fn test_transposed_scanline_reads_columns() {
        let l = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 6.0),
            Point::new(0.0, 6.0),
        ]);
        // column x = 3 runs from y 0 to 2
        assert_eq!(l.transposed().scanline_intervals(3.0), vec![(0.0, 2.0)]);
        assert_eq!(l.transposed().scanline_intervals(1.0), vec![(0.0, 6.0)]);
    }

    #[test]
    fn test_scanline_intervals_concave() {
        let u = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(9.0, 0.0),
            Point::new(9.0, 6.0),
            Point::new(6.0, 6.0),
            Point::new(6.0, 3.0),
            Point::new(3.0, 3.0),
            Point::new(3.0, 6.0),
            Point::new(0.0, 6.0),
        ]);
        let iv = u.scanline_intervals(4.5);
        assert_eq!(iv.len(), 2);
        assert!((total_length(&iv) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_segment_distance() {
        let r = Rect::new(0.0, 0.0, 2.0, 2.0);
        let d = r.distance_to_segment(Point::new(3.0, -1.0), Point::new(3.0, 5.0));
        assert!((d - 1.0).abs() < 1e-9);
        assert_eq!(
            r.distance_to_segment(Point::new(-1.0, 1.0), Point::new(3.0, 1.0)),
            0.0
        );
    }
}
