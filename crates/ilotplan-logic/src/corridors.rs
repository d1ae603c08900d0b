//! Corridor network between facing îlot rows.
//!
//! 1. Rows: îlot centers are clustered along one axis within a tolerance.
//! 2. Facing pairs: rows whose spans overlap, separated by a clear gap at
//!    least one corridor wide, with no other îlot inside the gap. The strip
//!    centered in the gap is clipped against îlots, restricted zones and the
//!    floor boundary; a pair survives only if a piece of at least the minimum
//!    corridor length is left.
//! 3. Axis: whichever axis leaves the fewest row groups unconnected.
//! 4. Minimum spanning tree over facing pairs (Kruskal), weighted by gap.
//!
//! Rows the tree cannot reach are reported, never fatal.

use std::collections::VecDeque;

use pathfinding::prelude::kruskal_indices;
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::geometry::GeometryModel;
use crate::placement::Ilot;
use crate::primitives::{intersect_intervals, subtract_intervals, Polygon, Rect, EPS};

/// Scanline offset from a strip edge or boundary vertex.
const SAMPLE_EPS: f64 = 1e-6;

/// Direction rows run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAxis {
    /// Rows run along x; corridors separate them in y.
    Horizontal,
    /// Rows run along y; corridors separate them in x.
    Vertical,
}

impl RowAxis {
    pub fn along(&self, r: &Rect) -> (f64, f64) {
        match self {
            RowAxis::Horizontal => (r.min_x(), r.max_x()),
            RowAxis::Vertical => (r.min_y(), r.max_y()),
        }
    }

    pub fn across(&self, r: &Rect) -> (f64, f64) {
        match self {
            RowAxis::Horizontal => (r.min_y(), r.max_y()),
            RowAxis::Vertical => (r.min_x(), r.max_x()),
        }
    }

    fn across_center(&self, r: &Rect) -> f64 {
        let (a, b) = self.across(r);
        (a + b) / 2.0
    }

    fn along_center(&self, r: &Rect) -> f64 {
        let (a, b) = self.along(r);
        (a + b) / 2.0
    }

    pub fn rect(&self, along: (f64, f64), across: (f64, f64)) -> Rect {
        match self {
            RowAxis::Horizontal => Rect::new(along.0, across.0, along.1 - along.0, across.1 - across.0),
            RowAxis::Vertical => Rect::new(across.0, along.0, across.1 - across.0, along.1 - along.0),
        }
    }

    /// `polygon` oriented so that its scanlines run along this axis.
    fn oriented(&self, polygon: &Polygon) -> Polygon {
        match self {
            RowAxis::Horizontal => polygon.clone(),
            RowAxis::Vertical => polygon.transposed(),
        }
    }
}

/// Corridor dimensions shared by every stage of the builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorridorParams {
    pub width: f64,
    pub tolerance: f64,
    pub min_length: f64,
}

impl CorridorParams {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            width: config.corridor_width(),
            tolerance: config.row_tolerance.max(0.0),
            min_length: config.min_corridor_length.max(0.0),
        }
    }
}

/// A detected row of îlots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IlotRow {
    pub id: usize,
    pub axis: RowAxis,
    /// Indices into the layout's îlot list, ordered along the row.
    pub members: Vec<usize>,
    /// Extent along the row axis.
    pub span: (f64, f64),
    /// Extent across the row axis.
    pub band: (f64, f64),
}

/// A corridor between two facing rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorridorSegment {
    pub id: usize,
    pub label: String,
    pub polygon: Polygon,
    pub rect: Rect,
    pub width: f64,
    pub length: f64,
    pub area: f64,
    pub rows: (usize, usize),
}

/// Two rows facing each other across a gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacingPair {
    pub a: usize,
    pub b: usize,
    pub gap: f64,
    pub overlap: (f64, f64),
    /// The walkable strip: corridor-wide, centered in the gap, clipped.
    pub strip: Rect,
}

/// Rows along the chosen axis together with their facing pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedRows {
    pub axis: RowAxis,
    pub rows: Vec<IlotRow>,
    pub pairs: Vec<FacingPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorridorNetwork {
    pub axis: RowAxis,
    pub rows: Vec<IlotRow>,
    pub corridors: Vec<CorridorSegment>,
    /// Row groups cut off from the main network, sorted by row id.
    pub disconnected: Vec<Vec<usize>>,
}

impl CorridorNetwork {
    pub fn total_area(&self) -> f64 {
        self.corridors.iter().map(|c| c.area).sum()
    }
}

// ── Row detection ───────────────────────────────────────────────────────

/// Cluster îlots into rows along `axis`: sorted by center, a new row starts
/// when a center is more than `tolerance` from the running mean.
pub fn cluster_rows(ilots: &[Ilot], axis: RowAxis, tolerance: f64) -> Vec<IlotRow> {
    let mut order: Vec<usize> = (0..ilots.len()).collect();
    order.sort_by(|&a, &b| {
        axis.across_center(&ilots[a].rect)
            .total_cmp(&axis.across_center(&ilots[b].rect))
            .then(axis.along_center(&ilots[a].rect).total_cmp(&axis.along_center(&ilots[b].rect)))
            .then(a.cmp(&b))
    });

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut sum = 0.0;
    for i in order {
        let c = axis.across_center(&ilots[i].rect);
        match groups.last_mut() {
            Some(group) if (c - sum / group.len() as f64).abs() <= tolerance => {
                group.push(i);
                sum += c;
            }
            _ => {
                groups.push(vec![i]);
                sum = c;
            }
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(id, mut members)| {
            members.sort_by(|&a, &b| {
                axis.along(&ilots[a].rect)
                    .0
                    .total_cmp(&axis.along(&ilots[b].rect).0)
                    .then(a.cmp(&b))
            });
            let (mut span, mut band) = ((f64::INFINITY, f64::NEG_INFINITY), (f64::INFINITY, f64::NEG_INFINITY));
            for &m in &members {
                let (a0, a1) = axis.along(&ilots[m].rect);
                let (c0, c1) = axis.across(&ilots[m].rect);
                span = (span.0.min(a0), span.1.max(a1));
                band = (band.0.min(c0), band.1.max(c1));
            }
            IlotRow {
                id,
                axis,
                members,
                span,
                band,
            }
        })
        .collect()
}

/// Rows along whichever axis leaves the fewest unconnected row groups. Ties
/// go to more facing pairs, then the larger mean row size, then horizontal.
pub fn detect_rows(ilots: &[Ilot], geometry: &GeometryModel, params: &CorridorParams) -> DetectedRows {
    let candidate = |axis: RowAxis| {
        let rows = cluster_rows(ilots, axis, params.tolerance);
        let pairs = facing_pairs(ilots, &rows, axis, geometry, params);
        let edges: Vec<(usize, usize)> = pairs.iter().map(|p| (p.a, p.b)).collect();
        let groups = components(rows.len(), &edges).len();
        DetectedRows { axis, rows, pairs }.ranked(groups, ilots.len())
    };
    let (h_rank, horizontal) = candidate(RowAxis::Horizontal);
    let (v_rank, vertical) = candidate(RowAxis::Vertical);

    let prefer_vertical = v_rank.groups < h_rank.groups
        || (v_rank.groups == h_rank.groups
            && (v_rank.pairs > h_rank.pairs
                || (v_rank.pairs == h_rank.pairs && v_rank.mean_size > h_rank.mean_size + EPS)));
    log::debug!(
        "row axis: horizontal {} group(s) / {} pair(s), vertical {} group(s) / {} pair(s)",
        h_rank.groups,
        h_rank.pairs,
        v_rank.groups,
        v_rank.pairs
    );
    if prefer_vertical {
        vertical
    } else {
        horizontal
    }
}

struct AxisRank {
    groups: usize,
    pairs: usize,
    mean_size: f64,
}

impl DetectedRows {
    fn ranked(self, groups: usize, n_ilots: usize) -> (AxisRank, Self) {
        let mean_size = if self.rows.is_empty() {
            0.0
        } else {
            n_ilots as f64 / self.rows.len() as f64
        };
        let rank = AxisRank {
            groups,
            pairs: self.pairs.len(),
            mean_size,
        };
        (rank, self)
    }
}

// ── Facing pairs ────────────────────────────────────────────────────────

pub fn facing_pairs(
    ilots: &[Ilot],
    rows: &[IlotRow],
    axis: RowAxis,
    geometry: &GeometryModel,
    params: &CorridorParams,
) -> Vec<FacingPair> {
    let mut pairs = Vec::new();
    for (i, a) in rows.iter().enumerate() {
        for b in &rows[i + 1..] {
            // rows are ordered across the axis, so `b` lies beyond `a`
            let (lower, upper) = if a.band.1 <= b.band.0 { (a, b) } else { (b, a) };
            let gap = upper.band.0 - lower.band.1;
            if gap < params.width - 1e-6 {
                continue;
            }
            let overlap = (lower.span.0.max(upper.span.0), lower.span.1.min(upper.span.1));
            if overlap.1 - overlap.0 <= EPS {
                continue;
            }
            let gap_rect = axis.rect(overlap, (lower.band.1, upper.band.0));
            let blocked = ilots.iter().enumerate().any(|(k, ilot)| {
                !lower.members.contains(&k) && !upper.members.contains(&k) && ilot.rect.overlaps(&gap_rect)
            });
            if blocked {
                continue;
            }
            let mid = (lower.band.1 + upper.band.0) / 2.0;
            let across = (mid - params.width / 2.0, mid + params.width / 2.0);
            let Some(strip) = corridor_strip(ilots, axis, geometry, overlap, across, params.min_length) else {
                log::debug!("rows R{} and R{} face each other but no strip is walkable", lower.id, upper.id);
                continue;
            };
            pairs.push(FacingPair {
                a: lower.id.min(upper.id),
                b: lower.id.max(upper.id),
                gap,
                overlap,
                strip,
            });
        }
    }
    pairs
}

/// Along-axis intervals where the whole cross-section `across` lies inside
/// `boundary`. Between consecutive vertex levels the boundary edges are
/// straight, so scanlines at the strip edges and next to every vertex in
/// between are enough.
fn inside_boundary(boundary: &Polygon, axis: RowAxis, across: (f64, f64)) -> Vec<(f64, f64)> {
    let oriented = axis.oriented(boundary);
    let (lo, hi) = (across.0 + SAMPLE_EPS, across.1 - SAMPLE_EPS);
    let mut levels = vec![lo, hi];
    for v in &oriented.vertices {
        if v.y > lo && v.y < hi {
            levels.push(v.y - SAMPLE_EPS);
            levels.push(v.y + SAMPLE_EPS);
        }
    }
    let mut inside = oriented.scanline_intervals(lo);
    for y in &levels[1..] {
        inside = intersect_intervals(&inside, &oriented.scanline_intervals(*y));
    }
    inside
}

/// Longest walkable piece of the strip `overlap × across`: inside the
/// boundary, clear of îlots and restricted zones. `None` when nothing of
/// `min_length` is left. Ties go to the piece nearer the span start.
fn corridor_strip(
    ilots: &[Ilot],
    axis: RowAxis,
    geometry: &GeometryModel,
    overlap: (f64, f64),
    across: (f64, f64),
    min_length: f64,
) -> Option<Rect> {
    let strip = axis.rect(overlap, across);
    let mut blocked: Vec<(f64, f64)> = ilots
        .iter()
        .filter(|i| i.rect.overlaps(&strip))
        .map(|i| axis.along(&i.rect))
        .collect();
    blocked.extend(
        geometry
            .obstacles()
            .iter()
            .filter(|o| o.bounds.overlaps(&strip) && o.polygon.intersects_rect(&strip))
            .map(|o| axis.along(&o.bounds)),
    );
    let inside = intersect_intervals(&[overlap], &inside_boundary(geometry.boundary(), axis, across));
    let mut free = subtract_intervals(&inside, &blocked);
    free.retain(|(a, b)| b - a >= min_length.max(EPS));
    free.sort_by(|x, y| (y.1 - y.0).total_cmp(&(x.1 - x.0)).then(x.0.total_cmp(&y.0)));

    free.into_iter()
        .map(|piece| axis.rect(piece, across))
        .find(|rect| geometry.rect_inside_boundary(rect) && geometry.rect_hits_obstacle(rect).is_none())
}

// ── Network synthesis ───────────────────────────────────────────────────

/// Connected row groups, in order of their lowest row id.
fn components(n_rows: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); n_rows];
    for &(a, b) in edges {
        adj[a].push(b);
        adj[b].push(a);
    }
    let mut seen = vec![false; n_rows];
    let mut out = Vec::new();
    for start in 0..n_rows {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut comp = Vec::new();
        while let Some(r) = queue.pop_front() {
            comp.push(r);
            for &next in &adj[r] {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        comp.sort_unstable();
        out.push(comp);
    }
    out
}

pub fn build_corridor_network(ilots: &[Ilot], geometry: &GeometryModel, config: &LayoutConfig) -> CorridorNetwork {
    let params = CorridorParams::from_config(config);
    let DetectedRows { axis, rows, pairs } = detect_rows(ilots, geometry, &params);

    let edges: Vec<(usize, usize, (u64, usize, usize))> = pairs
        .iter()
        .map(|p| (p.a, p.b, ((p.gap * 1e6).round() as u64, p.a, p.b)))
        .collect();
    let mut selected: Vec<(usize, usize)> = kruskal_indices(rows.len(), &edges)
        .map(|(a, b, _)| (a, b))
        .collect();
    selected.sort_unstable();

    let mut corridors = Vec::new();
    for (a, b) in selected {
        let Some(pair) = pairs.iter().find(|p| p.a == a && p.b == b) else {
            continue;
        };
        let rect = pair.strip;
        let id = corridors.len();
        let (start, end) = axis.along(&rect);
        corridors.push(CorridorSegment {
            id,
            label: format!("C{}: R{}-R{}", id + 1, a, b),
            polygon: rect.to_polygon(),
            rect,
            width: params.width,
            length: end - start,
            area: rect.area(),
            rows: (a, b),
        });
    }

    let links: Vec<(usize, usize)> = corridors.iter().map(|c| c.rows).collect();
    let mut comps = components(rows.len(), &links);
    let mut disconnected = Vec::new();
    if comps.len() > 1 {
        let main = comps
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        comps.remove(main);
        disconnected = comps;
    }

    CorridorNetwork {
        axis,
        rows,
        corridors,
        disconnected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Rotation, SizeCategory};
    use crate::geometry::ClassifiedGeometry;

    fn ilot(id: usize, x: f64, y: f64, w: f64, h: f64) -> Ilot {
        Ilot {
            id,
            rect: Rect::new(x, y, w, h),
            rotation: Rotation::Deg0,
            spec_index: 0,
            category: SizeCategory::Small,
        }
    }

    fn floor(raw: &ClassifiedGeometry) -> GeometryModel {
        GeometryModel::new(raw, &LayoutConfig::default()).unwrap()
    }

    fn room() -> GeometryModel {
        floor(&ClassifiedGeometry::rectangle(20.0, 10.0))
    }

    fn params() -> CorridorParams {
        CorridorParams::from_config(&LayoutConfig::default())
    }

    fn two_rows() -> Vec<Ilot> {
        vec![
            ilot(0, 0.0, 0.0, 2.0, 2.0),
            ilot(1, 2.0, 0.0, 2.0, 2.0),
            ilot(2, 0.0, 3.2, 2.0, 2.0),
            ilot(3, 2.0, 3.2, 2.0, 2.0),
        ]
    }

    /// Two rows of 2×2 units, one at y 0 and one at y 3.2, at the given x.
    fn paired_rows(xs: &[f64]) -> Vec<Ilot> {
        [0.0, 3.2]
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .enumerate()
            .map(|(id, (x, y))| ilot(id, x, y, 2.0, 2.0))
            .collect()
    }

    #[test]
    fn test_detects_horizontal_rows() {
        let detected = detect_rows(&two_rows(), &room(), &params());
        assert_eq!(detected.axis, RowAxis::Horizontal);
        assert_eq!(detected.rows.len(), 2);
        assert_eq!(detected.rows[0].members, vec![0, 1]);
        assert_eq!(detected.rows[0].span, (0.0, 4.0));
        assert_eq!(detected.pairs.len(), 1);
    }

    #[test]
    fn test_detects_vertical_columns() {
        let ilots = vec![
            ilot(0, 0.0, 0.0, 2.0, 2.0),
            ilot(1, 0.0, 2.0, 2.0, 2.0),
            ilot(2, 0.0, 4.0, 2.0, 2.0),
            ilot(3, 4.0, 0.0, 2.0, 2.0),
            ilot(4, 4.0, 2.0, 2.0, 2.0),
            ilot(5, 4.0, 4.0, 2.0, 2.0),
        ];
        let detected = detect_rows(&ilots, &room(), &params());
        assert_eq!(detected.axis, RowAxis::Vertical);
        assert_eq!(detected.rows.len(), 2);
    }

    #[test]
    fn test_axis_with_fewer_groups_beats_more_pairs() {
        // Mixed 2×2 and 4×3 units. Columns along x give two facing pairs but
        // leave three groups apart; the two rows along y connect everything.
        let mut ilots = Vec::new();
        for dy in [0.0, 4.2] {
            for k in 0..5 {
                let x = 4.0 * k as f64;
                let unit = if k % 2 == 0 {
                    ilot(ilots.len(), x, 0.5 + dy, 2.0, 2.0)
                } else {
                    ilot(ilots.len(), x, dy, 4.0, 3.0)
                };
                ilots.push(unit);
            }
        }
        let geometry = floor(&ClassifiedGeometry::rectangle(20.0, 8.0));

        let columns = cluster_rows(&ilots, RowAxis::Vertical, 1.0);
        let column_pairs = facing_pairs(&ilots, &columns, RowAxis::Vertical, &geometry, &params());
        assert_eq!(column_pairs.len(), 2);

        let detected = detect_rows(&ilots, &geometry, &params());
        assert_eq!(detected.axis, RowAxis::Horizontal);
        assert_eq!(detected.rows.len(), 2);

        let net = build_corridor_network(&ilots, &geometry, &LayoutConfig::default());
        assert_eq!(net.axis, RowAxis::Horizontal);
        assert_eq!(net.corridors.len(), 1);
        assert!(net.disconnected.is_empty());
    }

    #[test]
    fn test_single_corridor_between_two_rows() {
        let config = LayoutConfig::default();
        let net = build_corridor_network(&two_rows(), &room(), &config);
        assert_eq!(net.corridors.len(), 1);
        let c = &net.corridors[0];
        assert_eq!(c.rows, (0, 1));
        assert_eq!(c.label, "C1: R0-R1");
        assert!((c.rect.height - 1.2).abs() < 1e-9);
        assert!((c.length - 4.0).abs() < 1e-9);
        assert!((c.area - 4.8).abs() < 1e-9);
        assert!(net.disconnected.is_empty());
    }

    #[test]
    fn test_narrow_gap_is_not_facing() {
        let ilots = vec![
            ilot(0, 0.0, 0.0, 2.0, 2.0),
            ilot(1, 2.0, 0.0, 2.0, 2.0),
            ilot(2, 0.0, 2.5, 2.0, 2.0),
            ilot(3, 2.0, 2.5, 2.0, 2.0),
        ];
        let net = build_corridor_network(&ilots, &room(), &LayoutConfig::default());
        assert!(net.corridors.is_empty());
        assert_eq!(net.disconnected, vec![vec![1]]);
    }

    #[test]
    fn test_mst_skips_non_adjacent_rows() {
        let ilots: Vec<Ilot> = [0.0, 3.5, 7.0]
            .iter()
            .enumerate()
            .flat_map(|(r, &y)| [ilot(2 * r, 0.0, y, 2.0, 2.0), ilot(2 * r + 1, 2.0, y, 2.0, 2.0)])
            .collect();
        let net = build_corridor_network(&ilots, &room(), &LayoutConfig::default());
        // rows 0 and 2 are blocked by row 1, so only adjacent pairs connect
        assert_eq!(net.corridors.len(), 2);
        assert_eq!(net.corridors[0].rows, (0, 1));
        assert_eq!(net.corridors[1].rows, (1, 2));
    }

    #[test]
    fn test_corridors_clear_of_ilots() {
        let mut ilots = two_rows();
        // a stray unit sitting in the middle of the gap
        ilots.push(ilot(4, 3.5, 2.4, 0.5, 0.5));
        let net = build_corridor_network(&ilots, &room(), &LayoutConfig::default());
        for c in &net.corridors {
            for i in &ilots {
                assert!(!c.rect.overlaps(&i.rect));
            }
        }
    }

    #[test]
    fn test_corridor_stops_at_restricted_zone() {
        let raw = ClassifiedGeometry::rectangle(20.0, 8.0).with_restricted(vec![
            [9.0, 0.0],
            [11.0, 0.0],
            [11.0, 8.0],
            [9.0, 8.0],
        ]);
        let geometry = floor(&raw);
        let ilots = paired_rows(&[0.0, 2.0, 4.0, 6.0, 12.0, 14.0, 16.0, 18.0]);

        let net = build_corridor_network(&ilots, &geometry, &LayoutConfig::default());
        assert_eq!(net.axis, RowAxis::Horizontal);
        assert_eq!(net.corridors.len(), 1);
        let c = &net.corridors[0];
        assert_eq!(RowAxis::Horizontal.along(&c.rect), (0.0, 9.0));
        assert!((c.length - 9.0).abs() < 1e-9);
        assert!(geometry.rect_hits_obstacle(&c.rect).is_none());
    }

    #[test]
    fn test_restricted_zone_filling_gap_is_not_facing() {
        let raw = ClassifiedGeometry::rectangle(20.0, 8.0).with_restricted(vec![
            [9.0, 0.0],
            [11.0, 0.0],
            [11.0, 8.0],
            [9.0, 8.0],
        ]);
        let geometry = floor(&raw);
        let ilots = paired_rows(&[0.0, 2.0, 4.0, 6.0, 12.0, 14.0, 16.0, 18.0]);
        // the columns at x 6..8 and 12..14 face across the zone
        let columns = cluster_rows(&ilots, RowAxis::Vertical, 1.0);
        assert!(facing_pairs(&ilots, &columns, RowAxis::Vertical, &geometry, &params()).is_empty());
    }

    #[test]
    fn test_corridor_stays_inside_concave_floor() {
        // U-shaped floor: the notch x 6..14 is open above y 3
        let raw = ClassifiedGeometry {
            boundary: vec![
                [0.0, 0.0],
                [20.0, 0.0],
                [20.0, 10.0],
                [14.0, 10.0],
                [14.0, 3.0],
                [6.0, 3.0],
                [6.0, 10.0],
                [0.0, 10.0],
            ],
            walls: Vec::new(),
            restricted: Vec::new(),
            entrances: Vec::new(),
            scale: 1.0,
        };
        let geometry = floor(&raw);
        let mut ilots: Vec<Ilot> = (0..10).map(|k| ilot(k, 2.0 * k as f64, 0.0, 2.0, 2.0)).collect();
        for y in [3.2, 6.4] {
            for x in [0.0, 2.0, 4.0, 14.0, 16.0, 18.0] {
                ilots.push(ilot(ilots.len(), x, y, 2.0, 2.0));
            }
        }
        assert!(ilots.iter().all(|i| geometry.rect_inside_boundary(&i.rect)));

        let net = build_corridor_network(&ilots, &geometry, &LayoutConfig::default());
        assert_eq!(net.axis, RowAxis::Horizontal);
        assert_eq!(net.corridors.len(), 2);
        assert!(net.disconnected.is_empty());
        for c in &net.corridors {
            assert!(geometry.rect_inside_boundary(&c.rect), "{} leaves the floor", c.label);
            assert!((c.length - 6.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_layout_has_no_network() {
        let net = build_corridor_network(&[], &room(), &LayoutConfig::default());
        assert!(net.rows.is_empty());
        assert!(net.corridors.is_empty());
        assert!(net.disconnected.is_empty());
    }
}
