//! Geometry model: classified CAD primitives turned into a queryable region.
//!
//! The CAD collaborator hands over a [`ClassifiedGeometry`] record in raw
//! drawing units. [`GeometryModel::new`] scales it to physical units,
//! validates the boundary, derives wall normals and entrance clearances, and
//! integrates the usable area once. After construction the model is
//! read-only; placement, corridor and compliance stages only query it.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::error::GeometryError;
use crate::primitives::{
    merge_intervals, nearest_point_on_segment, segment_distance, subtract_intervals,
    total_length, Point, Polygon, Rect, EPS,
};

// ── Raw input ───────────────────────────────────────────────────────────

/// Wall segment as classified by the CAD parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWall {
    pub start: [f64; 2],
    pub end: [f64; 2],
    #[serde(default)]
    pub layer: String,
}

/// Entrance as classified by the CAD parser. `clearance` is in physical
/// units; when absent the configured default applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntrance {
    pub position: [f64; 2],
    #[serde(default)]
    pub direction: [f64; 2],
    #[serde(default)]
    pub clearance: Option<f64>,
}

fn default_scale() -> f64 {
    1.0
}

/// Classified floor geometry in CAD units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedGeometry {
    pub boundary: Vec<[f64; 2]>,
    #[serde(default)]
    pub walls: Vec<RawWall>,
    #[serde(default)]
    pub restricted: Vec<Vec<[f64; 2]>>,
    #[serde(default)]
    pub entrances: Vec<RawEntrance>,
    /// CAD units per physical unit.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl ClassifiedGeometry {
    /// Axis-aligned rectangular floor with its min corner at the origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self {
            boundary: vec![[0.0, 0.0], [width, 0.0], [width, height], [0.0, height]],
            walls: Vec::new(),
            restricted: Vec::new(),
            entrances: Vec::new(),
            scale: 1.0,
        }
    }

    pub fn with_entrance(mut self, position: [f64; 2], direction: [f64; 2], clearance: Option<f64>) -> Self {
        self.entrances.push(RawEntrance {
            position,
            direction,
            clearance,
        });
        self
    }

    pub fn with_restricted(mut self, polygon: Vec<[f64; 2]>) -> Self {
        self.restricted.push(polygon);
        self
    }
}

// ── Normalized model ────────────────────────────────────────────────────

/// A wall with the unit normal pointing into the floor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallSegment {
    pub start: Point,
    pub end: Point,
    pub layer: String,
    pub inward_normal: Point,
}

impl WallSegment {
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn distance_to(&self, p: Point) -> f64 {
        segment_distance(p, self.start, self.end)
    }
}

/// An entrance with its resolved clearance radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Entrance {
    pub position: Point,
    /// Unit vector pointing into the floor.
    pub direction: Point,
    pub clearance: f64,
}

/// A restricted zone. `bounds` is cached for cheap rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obstacle {
    pub polygon: Polygon,
    pub bounds: Rect,
}

/// No-placement disc around an entrance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Disc {
    pub center: Point,
    pub radius: f64,
}

/// Boundary minus obstacles minus entrance discs, with its integrated area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsableRegion {
    pub boundary: Polygon,
    pub holes: Vec<Polygon>,
    pub clearance_discs: Vec<Disc>,
    pub area: f64,
}

/// Read-only spatial model of one floor.
#[derive(Debug, Clone)]
pub struct GeometryModel {
    boundary: Polygon,
    bounds: Rect,
    boundary_area: f64,
    walls: Vec<WallSegment>,
    obstacles: Vec<Obstacle>,
    entrances: Vec<Entrance>,
    usable_area: f64,
    near_entrance_distance: f64,
    wall_contact_tolerance: f64,
}

/// Convenience wrapper: validate `raw` and return only its usable region.
pub fn build_usable_region(
    raw: &ClassifiedGeometry,
    config: &LayoutConfig,
) -> Result<UsableRegion, GeometryError> {
    GeometryModel::new(raw, config).map(|m| m.usable_region())
}

impl GeometryModel {
    pub fn new(raw: &ClassifiedGeometry, config: &LayoutConfig) -> Result<Self, GeometryError> {
        if !(raw.scale.is_finite() && raw.scale > 0.0) {
            return Err(GeometryError::InvalidScale(raw.scale));
        }
        let scale = |p: &[f64; 2]| Point::new(p[0] / raw.scale, p[1] / raw.scale);

        for (i, v) in raw.boundary.iter().enumerate() {
            if !(v[0].is_finite() && v[1].is_finite()) {
                return Err(GeometryError::NonFiniteCoordinate(i));
            }
        }
        let vertices = dedup_ring(raw.boundary.iter().map(scale).collect());
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        let mut boundary = Polygon::new(vertices);
        if let Some((a, b)) = boundary.self_intersection() {
            return Err(GeometryError::SelfIntersecting(a, b));
        }
        if boundary.area() <= EPS {
            return Err(GeometryError::ZeroArea);
        }
        if !boundary.is_ccw() {
            boundary = boundary.reversed();
        }

        let mut obstacles = Vec::new();
        for (i, ring) in raw.restricted.iter().enumerate() {
            if ring.iter().any(|v| !(v[0].is_finite() && v[1].is_finite())) {
                log::warn!("Skipping restricted zone #{}: non-finite coordinate", i);
                continue;
            }
            let verts = dedup_ring(ring.iter().map(scale).collect());
            let polygon = Polygon::new(verts);
            if polygon.len() < 3 || polygon.area() <= EPS {
                log::warn!("Skipping degenerate restricted zone #{}", i);
                continue;
            }
            let bounds = polygon.bounds();
            obstacles.push(Obstacle { polygon, bounds });
        }

        let walls = if raw.walls.is_empty() {
            boundary
                .edges()
                .map(|(a, b)| (a, b, "boundary".to_string()))
                .collect::<Vec<_>>()
        } else {
            raw.walls
                .iter()
                .map(|w| (scale(&w.start), scale(&w.end), w.layer.clone()))
                .collect()
        };
        let walls: Vec<WallSegment> = walls
            .into_iter()
            .filter(|(a, b, _)| a.is_finite() && b.is_finite() && a.distance(*b) > EPS)
            .map(|(start, end, layer)| WallSegment {
                inward_normal: inward_normal(&boundary, start, end),
                start,
                end,
                layer,
            })
            .collect();

        let mut entrances = Vec::new();
        for (i, e) in raw.entrances.iter().enumerate() {
            let position = scale(&e.position);
            if !position.is_finite() {
                log::warn!("Skipping entrance #{}: non-finite position", i);
                continue;
            }
            let clearance = e
                .clearance
                .filter(|c| c.is_finite() && *c > 0.0)
                .unwrap_or(config.entrance_clearance.max(0.0));
            let direction = Point::from(e.direction)
                .normalized()
                .or_else(|| nearest_wall(&walls, position).map(|w| w.inward_normal))
                .unwrap_or(Point::new(0.0, 1.0));
            entrances.push(Entrance {
                position,
                direction,
                clearance,
            });
        }

        let usable_area = integrate_usable_area(&boundary, &obstacles, &entrances);
        let bounds = boundary.bounds();
        let boundary_area = boundary.area();

        Ok(Self {
            boundary,
            bounds,
            boundary_area,
            walls,
            obstacles,
            entrances,
            usable_area,
            near_entrance_distance: config.near_entrance_distance.max(0.0),
            wall_contact_tolerance: config.wall_contact_tolerance.max(0.0),
        })
    }

    pub fn usable_region(&self) -> UsableRegion {
        UsableRegion {
            boundary: self.boundary.clone(),
            holes: self.obstacles.iter().map(|o| o.polygon.clone()).collect(),
            clearance_discs: self
                .entrances
                .iter()
                .map(|e| Disc {
                    center: e.position,
                    radius: e.clearance,
                })
                .collect(),
            area: self.usable_area,
        }
    }

    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn entrances(&self) -> &[Entrance] {
        &self.entrances
    }

    pub fn usable_area(&self) -> f64 {
        self.usable_area
    }

    pub fn boundary_area(&self) -> f64 {
        self.boundary_area
    }

    // ── Point queries ──

    /// `f64::INFINITY` when the model has no walls.
    pub fn distance_to_nearest_wall(&self, p: Point) -> f64 {
        self.walls
            .iter()
            .map(|w| w.distance_to(p))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn nearest_wall_point(&self, p: Point) -> Option<Point> {
        nearest_wall(&self.walls, p).map(|w| nearest_point_on_segment(p, w.start, w.end))
    }

    pub fn is_inside_restricted(&self, p: Point) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.bounds.contains_point(p) && o.polygon.contains(p))
    }

    pub fn is_inside_entrance_clearance(&self, p: Point) -> bool {
        self.entrances
            .iter()
            .any(|e| e.position.distance(p) < e.clearance)
    }

    /// `None` when the floor has no entrances.
    pub fn distance_to_nearest_entrance(&self, p: Point) -> Option<f64> {
        self.entrances
            .iter()
            .map(|e| e.position.distance(p))
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn is_near_entrance(&self, p: Point) -> bool {
        self.entrances
            .iter()
            .any(|e| e.position.distance(p) <= self.near_entrance_distance)
    }

    // ── Rectangle queries ──

    pub fn rect_inside_boundary(&self, rect: &Rect) -> bool {
        rect.min_x() >= self.bounds.min_x() - EPS
            && rect.max_x() <= self.bounds.max_x() + EPS
            && rect.min_y() >= self.bounds.min_y() - EPS
            && rect.max_y() <= self.bounds.max_y() + EPS
            && self.boundary.contains_rect(rect)
    }

    /// Index of the first obstacle sharing interior with `rect`.
    pub fn rect_hits_obstacle(&self, rect: &Rect) -> Option<usize> {
        self.obstacles
            .iter()
            .position(|o| o.bounds.overlaps(rect) && o.polygon.intersects_rect(rect))
    }

    /// Index of the first entrance whose clearance disc reaches `rect`.
    pub fn rect_hits_clearance(&self, rect: &Rect) -> Option<usize> {
        self.entrances
            .iter()
            .position(|e| rect.intersects_disc(e.position, e.clearance))
    }

    pub fn touches_wall(&self, rect: &Rect) -> bool {
        self.walls
            .iter()
            .any(|w| rect.distance_to_segment(w.start, w.end) <= self.wall_contact_tolerance)
    }

    pub fn rect_near_entrance(&self, rect: &Rect) -> bool {
        self.entrances
            .iter()
            .any(|e| rect.distance_to_point(e.position) <= self.near_entrance_distance)
    }

    /// Static validity: inside the boundary, clear of obstacles and clearance
    /// discs, and not touching a wall next to an entrance.
    pub fn rect_fits(&self, rect: &Rect) -> bool {
        rect.width > 0.0
            && rect.height > 0.0
            && self.rect_inside_boundary(rect)
            && self.rect_hits_obstacle(rect).is_none()
            && self.rect_hits_clearance(rect).is_none()
            && !(self.touches_wall(rect) && self.rect_near_entrance(rect))
    }
}

fn nearest_wall(walls: &[WallSegment], p: Point) -> Option<&WallSegment> {
    walls
        .iter()
        .min_by(|a, b| a.distance_to(p).total_cmp(&b.distance_to(p)))
}

/// Drop consecutive duplicates and a repeated closing vertex.
fn dedup_ring(mut vertices: Vec<Point>) -> Vec<Point> {
    vertices.dedup_by(|b, a| a.distance(*b) <= EPS);
    while vertices.len() > 1 {
        match (vertices.first(), vertices.last()) {
            (Some(f), Some(l)) if f.distance(*l) <= EPS => {
                vertices.pop();
            }
            _ => break,
        }
    }
    vertices
}

fn inward_normal(boundary: &Polygon, a: Point, b: Point) -> Point {
    let dir = b.sub(a);
    let left = Point::new(-dir.y, dir.x)
        .normalized()
        .unwrap_or(Point::new(0.0, 1.0));
    let mid = a.add(b).scale(0.5);
    let probe = (dir.length() * 1e-3).clamp(1e-6, 1e-2);
    if boundary.contains(mid.add(left.scale(probe))) {
        left
    } else {
        left.scale(-1.0)
    }
}

/// Scanline integration of boundary − obstacles − discs. Strip edges are
/// placed at every vertex and disc extreme, and strips are subdivided so
/// curved disc chords are sampled finely.
fn integrate_usable_area(boundary: &Polygon, obstacles: &[Obstacle], entrances: &[Entrance]) -> f64 {
    let b = boundary.bounds();
    let (lo, hi) = (b.min_y(), b.max_y());
    let mut ys: Vec<f64> = vec![lo, hi];
    ys.extend(boundary.vertices.iter().map(|v| v.y));
    for o in obstacles {
        ys.extend(o.polygon.vertices.iter().map(|v| v.y));
    }
    for e in entrances {
        ys.push(e.position.y - e.clearance);
        ys.push(e.position.y + e.clearance);
    }
    ys.retain(|y| y.is_finite() && *y >= lo && *y <= hi);
    ys.sort_by(|a, b| a.total_cmp(b));
    ys.dedup_by(|a, b| (*a - *b).abs() <= EPS);

    let base = (b.height / 1024.0).max(1e-6);
    let mut area = 0.0;
    for w in ys.windows(2) {
        let (y0, y1) = (w[0], w[1]);
        let span = y1 - y0;
        if span <= 0.0 {
            continue;
        }
        let steps = (span / base).ceil().max(1.0) as usize;
        let h = span / steps as f64;
        for i in 0..steps {
            let y = y0 + (i as f64 + 0.5) * h;
            let inside = boundary.scanline_intervals(y);
            let mut cut = Vec::new();
            for o in obstacles {
                if y > o.bounds.min_y() && y < o.bounds.max_y() {
                    cut.extend(o.polygon.scanline_intervals(y));
                }
            }
            for e in entrances {
                let dy = y - e.position.y;
                if dy.abs() < e.clearance {
                    let half = (e.clearance * e.clearance - dy * dy).sqrt();
                    cut.push((e.position.x - half, e.position.x + half));
                }
            }
            area += total_length(&subtract_intervals(&inside, &merge_intervals(cut))) * h;
        }
    }
    area
}
