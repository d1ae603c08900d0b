//! Accessibility-first placement: large items nearest the entrances.

use crate::catalog::Rotation;
use crate::geometry::GeometryModel;
use crate::primitives::{Point, Rect, EPS};

use super::{lattice, LayoutBuilder, PlacementContext, StrategyRun};

/// Distance to the nearest entrance sampled on a square lattice over the
/// usable region. Without entrances the distance is to the boundary centroid.
#[derive(Debug, Clone)]
pub struct DistanceField {
    origin: Point,
    resolution: f64,
    cols: usize,
    rows: usize,
    /// Row-major; `None` where the node is outside the usable region.
    values: Vec<Option<f64>>,
}

impl DistanceField {
    pub fn build(geometry: &GeometryModel, resolution: f64) -> Self {
        let b = geometry.bounds();
        let cols = (b.width / resolution).floor() as usize + 1;
        let rows = (b.height / resolution).floor() as usize + 1;
        let centroid = geometry.boundary().centroid();
        let mut values = Vec::with_capacity(cols * rows);
        for r in 0..rows {
            for c in 0..cols {
                let p = Point::new(
                    b.min_x() + c as f64 * resolution,
                    b.min_y() + r as f64 * resolution,
                );
                let usable = geometry.boundary().contains(p)
                    && !geometry.is_inside_restricted(p)
                    && !geometry.is_inside_entrance_clearance(p);
                values.push(usable.then(|| {
                    geometry
                        .distance_to_nearest_entrance(p)
                        .unwrap_or_else(|| p.distance(centroid))
                }));
            }
        }
        Self {
            origin: Point::new(b.min_x(), b.min_y()),
            resolution,
            cols,
            rows,
            values,
        }
    }

    /// Value at the lattice node nearest `p`; unusable nodes read as infinity.
    pub fn sample(&self, p: Point) -> f64 {
        let c = ((p.x - self.origin.x) / self.resolution).round();
        let r = ((p.y - self.origin.y) / self.resolution).round();
        if c < 0.0 || r < 0.0 {
            return f64::INFINITY;
        }
        let (c, r) = (c as usize, r as usize);
        if c >= self.cols || r >= self.rows {
            return f64::INFINITY;
        }
        self.values[r * self.cols + c].unwrap_or(f64::INFINITY)
    }

    pub fn usable_nodes(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

pub fn place(ctx: &PlacementContext, target: f64) -> StrategyRun {
    let n = ctx.specs.len();
    if n == 0 {
        return StrategyRun::default();
    }
    let resolution = ctx.config.field_resolution();
    let field = DistanceField::build(ctx.geometry, resolution);
    let (ew, eh) = ctx.envelope();
    let b = ctx.geometry.bounds();

    // anchors on the grid's row lattice, scored at the envelope cell center
    let mut anchors: Vec<(f64, Point)> = Vec::new();
    for row_y in ctx.row_origins() {
        for x in lattice(b.min_x(), b.max_x() - ew.min(b.width), resolution) {
            let cell_center = Point::new(x + ew / 2.0, row_y + eh / 2.0);
            let score = field.sample(cell_center);
            anchors.push((score, Point::new(x, row_y)));
        }
    }
    anchors.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then(a.1.y.total_cmp(&b.1.y))
            .then(a.1.x.total_cmp(&b.1.x))
    });

    let by_area = ctx.specs_by_area_desc();
    let band_len = anchors.len().div_ceil(n).max(1);
    let mut builder = LayoutBuilder::new(ctx);

    for (k, (_, anchor)) in anchors.iter().enumerate() {
        if builder.reached(target) {
            break;
        }
        let band = (k / band_len).min(n - 1);
        'specs: for &pos in &by_area[band..] {
            for rotation in Rotation::both() {
                let (w, h) = ctx.specs[pos].1.footprint(rotation);
                if w > ew + EPS || h > eh + EPS {
                    continue;
                }
                let rect = Rect::new(anchor.x, anchor.y + (eh - h) / 2.0, w, h);
                if builder.try_place(pos, rotation, rect) {
                    break 'specs;
                }
            }
        }
    }

    StrategyRun {
        ilots: builder.into_ilots(),
        partial: false,
        rounds: 0,
    }
}
