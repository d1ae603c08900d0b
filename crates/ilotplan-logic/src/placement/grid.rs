//! Grid sweep: rows of envelope-sized cells separated by one corridor.
//!
//! Deterministic: the same geometry and configuration always produce the
//! same rectangles.

use crate::catalog::Rotation;
use crate::primitives::{Rect, EPS};

use super::{LayoutBuilder, PlacementContext, StrategyRun};

pub fn place(ctx: &PlacementContext, target: f64) -> StrategyRun {
    let mut builder = LayoutBuilder::new(ctx);
    let n = ctx.specs.len();
    if n == 0 {
        return StrategyRun::default();
    }
    let (ew, eh) = ctx.envelope();
    let bounds = ctx.geometry.bounds();
    let mut cell = 0usize;

    'rows: for row_y in ctx.row_origins() {
        let mut x = bounds.min_x();
        while x < bounds.max_x() - EPS {
            if builder.reached(target) {
                break 'rows;
            }
            place_cell(ctx, &mut builder, cell % n, x, row_y, (ew, eh), false);
            x += ew;
            cell += 1;
        }
        // trailing partial column, flush with the right-hand wall
        if !builder.reached(target) {
            place_cell(ctx, &mut builder, cell % n, bounds.max_x(), row_y, (ew, eh), true);
        }
    }

    StrategyRun {
        ilots: builder.into_ilots(),
        partial: false,
        rounds: 0,
    }
}

/// Try `first` then every other spec in catalog order, each in both
/// rotations; keep the first valid one. Footprints larger than the cell
/// are skipped so rows stay one corridor apart. With `from_right`, `x` is
/// the cell's right edge.
fn place_cell(
    ctx: &PlacementContext,
    builder: &mut LayoutBuilder,
    first: usize,
    x: f64,
    row_y: f64,
    (ew, eh): (f64, f64),
    from_right: bool,
) -> bool {
    let n = ctx.specs.len();
    for pos in std::iter::once(first).chain((0..n).filter(|&p| p != first)) {
        for rotation in Rotation::both() {
            let (w, h) = ctx.specs[pos].1.footprint(rotation);
            if w > ew + EPS || h > eh + EPS {
                continue;
            }
            let left = if from_right { x - w } else { x };
            let rect = Rect::new(left, row_y + (eh - h) / 2.0, w, h);
            if builder.try_place(pos, rotation, rect) {
                return true;
            }
        }
    }
    false
}
