//! Placement engine: fills the usable region with non-overlapping îlots.
//!
//! Four interchangeable strategies share one contract. Each receives a
//! [`PlacementContext`] and a coverage target and returns the îlots it
//! placed. The engine around them handles what is common to all:
//!
//! | step | behavior |
//! |------|----------|
//! | probe | scan for one valid position of the smallest catalog item; none means infeasible |
//! | zero target | nothing is placed, the layout is still feasible |
//! | shortfall | if the target is missed, lower it by a fixed step and retry; the best attempt wins |
//! | deadline | iterative strategies stop early and flag the result partial |
//!
//! Validity is shared too ([`LayoutBuilder::fits`]): inside the boundary,
//! clear of obstacles and entrance discs, no overlap with placed îlots, no
//! wall contact next to an entrance.

pub mod accessibility;
pub mod force;
pub mod genetic;
pub mod grid;

use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::catalog::{IlotSpec, Rotation, SizeCategory};
use crate::config::{LayoutConfig, Strategy};
use crate::error::Diagnostic;
use crate::geometry::GeometryModel;
use crate::primitives::{Point, Rect, EPS};
use crate::scoring;

/// A placed îlot. Immutable once placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ilot {
    pub id: usize,
    pub rect: Rect,
    pub rotation: Rotation,
    /// Index into the configured catalog.
    pub spec_index: usize,
    pub category: SizeCategory,
}

impl Ilot {
    pub fn area(&self) -> f64 {
        self.rect.area()
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }
}

/// Cooperative deadline, checked at generation/iteration boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Self(None)
    }

    /// Deadline `timeout` from now; `None` never expires.
    pub fn after(timeout: Option<Duration>) -> Self {
        Self(timeout.and_then(|t| Instant::now().checked_add(t)))
    }

    pub fn expired(&self) -> bool {
        self.0.is_some_and(|d| Instant::now() >= d)
    }
}

/// Everything a strategy reads. Built once per request.
pub struct PlacementContext<'a> {
    pub geometry: &'a GeometryModel,
    pub config: &'a LayoutConfig,
    /// Valid catalog entries in catalog order, with their catalog index.
    pub specs: Vec<(usize, IlotSpec)>,
    pub corridor_width: f64,
    pub deadline: Deadline,
}

impl<'a> PlacementContext<'a> {
    pub fn new(geometry: &'a GeometryModel, config: &'a LayoutConfig, deadline: Deadline) -> Self {
        let specs = config
            .catalog
            .specs()
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, s)| s.is_valid())
            .collect();
        Self {
            geometry,
            config,
            specs,
            corridor_width: config.corridor_width(),
            deadline,
        }
    }

    pub fn usable_area(&self) -> f64 {
        self.geometry.usable_area()
    }

    /// Envelope of all valid specs, unrotated: `(max width, max height)`.
    pub fn envelope(&self) -> (f64, f64) {
        self.specs
            .iter()
            .fold((0.0_f64, 0.0_f64), |(w, h), (_, s)| (w.max(s.width), h.max(s.height)))
    }

    pub fn mean_spec_area(&self) -> f64 {
        if self.specs.is_empty() {
            return 0.0;
        }
        self.specs.iter().map(|(_, s)| s.area()).sum::<f64>() / self.specs.len() as f64
    }

    /// Positions into `specs`, largest area first (catalog order on ties).
    pub fn specs_by_area_desc(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.specs.len()).collect();
        order.sort_by(|&a, &b| {
            self.specs[b]
                .1
                .area()
                .total_cmp(&self.specs[a].1.area())
                .then(a.cmp(&b))
        });
        order
    }

    fn smallest_spec(&self) -> Option<usize> {
        self.specs_by_area_desc().last().copied()
    }

    /// Rectangle of spec position `pos` at `(x, y)` in `rotation`.
    pub fn footprint_rect(&self, pos: usize, rotation: Rotation, x: f64, y: f64) -> Rect {
        let (w, h) = self.specs[pos].1.footprint(rotation);
        Rect::new(x, y, w, h)
    }

    /// Row lattice shared by the grid and accessibility strategies: row
    /// bottoms spaced by the envelope height plus one corridor.
    pub fn row_origins(&self) -> Vec<f64> {
        let (_, eh) = self.envelope();
        let bounds = self.geometry.bounds();
        let pitch = eh + self.corridor_width;
        let min_h = self
            .specs
            .iter()
            .map(|(_, s)| s.width.min(s.height))
            .fold(f64::INFINITY, f64::min);
        let mut rows = Vec::new();
        if pitch <= 0.0 || !min_h.is_finite() {
            return rows;
        }
        let mut k = 0u32;
        loop {
            let y = bounds.min_y() + k as f64 * pitch;
            if y + min_h > bounds.max_y() + EPS {
                break;
            }
            rows.push(y);
            k += 1;
        }
        rows
    }
}

/// Incrementally built layout with the shared validity rule.
pub struct LayoutBuilder<'c, 'a> {
    ctx: &'c PlacementContext<'a>,
    ilots: Vec<Ilot>,
    area: f64,
}

impl<'c, 'a> LayoutBuilder<'c, 'a> {
    pub fn new(ctx: &'c PlacementContext<'a>) -> Self {
        Self {
            ctx,
            ilots: Vec::new(),
            area: 0.0,
        }
    }

    pub fn fits(&self, rect: &Rect) -> bool {
        self.ctx.geometry.rect_fits(rect) && !self.ilots.iter().any(|i| i.rect.overlaps(rect))
    }

    /// Place spec position `pos` if the rectangle is valid.
    pub fn try_place(&mut self, pos: usize, rotation: Rotation, rect: Rect) -> bool {
        if !self.fits(&rect) {
            return false;
        }
        let (spec_index, spec) = self.ctx.specs[pos];
        self.area += rect.area();
        self.ilots.push(Ilot {
            id: self.ilots.len(),
            rect,
            rotation,
            spec_index,
            category: spec.category(&self.ctx.config.categories),
        });
        true
    }

    pub fn coverage(&self) -> f64 {
        coverage_of(self.area, self.ctx.usable_area())
    }

    pub fn reached(&self, target: f64) -> bool {
        self.coverage() + 1e-9 >= target
    }

    pub fn len(&self) -> usize {
        self.ilots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ilots.is_empty()
    }

    pub fn ilots(&self) -> &[Ilot] {
        &self.ilots
    }

    pub fn into_ilots(self) -> Vec<Ilot> {
        self.ilots
    }
}

pub(crate) fn coverage_of(area: f64, usable: f64) -> f64 {
    if usable > EPS {
        area / usable
    } else {
        0.0
    }
}

/// A positioned catalog choice. Shared by the genetic chromosome and the
/// force-directed initial layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gene {
    pub x: f64,
    pub y: f64,
    /// Position into `PlacementContext::specs`.
    pub spec: usize,
    pub rotation: Rotation,
}

impl Gene {
    pub fn rect(&self, ctx: &PlacementContext) -> Rect {
        ctx.footprint_rect(self.spec, self.rotation, self.x, self.y)
    }
}

/// Uniform gene over the bounding box, keeping the footprint inside it.
pub fn random_gene(ctx: &PlacementContext, rng: &mut impl Rng) -> Gene {
    let spec = rng.gen_range(0..ctx.specs.len());
    let rotation = if rng.gen_bool(0.5) {
        Rotation::Deg90
    } else {
        Rotation::Deg0
    };
    let (w, h) = ctx.specs[spec].1.footprint(rotation);
    let b = ctx.geometry.bounds();
    Gene {
        x: uniform(rng, b.min_x(), b.max_x() - w),
        y: uniform(rng, b.min_y(), b.max_y() - h),
        spec,
        rotation,
    }
}

pub(crate) fn uniform(rng: &mut impl Rng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Gene count that could reach `target` with average-sized îlots, with
/// headroom for rejected genes.
pub fn gene_budget(ctx: &PlacementContext, target: f64) -> usize {
    let mean = ctx.mean_spec_area();
    if mean <= 0.0 {
        return 0;
    }
    let needed = (target * ctx.usable_area() / mean).ceil();
    ((needed * 1.5).ceil() as usize).clamp(1, 4096)
}

/// Random layout decoded greedily until `target`: the seed of both the
/// genetic population and the force-directed bodies.
pub fn random_layout(ctx: &PlacementContext, target: f64, rng: &mut impl Rng) -> Vec<Ilot> {
    let mut builder = LayoutBuilder::new(ctx);
    let attempts = gene_budget(ctx, target) * 4;
    for _ in 0..attempts {
        if builder.reached(target) {
            break;
        }
        let gene = random_gene(ctx, rng);
        builder.try_place(gene.spec, gene.rotation, gene.rect(ctx));
    }
    builder.into_ilots()
}

/// Result of one strategy run at one target.
#[derive(Debug, Clone, Default)]
pub struct StrategyRun {
    pub ilots: Vec<Ilot>,
    pub partial: bool,
    /// Generations or iterations completed (0 for one-shot strategies).
    pub rounds: u32,
}

fn run_strategy(ctx: &PlacementContext, target: f64) -> StrategyRun {
    match ctx.config.strategy {
        Strategy::Grid => grid::place(ctx, target),
        Strategy::Genetic => genetic::place(ctx, target),
        Strategy::ForceDirected => force::place(ctx, target),
        Strategy::Accessibility => accessibility::place(ctx, target),
    }
}

/// Scan the bounding box for one valid position of the smallest spec in
/// either rotation. Besides the lattice, positions flush against every
/// boundary, obstacle and clearance edge are tried, so gaps that fall
/// between lattice points are still found.
pub fn probe_feasibility(ctx: &PlacementContext) -> bool {
    let Some(pos) = ctx.smallest_spec() else {
        return false;
    };
    let step = ctx.config.field_resolution();
    let b = ctx.geometry.bounds();
    let (edge_xs, edge_ys) = edge_coordinates(ctx.geometry);
    let builder = LayoutBuilder::new(ctx);
    for rotation in Rotation::both() {
        let (w, h) = ctx.specs[pos].1.footprint(rotation);
        let xs = with_flush_positions(
            lattice(b.min_x(), b.max_x() - w, step),
            &edge_xs,
            w,
            (b.min_x(), b.max_x() - w),
        );
        let ys = with_flush_positions(
            lattice(b.min_y(), b.max_y() - h, step),
            &edge_ys,
            h,
            (b.min_y(), b.max_y() - h),
        );
        for &y in &ys {
            for &x in &xs {
                if builder.fits(&Rect::new(x, y, w, h)) {
                    return true;
                }
            }
        }
    }
    false
}

/// x and y coordinates of boundary vertices, obstacle vertices and the
/// extremes of each entrance clearance disc.
fn edge_coordinates(geometry: &GeometryModel) -> (Vec<f64>, Vec<f64>) {
    let vertices = geometry
        .boundary()
        .vertices
        .iter()
        .chain(geometry.obstacles().iter().flat_map(|o| o.polygon.vertices.iter()));
    let (mut xs, mut ys): (Vec<f64>, Vec<f64>) = vertices.map(|p| (p.x, p.y)).unzip();
    for e in geometry.entrances() {
        xs.extend([e.position.x - e.clearance, e.position.x + e.clearance]);
        ys.extend([e.position.y - e.clearance, e.position.y + e.clearance]);
    }
    (xs, ys)
}

/// `base` plus every position that puts an item of `size` flush against
/// one of `coords` from either side, kept within `range`, sorted, deduped.
fn with_flush_positions(mut base: Vec<f64>, coords: &[f64], size: f64, range: (f64, f64)) -> Vec<f64> {
    for &c in coords {
        for v in [c, c - size] {
            if v >= range.0 - EPS && v <= range.1 + EPS {
                base.push(v);
            }
        }
    }
    base.sort_by(f64::total_cmp);
    base.dedup_by(|a, b| (*a - *b).abs() <= EPS);
    base
}

/// `lo, lo + step, ...` up to `hi`, plus `hi` itself so the far edge is tried.
pub(crate) fn lattice(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if hi < lo - EPS {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut k = 0u32;
    loop {
        let v = lo + k as f64 * step;
        if v > hi + EPS {
            break;
        }
        out.push(v);
        k += 1;
    }
    if out.last().map_or(true, |&last| hi - last > EPS) {
        out.push(hi.max(lo));
    }
    out
}

/// Final record of the placement stage.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementOutcome {
    pub ilots: Vec<Ilot>,
    pub coverage_achieved: f64,
    pub accessibility_score: f64,
    pub feasible: bool,
    pub partial: bool,
    /// Target of the winning attempt after shortfall reductions.
    pub effective_target: f64,
    pub strategy: Strategy,
    pub attempts: u32,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the configured strategy with the shortfall policy around it.
pub fn place_ilots(
    geometry: &GeometryModel,
    config: &LayoutConfig,
    deadline: Deadline,
) -> PlacementOutcome {
    let ctx = PlacementContext::new(geometry, config, deadline);
    let requested = config.coverage_fraction();
    let mut outcome = PlacementOutcome {
        ilots: Vec::new(),
        coverage_achieved: 0.0,
        accessibility_score: 0.0,
        feasible: false,
        partial: false,
        effective_target: requested,
        strategy: config.strategy,
        attempts: 0,
        diagnostics: Vec::new(),
    };

    if !probe_feasibility(&ctx) {
        let reason = if ctx.specs.is_empty() {
            "catalog has no valid item".to_string()
        } else {
            "smallest item fits nowhere in the usable region".to_string()
        };
        log::warn!("Placement infeasible: {}", reason);
        outcome
            .diagnostics
            .push(Diagnostic::PlacementInfeasible { reason });
        return outcome;
    }
    outcome.feasible = true;
    if requested <= 0.0 {
        return outcome;
    }

    let tolerance = config.shortfall_tolerance.max(0.0);
    let step = config.shortfall_step();
    let mut target = requested;
    let mut best: Option<(f64, f64, StrategyRun)> = None;
    let mut truncated: Option<u32> = None;

    loop {
        outcome.attempts += 1;
        let run = run_strategy(&ctx, target);
        let area: f64 = run.ilots.iter().map(Ilot::area).sum();
        let achieved = coverage_of(area, ctx.usable_area());
        log::debug!(
            "{} attempt {} at target {:.3}: {} îlots, coverage {:.3}",
            config.strategy.name(),
            outcome.attempts,
            target,
            run.ilots.len(),
            achieved
        );
        if run.partial {
            truncated = Some(run.rounds);
        }
        let stop = achieved + tolerance >= target
            || run.partial
            || deadline.expired()
            || outcome.attempts > config.max_shortfall_retries;
        let improves = best
            .as_ref()
            .map_or(true, |(best_cov, _, _)| achieved > *best_cov + 1e-12);
        if improves {
            best = Some((achieved, target, run));
        }
        if stop {
            break;
        }
        target -= step;
        if target <= EPS {
            break;
        }
    }

    if let Some((achieved, effective, run)) = best {
        outcome.coverage_achieved = achieved;
        outcome.effective_target = effective;
        outcome.partial = run.partial;
        outcome.ilots = run.ilots;
    }
    if let Some(completed) = truncated {
        log::warn!(
            "{} hit its deadline after {} round(s)",
            config.strategy.name(),
            completed
        );
        outcome.partial = true;
        outcome.diagnostics.push(Diagnostic::Timeout {
            strategy: config.strategy,
            completed,
        });
    }
    if outcome.coverage_achieved + tolerance < requested {
        outcome.diagnostics.push(Diagnostic::CoverageShortfall {
            requested,
            achieved: outcome.coverage_achieved,
            attempts: outcome.attempts,
        });
    }
    outcome.accessibility_score =
        scoring::accessibility_score(geometry, &outcome.ilots, config.max_travel_distance);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, IlotSpec};
    use crate::geometry::ClassifiedGeometry;

    fn model(raw: &ClassifiedGeometry) -> GeometryModel {
        GeometryModel::new(raw, &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn test_lattice_includes_far_edge() {
        assert_eq!(lattice(0.0, 1.2, 0.5), vec![0.0, 0.5, 1.0, 1.2]);
        assert_eq!(lattice(0.0, 1.0, 0.5), vec![0.0, 0.5, 1.0]);
        assert!(lattice(0.0, -1.0, 0.5).is_empty());
    }

    #[test]
    fn test_deadline() {
        assert!(!Deadline::none().expired());
        assert!(Deadline::after(Some(Duration::ZERO)).expired());
        assert!(!Deadline::after(Some(Duration::from_secs(3600))).expired());
    }

    #[test]
    fn test_probe_fails_when_item_too_large() {
        let g = model(&ClassifiedGeometry::rectangle(3.0, 3.0));
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(4.0, 4.0)]);
        let outcome = place_ilots(&g, &config, Deadline::none());
        assert!(!outcome.feasible);
        assert!(outcome.ilots.is_empty());
        assert!(matches!(
            outcome.diagnostics[0],
            Diagnostic::PlacementInfeasible { .. }
        ));
    }

    #[test]
    fn test_probe_accepts_rotated_fit() {
        let g = model(&ClassifiedGeometry::rectangle(2.0, 5.0));
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(4.0, 1.0)]);
        let ctx = PlacementContext::new(&g, &config, Deadline::none());
        assert!(probe_feasibility(&ctx));
    }

    #[test]
    fn test_feasibility_finds_gap_between_lattice_points() {
        // 2.2 m free between zones ending at x 3.3 and starting at x 5.5;
        // no 0.5 m lattice point lands on 3.3
        let raw = ClassifiedGeometry::rectangle(8.8, 2.2)
            .with_restricted(vec![[0.0, 0.0], [3.3, 0.0], [3.3, 2.2], [0.0, 2.2]])
            .with_restricted(vec![[5.5, 0.0], [8.8, 0.0], [8.8, 2.2], [5.5, 2.2]]);
        let g = model(&raw);
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(2.2, 2.2)]);
        let ctx = PlacementContext::new(&g, &config, Deadline::none());
        assert!(probe_feasibility(&ctx));

        let outcome = place_ilots(&g, &config, Deadline::none());
        assert!(outcome.feasible);
    }

    #[test]
    fn test_flush_positions_merge_with_lattice() {
        let xs = with_flush_positions(lattice(0.0, 2.0, 1.0), &[1.5, 3.3, -4.0], 1.0, (0.0, 2.0));
        assert_eq!(xs, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_zero_target_places_nothing() {
        let g = model(&ClassifiedGeometry::rectangle(10.0, 8.0));
        let mut config = LayoutConfig::default();
        config.coverage_target = crate::config::CoverageTarget::Value(0.0);
        let outcome = place_ilots(&g, &config, Deadline::none());
        assert!(outcome.feasible);
        assert!(outcome.ilots.is_empty());
        assert_eq!(outcome.attempts, 0);
    }

    #[test]
    fn test_shortfall_reported_for_unreachable_target() {
        let g = model(&ClassifiedGeometry::rectangle(10.0, 8.0));
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(2.0, 2.0)]);
        config.coverage_target = crate::config::CoverageTarget::Value(1.0);
        let outcome = place_ilots(&g, &config, Deadline::none());
        assert!(outcome.feasible);
        assert!(outcome.attempts > 1);
        assert!(outcome.coverage_achieved > 0.0 && outcome.coverage_achieved < 1.0);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::CoverageShortfall { .. })));
    }

    #[test]
    fn test_invalid_specs_are_ignored() {
        let g = model(&ClassifiedGeometry::rectangle(10.0, 8.0));
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(-1.0, 2.0), IlotSpec::new(2.0, 2.0)]);
        let ctx = PlacementContext::new(&g, &config, Deadline::none());
        assert_eq!(ctx.specs.len(), 1);
        assert_eq!(ctx.specs[0].0, 1);
        let outcome = place_ilots(&g, &config, Deadline::none());
        assert!(outcome.ilots.iter().all(|i| i.spec_index == 1));
    }

    #[test]
    fn test_row_origins_follow_pitch() {
        let g = model(&ClassifiedGeometry::rectangle(10.0, 8.0));
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(2.0, 2.0)]);
        let ctx = PlacementContext::new(&g, &config, Deadline::none());
        let rows = ctx.row_origins();
        assert_eq!(rows.len(), 2);
        assert!((rows[1] - 3.2).abs() < 1e-9);
    }
}
