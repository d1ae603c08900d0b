//! One layout request, end to end.
//!
//! Geometry → placement → corridors → compliance → scoring, run
//! sequentially. Only a malformed boundary aborts; every other condition is
//! recorded as a [`Diagnostic`] on the returned [`Layout`].
//!
//! [`generate_best_layout`] runs the same request once per strategy and
//! keeps the best-ranked result.

use serde::Serialize;

use crate::compliance::{count_by_severity, validate_all, Violation};
use crate::config::{validate_config, LayoutConfig, Strategy};
use crate::corridors::{build_corridor_network, CorridorSegment, IlotRow, RowAxis};
use crate::error::{Diagnostic, GeometryError};
use crate::geometry::{ClassifiedGeometry, GeometryModel, UsableRegion};
use crate::placement::{place_ilots, Deadline, Ilot};
use crate::scoring::{compute_metrics, coverage_closeness, selection_score, LayoutMetrics};

/// The unit of output handed to the rendering side.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub usable_region: UsableRegion,
    pub ilots: Vec<Ilot>,
    pub corridors: Vec<CorridorSegment>,
    pub rows: Vec<IlotRow>,
    pub row_axis: RowAxis,
    pub metrics: LayoutMetrics,
    pub violations: Vec<Violation>,
    pub diagnostics: Vec<Diagnostic>,
    pub strategy: Strategy,
    pub feasible: bool,
    /// The strategy hit its deadline; the layout is best-so-far.
    pub partial: bool,
}

impl Layout {
    pub fn has_diagnostic(&self, pred: impl Fn(&Diagnostic) -> bool) -> bool {
        self.diagnostics.iter().any(pred)
    }
}

/// Run one layout request.
pub fn generate_layout(
    raw: &ClassifiedGeometry,
    config: &LayoutConfig,
) -> Result<Layout, GeometryError> {
    let mut diagnostics = Vec::new();
    for err in validate_config(config) {
        log::warn!("Config: {}", err);
        diagnostics.push(Diagnostic::from_config_error(&err));
    }

    let geometry = GeometryModel::new(raw, config)?;
    log::info!(
        "Layout request: {} strategy, target {:.1}%, usable area {:.2} of {:.2}",
        config.strategy.name(),
        config.coverage_fraction() * 100.0,
        geometry.usable_area(),
        geometry.boundary_area()
    );

    if config.timeout().is_some() && !config.strategy.is_iterative() {
        log::debug!("{} strategy runs to completion; timeout ignored", config.strategy.name());
    }
    let deadline = Deadline::after(config.timeout());
    let placement = place_ilots(&geometry, config, deadline);
    log::info!(
        "Placement: {} îlot(s), coverage {:.3} after {} attempt(s){}",
        placement.ilots.len(),
        placement.coverage_achieved,
        placement.attempts,
        if placement.partial { " (partial)" } else { "" }
    );
    diagnostics.extend(placement.diagnostics.iter().cloned());

    let network = build_corridor_network(&placement.ilots, &geometry, config);
    log::info!(
        "Corridors: {} row(s), {} corridor(s), {:.2} m²",
        network.rows.len(),
        network.corridors.len(),
        network.total_area()
    );
    for group in &network.disconnected {
        log::warn!("Rows {:?} are not connected to the corridor network", group);
        diagnostics.push(Diagnostic::CorridorDisconnected {
            rows: group.clone(),
        });
    }

    let violations = validate_all(&geometry, &placement.ilots, &network.corridors, config);
    let (errors, warnings) = count_by_severity(&violations);
    if !violations.is_empty() {
        log::info!("Compliance: {} error(s), {} warning(s)", errors, warnings);
        diagnostics.push(Diagnostic::ComplianceViolation { errors, warnings });
    }

    let metrics = compute_metrics(
        &geometry,
        &placement.ilots,
        &network.corridors,
        &violations,
        config.coverage_fraction(),
        config.max_travel_distance,
    );
    log::info!(
        "Layout done: score {:.1}, accessibility {:.2}, {} diagnostic(s)",
        metrics.optimization_score,
        metrics.accessibility_score,
        diagnostics.len()
    );

    Ok(Layout {
        usable_region: geometry.usable_region(),
        ilots: placement.ilots,
        corridors: network.corridors,
        rows: network.rows,
        row_axis: network.axis,
        metrics,
        violations,
        diagnostics,
        strategy: config.strategy,
        feasible: placement.feasible,
        partial: placement.partial,
    })
}

// ── Strategy comparison ─────────────────────────────────────────────────

/// How one strategy fared in [`generate_best_layout`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyScore {
    pub strategy: Strategy,
    pub feasible: bool,
    pub coverage_achieved: f64,
    pub accessibility_score: f64,
    pub selection_score: f64,
}

impl StrategyScore {
    fn of(layout: &Layout) -> Self {
        let m = &layout.metrics;
        Self {
            strategy: layout.strategy,
            feasible: layout.feasible,
            coverage_achieved: m.coverage_achieved,
            accessibility_score: m.accessibility_score,
            selection_score: selection_score(
                coverage_closeness(m.coverage_achieved, m.coverage_target),
                m.accessibility_score,
            ),
        }
    }

    /// Feasible beats infeasible, then the higher selection score.
    fn beats(&self, other: &StrategyScore) -> bool {
        (self.feasible && !other.feasible)
            || (self.feasible == other.feasible && self.selection_score > other.selection_score + 1e-12)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BestLayout {
    pub layout: Layout,
    /// One entry per strategy, in [`Strategy::all`] order.
    pub scores: Vec<StrategyScore>,
}

/// Run every strategy on the same request and keep the layout with the
/// highest selection score. Ties keep the earlier strategy; the
/// configured strategy is ignored.
pub fn generate_best_layout(
    raw: &ClassifiedGeometry,
    config: &LayoutConfig,
) -> Result<BestLayout, GeometryError> {
    let mut layouts = Vec::new();
    let mut scores: Vec<StrategyScore> = Vec::new();
    let mut winner = 0;
    for strategy in Strategy::all() {
        let layout = generate_layout(raw, &config.clone().with_strategy(strategy))?;
        let score = StrategyScore::of(&layout);
        log::info!(
            "Strategy {}: {} îlot(s), selection score {:.3}",
            strategy.name(),
            layout.ilots.len(),
            score.selection_score
        );
        if scores.get(winner).map_or(false, |best| score.beats(best)) {
            winner = scores.len();
        }
        scores.push(score);
        layouts.push(layout);
    }
    let layout = layouts.swap_remove(winner);
    log::info!("Best layout: {} strategy", layout.strategy.name());
    Ok(BestLayout { layout, scores })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, IlotSpec};
    use crate::config::CoverageTarget;

    #[test]
    fn test_degenerate_boundary_is_fatal() {
        let raw = ClassifiedGeometry {
            boundary: vec![[0.0, 0.0], [1.0, 0.0]],
            walls: Vec::new(),
            restricted: Vec::new(),
            entrances: Vec::new(),
            scale: 1.0,
        };
        let err = generate_layout(&raw, &LayoutConfig::default()).unwrap_err();
        assert_eq!(err, GeometryError::TooFewVertices(2));
    }

    #[test]
    fn test_config_problems_are_diagnostics() {
        let mut config = LayoutConfig::default();
        config.corridor_width = 5.0;
        let layout = generate_layout(&ClassifiedGeometry::rectangle(10.0, 8.0), &config).unwrap();
        assert!(layout.has_diagnostic(|d| matches!(d, Diagnostic::InvalidConfig { .. })));
        assert!(layout
            .corridors
            .iter()
            .all(|c| (c.width - 3.0).abs() < 1e-9));
    }

    #[test]
    fn test_infeasible_layout_is_empty_not_error() {
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(20.0, 20.0)]);
        let layout = generate_layout(&ClassifiedGeometry::rectangle(10.0, 8.0), &config).unwrap();
        assert!(!layout.feasible);
        assert!(layout.ilots.is_empty());
        assert!(layout.corridors.is_empty());
        assert!(matches!(
            layout.diagnostics[0],
            Diagnostic::PlacementInfeasible { .. }
        ));
    }

    #[test]
    fn test_best_layout_ranks_every_strategy() {
        let mut config = LayoutConfig::default();
        config.coverage_target = CoverageTarget::Value(0.2);
        config.genetic.max_generations = 10;
        config.force.max_iterations = 20;
        let raw = ClassifiedGeometry::rectangle(12.0, 10.0).with_entrance([6.0, 0.0], [0.0, 1.0], None);

        let best = generate_best_layout(&raw, &config).unwrap();
        let order: Vec<Strategy> = best.scores.iter().map(|s| s.strategy).collect();
        assert_eq!(order, Strategy::all().to_vec());

        let top = best
            .scores
            .iter()
            .find(|s| s.strategy == best.layout.strategy)
            .unwrap();
        for s in &best.scores {
            assert!(s.feasible);
            assert!(top.selection_score >= s.selection_score - 1e-12);
            let expected = 0.6 * coverage_closeness(s.coverage_achieved, 0.2) + 0.4 * s.accessibility_score;
            assert!((s.selection_score - expected).abs() < 1e-9);
        }
        assert_eq!(best.layout.metrics.coverage_achieved, top.coverage_achieved);
    }

    #[test]
    fn test_best_layout_tie_keeps_first_strategy() {
        let mut config = LayoutConfig::default();
        config.catalog = Catalog::new(vec![IlotSpec::new(20.0, 20.0)]);
        let best = generate_best_layout(&ClassifiedGeometry::rectangle(10.0, 8.0), &config).unwrap();
        assert!(best.scores.iter().all(|s| !s.feasible && s.selection_score == 0.0));
        assert_eq!(best.layout.strategy, Strategy::Grid);
    }

    #[test]
    fn test_best_layout_rejects_bad_boundary() {
        let raw = ClassifiedGeometry {
            boundary: vec![[0.0, 0.0], [1.0, 0.0]],
            walls: Vec::new(),
            restricted: Vec::new(),
            entrances: Vec::new(),
            scale: 1.0,
        };
        assert!(generate_best_layout(&raw, &LayoutConfig::default()).is_err());
    }

    #[test]
    fn test_layout_serializes() {
        let mut config = LayoutConfig::default();
        config.coverage_target = CoverageTarget::Value(0.2);
        let raw = ClassifiedGeometry::rectangle(12.0, 10.0).with_entrance([6.0, 0.0], [0.0, 1.0], None);
        let layout = generate_layout(&raw, &config).unwrap();
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["strategy"], "grid");
        assert_eq!(
            json["ilots"].as_array().map(|a| a.len()),
            Some(layout.ilots.len())
        );
        assert!(json["metrics"]["coverage_achieved"].as_f64().is_some());
    }
}
