//! Layout metrics and the composite optimization score.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::SizeCategory;
use crate::compliance::{count_by_severity, Violation};
use crate::corridors::CorridorSegment;
use crate::geometry::GeometryModel;
use crate::placement::Ilot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub count: usize,
    pub area: f64,
}

/// Everything the reporting side reads about a finished layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutMetrics {
    pub coverage_achieved: f64,
    pub coverage_target: f64,
    /// Achieved over target; 1 when the target is 0.
    pub coverage_efficiency: f64,
    pub usable_area: f64,
    pub boundary_area: f64,
    pub total_ilot_area: f64,
    pub ilot_count: usize,
    pub total_corridor_area: f64,
    pub corridor_count: usize,
    pub mean_corridor_width: f64,
    /// Usable area left after îlots and corridors.
    pub free_area: f64,
    pub categories: BTreeMap<SizeCategory, CategoryStats>,
    pub accessibility_score: f64,
    pub optimization_score: f64,
    pub error_count: usize,
    pub warning_count: usize,
}

/// `1 − mean(distance to nearest entrance) / max_travel`, clamped to
/// `[0, 1]`. Zero without îlots or entrances.
pub fn accessibility_score(geometry: &GeometryModel, ilots: &[Ilot], max_travel: f64) -> f64 {
    if ilots.is_empty() || geometry.entrances().is_empty() || max_travel <= 0.0 {
        return 0.0;
    }
    let total: f64 = ilots
        .iter()
        .filter_map(|i| geometry.distance_to_nearest_entrance(i.center()))
        .sum();
    let mean = total / ilots.len() as f64;
    (1.0 - mean / max_travel).clamp(0.0, 1.0)
}

/// How close `achieved` is to `target`, in `[0, 1]`.
pub fn coverage_closeness(achieved: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return if achieved <= 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - (achieved - target).abs() / target).clamp(0.0, 1.0)
}

/// `100 × closeness / (1 + errors + 0.5 × warnings)`.
pub fn optimization_score(closeness: f64, errors: usize, warnings: usize) -> f64 {
    100.0 * closeness / (1.0 + errors as f64 + 0.5 * warnings as f64)
}

/// Ranks finished layouts against each other:
/// `0.6 × closeness + 0.4 × accessibility`.
pub fn selection_score(closeness: f64, accessibility: f64) -> f64 {
    0.6 * closeness + 0.4 * accessibility
}

pub fn category_breakdown(ilots: &[Ilot]) -> BTreeMap<SizeCategory, CategoryStats> {
    let mut out: BTreeMap<SizeCategory, CategoryStats> = SizeCategory::all()
        .into_iter()
        .map(|c| (c, CategoryStats::default()))
        .collect();
    for ilot in ilots {
        let entry = out.entry(ilot.category).or_default();
        entry.count += 1;
        entry.area += ilot.area();
    }
    out
}

pub fn compute_metrics(
    geometry: &GeometryModel,
    ilots: &[Ilot],
    corridors: &[CorridorSegment],
    violations: &[Violation],
    target: f64,
    max_travel: f64,
) -> LayoutMetrics {
    let usable_area = geometry.usable_area();
    let total_ilot_area: f64 = ilots.iter().map(Ilot::area).sum();
    let total_corridor_area: f64 = corridors.iter().map(|c| c.area).sum();
    let coverage_achieved = if usable_area > 0.0 {
        total_ilot_area / usable_area
    } else {
        0.0
    };
    let coverage_efficiency = if target > 0.0 {
        coverage_achieved / target
    } else {
        1.0
    };
    let mean_corridor_width = if corridors.is_empty() {
        0.0
    } else {
        corridors.iter().map(|c| c.width).sum::<f64>() / corridors.len() as f64
    };
    let (error_count, warning_count) = count_by_severity(violations);
    let closeness = coverage_closeness(coverage_achieved, target);

    LayoutMetrics {
        coverage_achieved,
        coverage_target: target,
        coverage_efficiency,
        usable_area,
        boundary_area: geometry.boundary_area(),
        total_ilot_area,
        ilot_count: ilots.len(),
        total_corridor_area,
        corridor_count: corridors.len(),
        mean_corridor_width,
        free_area: (usable_area - total_ilot_area - total_corridor_area).max(0.0),
        categories: category_breakdown(ilots),
        accessibility_score: accessibility_score(geometry, ilots, max_travel),
        optimization_score: optimization_score(closeness, error_count, warning_count),
        error_count,
        warning_count,
    }
}
