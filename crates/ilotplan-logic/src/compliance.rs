//! Accessibility and building-code checks for a finished layout.
//!
//! Pure functions over the layout; nothing here mutates it. Each check
//! returns its own violations and `validate_all` concatenates them in a
//! fixed order.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::corridors::CorridorSegment;
use crate::geometry::GeometryModel;
use crate::placement::Ilot;
use crate::primitives::{Point, EPS};

/// What a violation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    CorridorTooNarrow,
    CorridorTooWide,
    EntranceObstructed,
    TravelDistanceExceeded,
    NoEntrances,
    IlotOverlap,
    OutsideBoundary,
    ObstacleIntersection,
}

/// Violation severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A compliance violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub location: Point,
    pub message: String,
}

// ── A. Corridors ────────────────────────────────────────────────────────

/// Corridors narrower than the accessibility minimum are errors; wider than
/// the maximum, warnings.
pub fn check_corridor_widths(
    corridors: &[CorridorSegment],
    min_width: f64,
    max_width: f64,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    for c in corridors {
        if c.width < min_width - 1e-9 {
            violations.push(Violation {
                kind: ViolationKind::CorridorTooNarrow,
                severity: Severity::Error,
                location: c.rect.center(),
                message: format!(
                    "Corridor {} is {:.2} wide, below the {:.2} minimum",
                    c.label, c.width, min_width
                ),
            });
        } else if c.width > max_width + 1e-9 {
            violations.push(Violation {
                kind: ViolationKind::CorridorTooWide,
                severity: Severity::Warning,
                location: c.rect.center(),
                message: format!(
                    "Corridor {} is {:.2} wide, above the {:.2} maximum",
                    c.label, c.width, max_width
                ),
            });
        }
    }
    violations
}

// ── B. Entrances ────────────────────────────────────────────────────────

/// Every entrance keeps its full clearance disc free of îlots.
/// Corridors must stay on the floor and out of restricted zones.
pub fn check_corridor_placement(geometry: &GeometryModel, corridors: &[CorridorSegment]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for c in corridors {
        if !geometry.rect_inside_boundary(&c.rect) {
            violations.push(Violation {
                kind: ViolationKind::OutsideBoundary,
                severity: Severity::Error,
                location: c.rect.center(),
                message: format!("Corridor {} extends outside the boundary", c.label),
            });
        }
        if let Some(o) = geometry.rect_hits_obstacle(&c.rect) {
            violations.push(Violation {
                kind: ViolationKind::ObstacleIntersection,
                severity: Severity::Error,
                location: c.rect.center(),
                message: format!("Corridor {} crosses restricted zone #{}", c.label, o),
            });
        }
    }
    violations
}

pub fn check_entrance_clearance(geometry: &GeometryModel, ilots: &[Ilot]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (e_idx, e) in geometry.entrances().iter().enumerate() {
        for ilot in ilots {
            if ilot.rect.intersects_disc(e.position, e.clearance) {
                violations.push(Violation {
                    kind: ViolationKind::EntranceObstructed,
                    severity: Severity::Error,
                    location: e.position,
                    message: format!(
                        "Îlot #{} intrudes into the {:.2} clearance of entrance #{}",
                        ilot.id, e.clearance, e_idx
                    ),
                });
            }
        }
    }
    violations
}

/// Travel distance from each îlot centroid to its nearest entrance. A floor
/// without entrances gets one warning and the check is skipped.
pub fn check_travel_distance(geometry: &GeometryModel, ilots: &[Ilot], limit: f64) -> Vec<Violation> {
    if geometry.entrances().is_empty() {
        if ilots.is_empty() {
            return Vec::new();
        }
        return vec![Violation {
            kind: ViolationKind::NoEntrances,
            severity: Severity::Warning,
            location: geometry.boundary().centroid(),
            message: "Floor has no entrances; travel distance not checked".to_string(),
        }];
    }
    let mut violations = Vec::new();
    for ilot in ilots {
        let c = ilot.center();
        let Some(d) = geometry.distance_to_nearest_entrance(c) else {
            continue;
        };
        if d > limit + EPS {
            violations.push(Violation {
                kind: ViolationKind::TravelDistanceExceeded,
                severity: Severity::Error,
                location: c,
                message: format!(
                    "Îlot #{} is {:.1} from the nearest entrance (limit {:.1})",
                    ilot.id, d, limit
                ),
            });
        }
    }
    violations
}

// ── C. Layout invariants ────────────────────────────────────────────────

pub fn check_ilot_overlaps(ilots: &[Ilot]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (i, a) in ilots.iter().enumerate() {
        for b in &ilots[i + 1..] {
            if a.rect.overlaps(&b.rect) {
                violations.push(Violation {
                    kind: ViolationKind::IlotOverlap,
                    severity: Severity::Error,
                    location: a.center(),
                    message: format!(
                        "Îlot #{} overlaps îlot #{} ({:.2} m²)",
                        a.id,
                        b.id,
                        a.rect.overlap_area(&b.rect)
                    ),
                });
            }
        }
    }
    violations
}

pub fn check_containment(geometry: &GeometryModel, ilots: &[Ilot]) -> Vec<Violation> {
    ilots
        .iter()
        .filter(|i| !geometry.rect_inside_boundary(&i.rect))
        .map(|i| Violation {
            kind: ViolationKind::OutsideBoundary,
            severity: Severity::Error,
            location: i.center(),
            message: format!("Îlot #{} extends outside the boundary", i.id),
        })
        .collect()
}

pub fn check_obstacles(geometry: &GeometryModel, ilots: &[Ilot]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for ilot in ilots {
        if let Some(o) = geometry.rect_hits_obstacle(&ilot.rect) {
            violations.push(Violation {
                kind: ViolationKind::ObstacleIntersection,
                severity: Severity::Error,
                location: ilot.center(),
                message: format!("Îlot #{} intersects restricted zone #{}", ilot.id, o),
            });
        }
    }
    violations
}

// ── Master validation ───────────────────────────────────────────────────

/// Run every check in order: corridor widths, corridor placement, entrance
/// clearance, travel distance, overlaps, containment, obstacles.
pub fn validate_all(
    geometry: &GeometryModel,
    ilots: &[Ilot],
    corridors: &[CorridorSegment],
    config: &LayoutConfig,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    violations.extend(check_corridor_widths(
        corridors,
        config.min_corridor_width,
        config.max_corridor_width,
    ));
    violations.extend(check_corridor_placement(geometry, corridors));
    violations.extend(check_entrance_clearance(geometry, ilots));
    violations.extend(check_travel_distance(geometry, ilots, config.max_travel_distance));
    violations.extend(check_ilot_overlaps(ilots));
    violations.extend(check_containment(geometry, ilots));
    violations.extend(check_obstacles(geometry, ilots));
    violations
}

pub fn count_by_severity(violations: &[Violation]) -> (usize, usize) {
    let errors = violations.iter().filter(|v| v.severity == Severity::Error).count();
    (errors, violations.len() - errors)
}
