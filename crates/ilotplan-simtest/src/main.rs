//! ilotplan Headless Layout Harness
//!
//! Runs the fixture scenarios in `data/scenarios.json` through every
//! placement strategy and checks the layout invariants on each result.
//! Runs entirely in-process: no files written, no rendering.
//!
//! Usage:
//!   cargo run -p ilotplan-simtest
//!   cargo run -p ilotplan-simtest -- --verbose

use ilotplan_logic::catalog::Catalog;
use ilotplan_logic::compliance::ViolationKind;
use ilotplan_logic::config::{validate_config, CoverageTarget, LayoutConfig, Strategy};
use ilotplan_logic::geometry::{ClassifiedGeometry, GeometryModel};
use ilotplan_logic::pipeline::{generate_layout, Layout};
use ilotplan_logic::Diagnostic;
use serde::Deserialize;

// ── Scenario fixtures ───────────────────────────────────────────────────
const SCENARIOS_JSON: &str = include_str!("../../../data/scenarios.json");

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    geometry: ClassifiedGeometry,
    #[serde(default)]
    config: LayoutConfig,
    #[serde(default)]
    expect: Expect,
}

/// Expected outcome of a scenario. Ranges are inclusive `[lo, hi]`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Expect {
    feasible: bool,
    usable_area: Option<[f64; 2]>,
    grid_ilot_area: Option<[f64; 2]>,
    grid_min_rows: Option<usize>,
    grid_corridors: Option<usize>,
    max_ilots: Option<usize>,
}

/// Îlot-level violation kinds that must never appear in an accepted layout.
const PLACEMENT_VIOLATIONS: [ViolationKind; 4] = [
    ViolationKind::IlotOverlap,
    ViolationKind::OutsideBoundary,
    ViolationKind::ObstacleIntersection,
    ViolationKind::EntranceObstructed,
];

const CORRIDOR_WIDTH_TOLERANCE: f64 = 1e-3;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    println!("=== ilotplan Layout Harness ===\n");

    let mut results = Vec::new();

    // 1. Fixture parse
    let scenarios = match load_scenarios() {
        Ok(s) => {
            results.push(TestResult {
                name: "scenarios_parse".into(),
                passed: !s.is_empty(),
                detail: format!("{} scenario(s) loaded", s.len()),
            });
            s
        }
        Err(e) => {
            results.push(TestResult {
                name: "scenarios_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            Vec::new()
        }
    };

    // 2. Configuration handling
    results.extend(validate_configuration(verbose));

    // 3. Every scenario through every strategy
    for scenario in &scenarios {
        results.extend(validate_scenario(scenario, verbose));
    }

    // 4. Determinism
    if let Some(first) = scenarios.first() {
        results.extend(validate_determinism(first, verbose));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_scenarios() -> Result<Vec<Scenario>, serde_json::Error> {
    serde_json::from_str(SCENARIOS_JSON)
}

fn in_range(value: f64, range: [f64; 2]) -> bool {
    value >= range[0] && value <= range[1]
}

// ── 2. Configuration ────────────────────────────────────────────────────

fn validate_configuration(verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let parsed = Catalog::parse("3x2, 4x3, 5x4");
    results.push(TestResult {
        name: "catalog_parse".into(),
        passed: parsed.as_ref().map(|c| c.len() == 3).unwrap_or(false),
        detail: format!("{:?}", parsed.map(|c| c.len())),
    });

    let percent = LayoutConfig {
        coverage_target: CoverageTarget::Value(30.0),
        ..LayoutConfig::default()
    };
    let fraction = percent.coverage_fraction();
    results.push(TestResult {
        name: "coverage_percent_normalized".into(),
        passed: (fraction - 0.30).abs() < 1e-12,
        detail: format!("30 → {:.3}", fraction),
    });

    let wide = LayoutConfig {
        corridor_width: 4.5,
        ..LayoutConfig::default()
    };
    let problems = validate_config(&wide);
    results.push(TestResult {
        name: "corridor_width_clamped".into(),
        passed: wide.corridor_width() == 3.0 && problems.len() == 1,
        detail: format!(
            "4.5 → {:.1}, {} problem(s) reported",
            wide.corridor_width(),
            problems.len()
        ),
    });

    let defaults_clean = validate_config(&LayoutConfig::default()).is_empty();
    results.push(TestResult {
        name: "default_config_valid".into(),
        passed: defaults_clean,
        detail: "default configuration passes validation".into(),
    });

    if verbose {
        println!("  configuration checks: {}", results.len());
    }
    results
}

// ── 3. Scenarios ────────────────────────────────────────────────────────

fn validate_scenario(scenario: &Scenario, verbose: bool) -> Vec<TestResult> {
    println!("--- Scenario: {} ---", scenario.name);
    let mut results = Vec::new();

    if let Some(range) = scenario.expect.usable_area {
        match GeometryModel::new(&scenario.geometry, &scenario.config) {
            Ok(model) => results.push(TestResult {
                name: format!("{}_usable_area", scenario.name),
                passed: in_range(model.usable_area(), range),
                detail: format!(
                    "{:.3} of {:.3} boundary (expected {:?})",
                    model.usable_area(),
                    model.boundary_area(),
                    range
                ),
            }),
            Err(e) => results.push(TestResult {
                name: format!("{}_usable_area", scenario.name),
                passed: false,
                detail: format!("geometry rejected: {}", e),
            }),
        }
    }

    for strategy in Strategy::all() {
        let config = scenario.config.clone().with_strategy(strategy);
        let tag = format!("{}_{}", scenario.name, strategy.name());
        let layout = match generate_layout(&scenario.geometry, &config) {
            Ok(l) => l,
            Err(e) => {
                results.push(TestResult {
                    name: format!("{}_runs", tag),
                    passed: false,
                    detail: format!("geometry error: {}", e),
                });
                continue;
            }
        };
        if verbose {
            println!(
                "  {}: {} îlot(s), coverage {:.3}, {} corridor(s), score {:.1}",
                tag,
                layout.ilots.len(),
                layout.metrics.coverage_achieved,
                layout.corridors.len(),
                layout.metrics.optimization_score
            );
        }
        results.extend(check_invariants(&tag, &layout));
        results.extend(check_expectations(&tag, strategy, &scenario.expect, &layout));
    }
    results
}

fn check_invariants(tag: &str, layout: &Layout) -> Vec<TestResult> {
    let mut results = Vec::new();

    let mut overlaps = 0;
    for (i, a) in layout.ilots.iter().enumerate() {
        for b in &layout.ilots[i + 1..] {
            if a.rect.overlaps(&b.rect) {
                overlaps += 1;
            }
        }
    }
    results.push(TestResult {
        name: format!("{}_no_overlap", tag),
        passed: overlaps == 0,
        detail: format!("{} overlapping pair(s) among {} îlots", overlaps, layout.ilots.len()),
    });

    let placement_violations: Vec<_> = layout
        .violations
        .iter()
        .filter(|v| PLACEMENT_VIOLATIONS.contains(&v.kind))
        .collect();
    results.push(TestResult {
        name: format!("{}_placement_valid", tag),
        passed: placement_violations.is_empty(),
        detail: if placement_violations.is_empty() {
            "no îlot or corridor off the floor or on a restricted zone, no îlot in an entrance disc".into()
        } else {
            placement_violations
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let bad_width = layout
        .corridors
        .iter()
        .filter(|c| {
            let (lo, hi) = layout.row_axis.across(&c.rect);
            ((hi - lo) - c.width).abs() > CORRIDOR_WIDTH_TOLERANCE
        })
        .count();
    let crossing = layout
        .corridors
        .iter()
        .filter(|c| layout.ilots.iter().any(|i| i.rect.overlaps(&c.rect)))
        .count();
    results.push(TestResult {
        name: format!("{}_corridors_clear", tag),
        passed: bad_width == 0 && crossing == 0,
        detail: format!(
            "{} corridor(s): {} off-width, {} crossing an îlot",
            layout.corridors.len(),
            bad_width,
            crossing
        ),
    });

    let area: f64 = layout.ilots.iter().map(|i| i.area()).sum();
    let expected = if layout.metrics.usable_area > 0.0 {
        area / layout.metrics.usable_area
    } else {
        0.0
    };
    results.push(TestResult {
        name: format!("{}_coverage_consistent", tag),
        passed: (expected - layout.metrics.coverage_achieved).abs() < 1e-9,
        detail: format!(
            "{:.2} m² / {:.2} m² = {:.4}",
            area, layout.metrics.usable_area, layout.metrics.coverage_achieved
        ),
    });
    results
}

fn check_expectations(tag: &str, strategy: Strategy, expect: &Expect, layout: &Layout) -> Vec<TestResult> {
    let mut results = Vec::new();

    results.push(TestResult {
        name: format!("{}_feasibility", tag),
        passed: layout.feasible == expect.feasible,
        detail: format!("feasible = {} (expected {})", layout.feasible, expect.feasible),
    });
    if !expect.feasible {
        let reported = layout
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::PlacementInfeasible { .. }));
        results.push(TestResult {
            name: format!("{}_infeasible_reported", tag),
            passed: reported && layout.ilots.is_empty(),
            detail: format!("{} îlot(s), diagnostic present: {}", layout.ilots.len(), reported),
        });
    }

    if let Some(max) = expect.max_ilots {
        results.push(TestResult {
            name: format!("{}_max_ilots", tag),
            passed: layout.ilots.len() <= max && (max > 0 || layout.corridors.is_empty()),
            detail: format!(
                "{} îlot(s), {} corridor(s) (max {})",
                layout.ilots.len(),
                layout.corridors.len(),
                max
            ),
        });
    }

    if strategy != Strategy::Grid {
        return results;
    }
    if let Some(range) = expect.grid_ilot_area {
        results.push(TestResult {
            name: format!("{}_ilot_area", tag),
            passed: in_range(layout.metrics.total_ilot_area, range),
            detail: format!("{:.2} m² (expected {:?})", layout.metrics.total_ilot_area, range),
        });
    }
    if let Some(min_rows) = expect.grid_min_rows {
        results.push(TestResult {
            name: format!("{}_rows", tag),
            passed: layout.rows.len() >= min_rows,
            detail: format!("{} row(s) (expected ≥ {})", layout.rows.len(), min_rows),
        });
    }
    if let Some(count) = expect.grid_corridors {
        results.push(TestResult {
            name: format!("{}_corridor_count", tag),
            passed: layout.corridors.len() == count,
            detail: format!(
                "{} corridor(s) (expected {}): {}",
                layout.corridors.len(),
                count,
                layout
                    .corridors
                    .iter()
                    .map(|c| c.label.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        });
    }
    results
}

// ── 4. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(scenario: &Scenario, verbose: bool) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    for strategy in Strategy::all() {
        let config = scenario.config.clone().with_strategy(strategy);
        let first = generate_layout(&scenario.geometry, &config);
        let second = generate_layout(&scenario.geometry, &config);
        let (passed, detail) = match (first, second) {
            (Ok(a), Ok(b)) => {
                let same = a.ilots == b.ilots;
                (
                    same,
                    format!(
                        "{} vs {} îlot(s), identical: {}",
                        a.ilots.len(),
                        b.ilots.len(),
                        same
                    ),
                )
            }
            (Err(e), _) | (_, Err(e)) => (false, format!("geometry error: {}", e)),
        };
        if verbose {
            println!("  {}: {}", strategy.name(), detail);
        }
        results.push(TestResult {
            name: format!("repeatable_{}", strategy.name()),
            passed,
            detail,
        });
    }
    results
}
