//! Layout request configuration.
//!
//! `LayoutConfig` is the whole configuration surface of a layout request:
//! catalog, coverage target, corridor width, strategy selector, seed and
//! deadline, plus the tunables of every stage. Every field has a default so
//! a caller can deserialize a partial JSON object.
//!
//! Raw values are kept as given; the accessor methods (`coverage_fraction`,
//! `corridor_width`, ...) apply the normalization rules, and
//! [`validate_config`] reports anything out of range.
//!
//! ```
//! use ilotplan_logic::config::{LayoutConfig, Strategy, validate_config};
//!
//! let config: LayoutConfig = serde_json::from_str(
//!     r#"{ "catalog": [{"width": 2.0, "height": 2.0}],
//!          "coverage_target": 25, "corridor_width": 5.0, "strategy": "force-directed" }"#,
//! ).unwrap();
//! assert_eq!(config.strategy, Strategy::ForceDirected);
//! assert!((config.coverage_fraction() - 0.25).abs() < 1e-12);
//! assert_eq!(config.corridor_width(), 3.0); // clamped
//! assert_eq!(validate_config(&config).len(), 1);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CategoryThresholds, IlotSpec};

/// Narrowest corridor the engine will lay out.
pub const MIN_CORRIDOR_WIDTH: f64 = 0.8;
/// Widest corridor the engine will lay out.
pub const MAX_CORRIDOR_WIDTH: f64 = 3.0;

/// Named coverage profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageProfile {
    Low,
    Medium,
    High,
    Maximum,
}

impl CoverageProfile {
    pub fn fraction(&self) -> f64 {
        match self {
            CoverageProfile::Low => 0.10,
            CoverageProfile::Medium => 0.25,
            CoverageProfile::High => 0.30,
            CoverageProfile::Maximum => 0.35,
        }
    }
}

/// Coverage target as given by the caller: a number or a profile name.
///
/// Numbers above 1 are percentages (`25` → 25 %), numbers up to 1 are
/// fractions (`0.25` → 25 %).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoverageTarget {
    Value(f64),
    Profile(CoverageProfile),
}

impl Default for CoverageTarget {
    fn default() -> Self {
        CoverageTarget::Profile(CoverageProfile::Medium)
    }
}

impl CoverageTarget {
    /// Raw fraction before clamping (percentages divided by 100).
    pub fn raw_fraction(&self) -> f64 {
        match *self {
            CoverageTarget::Value(v) if v > 1.0 => v / 100.0,
            CoverageTarget::Value(v) => v,
            CoverageTarget::Profile(p) => p.fraction(),
        }
    }

    /// Fraction in `[0, 1]`; non-finite input counts as 0.
    pub fn fraction(&self) -> f64 {
        let f = self.raw_fraction();
        if f.is_finite() {
            f.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Placement strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Grid,
    Genetic,
    ForceDirected,
    Accessibility,
}

impl Strategy {
    pub fn all() -> [Strategy; 4] {
        [
            Strategy::Grid,
            Strategy::Genetic,
            Strategy::ForceDirected,
            Strategy::Accessibility,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Grid => "grid",
            Strategy::Genetic => "genetic",
            Strategy::ForceDirected => "force-directed",
            Strategy::Accessibility => "accessibility",
        }
    }

    /// Strategies that iterate and honor the request deadline.
    pub fn is_iterative(&self) -> bool {
        matches!(self, Strategy::Genetic | Strategy::ForceDirected)
    }
}

/// Tunables of the genetic strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    pub population_size: usize,
    pub max_generations: u32,
    /// Stop once the best fitness has not improved for this many generations.
    pub plateau_window: u32,
    pub elite_fraction: f64,
    pub tournament_size: usize,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Maximum jitter applied to a gene's position.
    pub mutation_step: f64,
    /// Fitness penalty per constraint violation.
    pub violation_penalty: f64,
    /// Fitness bonus, scaled by the fraction of îlots touching a wall.
    pub wall_bonus: f64,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            plateau_window: 15,
            elite_fraction: 0.1,
            tournament_size: 3,
            mutation_rate: 0.1,
            mutation_step: 2.0,
            violation_penalty: 0.05,
            wall_bonus: 0.02,
        }
    }
}

/// Tunables of the force-directed strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceParams {
    pub max_iterations: u32,
    /// Integration step: displacement = step × force.
    pub step: f64,
    /// Cap on a single body's displacement per iteration.
    pub max_step: f64,
    pub wall_attraction: f64,
    pub unit_repulsion: f64,
    pub obstacle_repulsion: f64,
    pub energy_threshold: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            step: 0.1,
            max_step: 0.5,
            wall_attraction: 1.0,
            unit_repulsion: 1.0,
            obstacle_repulsion: 2.0,
            energy_threshold: 1e-3,
        }
    }
}

/// Full configuration of one layout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub catalog: Catalog,
    pub coverage_target: CoverageTarget,
    /// Requested corridor width; see [`LayoutConfig::corridor_width`].
    pub corridor_width: f64,
    pub strategy: Strategy,
    pub seed: u64,
    /// Deadline for iterative strategies, in milliseconds.
    #[serde(rename = "timeout")]
    pub timeout_ms: Option<u64>,

    /// Default clearance radius around entrances without their own.
    pub entrance_clearance: f64,
    /// Radius of the "near entrance" zone where îlots must not touch walls.
    pub near_entrance_distance: f64,
    /// An îlot closer than this to a wall counts as touching it.
    pub wall_contact_tolerance: f64,
    pub min_corridor_width: f64,
    pub max_corridor_width: f64,
    pub max_travel_distance: f64,
    /// Tolerance band for clustering îlot centers into rows.
    pub row_tolerance: f64,
    /// Corridors shorter than this after clipping are dropped.
    pub min_corridor_length: f64,
    /// Lattice spacing of the feasibility probe and the entrance distance field.
    pub field_resolution: f64,
    /// Target reduction per shortfall retry.
    pub shortfall_step: f64,
    /// Allowed gap between target and achieved coverage before retrying.
    pub shortfall_tolerance: f64,
    pub max_shortfall_retries: u32,
    pub categories: CategoryThresholds,
    pub genetic: GeneticParams,
    pub force: ForceParams,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            catalog: Catalog::new(vec![
                IlotSpec::new(2.0, 2.0),
                IlotSpec::new(3.0, 2.0),
                IlotSpec::new(4.0, 3.0),
            ]),
            coverage_target: CoverageTarget::default(),
            corridor_width: 1.2,
            strategy: Strategy::Grid,
            seed: 42,
            timeout_ms: None,
            entrance_clearance: 2.0,
            near_entrance_distance: 2.5,
            wall_contact_tolerance: 0.05,
            min_corridor_width: MIN_CORRIDOR_WIDTH,
            max_corridor_width: MAX_CORRIDOR_WIDTH,
            max_travel_distance: 30.0,
            row_tolerance: 1.0,
            min_corridor_length: 0.5,
            field_resolution: 0.5,
            shortfall_step: 0.05,
            shortfall_tolerance: 0.01,
            max_shortfall_retries: 6,
            categories: CategoryThresholds::default(),
            genetic: GeneticParams::default(),
            force: ForceParams::default(),
        }
    }
}

impl LayoutConfig {
    /// Coverage target as a fraction in `[0, 1]`.
    pub fn coverage_fraction(&self) -> f64 {
        self.coverage_target.fraction()
    }

    /// Corridor width clamped to `[0.8, 3.0]`.
    pub fn corridor_width(&self) -> f64 {
        if self.corridor_width.is_finite() {
            self.corridor_width
                .clamp(MIN_CORRIDOR_WIDTH, MAX_CORRIDOR_WIDTH)
        } else {
            MIN_CORRIDOR_WIDTH
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Lattice spacing, guarded against zero/negative input.
    pub fn field_resolution(&self) -> f64 {
        if self.field_resolution.is_finite() && self.field_resolution > 0.0 {
            self.field_resolution
        } else {
            0.5
        }
    }

    /// Shortfall decrement, guarded so retries always make progress.
    pub fn shortfall_step(&self) -> f64 {
        if self.shortfall_step.is_finite() && self.shortfall_step > 0.0 {
            self.shortfall_step
        } else {
            0.05
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Configuration problem. None of these abort a request; the pipeline logs
/// them and proceeds with the normalized values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("catalog is empty")]
    EmptyCatalog,
    #[error("catalog spec #{index} has invalid dimensions {width}x{height}")]
    InvalidSpec { index: usize, width: f64, height: f64 },
    #[error("coverage target {0} is outside 0..=100%")]
    CoverageOutOfRange(f64),
    #[error("corridor width {0} is outside [0.8, 3.0] and was clamped")]
    CorridorWidthClamped(f64),
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("genetic population must hold at least 2 candidates, got {0}")]
    PopulationTooSmall(usize),
}

/// Validate a layout configuration, returning all problems found.
pub fn validate_config(config: &LayoutConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.catalog.is_empty() {
        errors.push(ConfigError::EmptyCatalog);
    }
    for (index, spec) in config.catalog.specs().iter().enumerate() {
        if !spec.is_valid() {
            errors.push(ConfigError::InvalidSpec {
                index,
                width: spec.width,
                height: spec.height,
            });
        }
    }

    let raw = config.coverage_target.raw_fraction();
    if !raw.is_finite() || !(0.0..=1.0).contains(&raw) {
        errors.push(ConfigError::CoverageOutOfRange(raw));
    }

    if !(MIN_CORRIDOR_WIDTH..=MAX_CORRIDOR_WIDTH).contains(&config.corridor_width) {
        errors.push(ConfigError::CorridorWidthClamped(config.corridor_width));
    }

    let positives = [
        ("entrance_clearance", config.entrance_clearance),
        ("row_tolerance", config.row_tolerance),
        ("field_resolution", config.field_resolution),
        ("shortfall_step", config.shortfall_step),
        ("max_travel_distance", config.max_travel_distance),
    ];
    for (name, value) in positives {
        if !(value.is_finite() && value > 0.0) {
            errors.push(ConfigError::NonPositive { name, value });
        }
    }

    if config.genetic.population_size < 2 {
        errors.push(ConfigError::PopulationTooSmall(
            config.genetic.population_size,
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let errors = validate_config(&LayoutConfig::default());
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_coverage_percent_and_fraction() {
        assert!((CoverageTarget::Value(30.0).fraction() - 0.30).abs() < 1e-12);
        assert!((CoverageTarget::Value(0.35).fraction() - 0.35).abs() < 1e-12);
        assert_eq!(CoverageTarget::Value(0.0).fraction(), 0.0);
        assert_eq!(CoverageTarget::Value(250.0).fraction(), 1.0);
        assert!((CoverageTarget::Profile(CoverageProfile::Low).fraction() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_coverage_profile_from_json() {
        let c: LayoutConfig = serde_json::from_str(r#"{"coverage_target": "maximum"}"#).unwrap();
        assert!((c.coverage_fraction() - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_corridor_width_clamped() {
        let mut c = LayoutConfig::default();
        c.corridor_width = 0.3;
        assert_eq!(c.corridor_width(), MIN_CORRIDOR_WIDTH);
        c.corridor_width = 1.5;
        assert_eq!(c.corridor_width(), 1.5);
        assert!(validate_config(&c).is_empty());
    }

    #[test]
    fn test_empty_catalog_reported() {
        let mut c = LayoutConfig::default();
        c.catalog = Catalog::default();
        assert_eq!(validate_config(&c), vec![ConfigError::EmptyCatalog]);
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for s in Strategy::all() {
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(json, format!("\"{}\"", s.name()));
            let back: Strategy = serde_json::from_str(&json).unwrap();
            assert_eq!(back, s);
        }
    }

    #[test]
    fn test_timeout_deserializes_as_millis() {
        let c: LayoutConfig = serde_json::from_str(r#"{"timeout": 250}"#).unwrap();
        assert_eq!(c.timeout(), Some(Duration::from_millis(250)));
    }
}
