//! Fatal and non-fatal conditions of a layout request.
//!
//! Only [`GeometryError`] aborts a request. Everything else is a
//! [`Diagnostic`] attached to the returned layout, so the caller always gets
//! a best-effort result plus a report to act on.

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, Strategy};

/// Malformed or degenerate boundary input. Raised while building the
/// geometry model, before placement starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("boundary has {0} distinct vertices, at least 3 are required")]
    TooFewVertices(usize),
    #[error("boundary vertex #{0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),
    #[error("scale factor {0} must be finite and positive")]
    InvalidScale(f64),
    #[error("boundary has zero area")]
    ZeroArea,
    #[error("boundary is not simple: edges #{0} and #{1} intersect")]
    SelfIntersecting(usize, usize),
}

/// A non-fatal condition reported alongside a layout.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("configuration problem: {message}")]
    InvalidConfig { message: String },

    #[error("no valid placement exists for the smallest catalog item ({reason})")]
    PlacementInfeasible { reason: String },

    #[error(
        "coverage target {requested:.3} not reached: achieved {achieved:.3} after {attempts} attempt(s)"
    )]
    CoverageShortfall {
        requested: f64,
        achieved: f64,
        attempts: u32,
    },

    #[error("{} row(s) left without a corridor connection: {rows:?}", .rows.len())]
    CorridorDisconnected { rows: Vec<usize> },

    #[error("{errors} compliance error(s) and {warnings} warning(s)")]
    ComplianceViolation { errors: usize, warnings: usize },

    #[error("{} stopped at its deadline after {completed} round(s); result is partial", .strategy.name())]
    Timeout { strategy: Strategy, completed: u32 },
}

impl Diagnostic {
    pub fn from_config_error(err: &ConfigError) -> Self {
        Diagnostic::InvalidConfig {
            message: err.to_string(),
        }
    }
}
