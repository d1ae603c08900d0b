//! Pure layout logic for ilotplan.
//!
//! This crate turns a classified floor plan (boundary, walls, restricted
//! zones, entrances) into an îlot layout: placed units, the corridors
//! between their rows, compliance findings and a score. Nothing here does
//! I/O; functions take plain data and return results, so the same code runs
//! under the simtest harness, in tests, or behind any service front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`primitives`] | Points, rectangles, polygons, segment math, scanline intervals |
//! | [`catalog`] | Îlot specs, size categories, `"3x2,4x3"` parsing |
//! | [`config`] | Layout request configuration, coverage normalization, validation |
//! | [`error`] | Fatal geometry errors and non-fatal diagnostics |
//! | [`geometry`] | Floor model: usable region, wall/entrance/obstacle queries |
//! | [`placement`] | Placement engine and the grid/genetic/force/accessibility strategies |
//! | [`corridors`] | Row detection and the MST corridor network |
//! | [`compliance`] | Corridor width, entrance clearance, travel distance checks |
//! | [`scoring`] | Coverage, category breakdown, accessibility and optimization score |
//! | [`pipeline`] | One request end to end, producing a [`pipeline::Layout`]; best-of-all-strategies |

pub mod catalog;
pub mod compliance;
pub mod config;
pub mod corridors;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod placement;
pub mod primitives;
pub mod scoring;

pub use config::{LayoutConfig, Strategy};
pub use error::{Diagnostic, GeometryError};
pub use geometry::ClassifiedGeometry;
pub use pipeline::{generate_best_layout, generate_layout, BestLayout, Layout};
