//! Îlot catalog: the unit sizes a layout may use and their size categories.
//!
//! A catalog is an ordered list of `(width, height)` specs. Order matters:
//! the grid strategy cycles through specs in catalog order, and ties between
//! equally sized specs always resolve to the earlier one.
//!
//! ```
//! use ilotplan_logic::catalog::{Catalog, SizeCategory, CategoryThresholds};
//!
//! let catalog = Catalog::parse("2x2, 3x4, 6x6").unwrap();
//! let thresholds = CategoryThresholds::default();
//! assert_eq!(catalog.len(), 3);
//! assert_eq!(catalog.specs()[1].category(&thresholds), SizeCategory::Medium);
//! ```

use serde::{Deserialize, Serialize};

/// Size category derived from footprint area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeCategory {
    pub fn all() -> [SizeCategory; 4] {
        [
            SizeCategory::Small,
            SizeCategory::Medium,
            SizeCategory::Large,
            SizeCategory::ExtraLarge,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium",
            SizeCategory::Large => "large",
            SizeCategory::ExtraLarge => "extra_large",
        }
    }
}

/// Upper area bound (inclusive) of each category; anything above `large`
/// is extra-large.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryThresholds {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            small: 6.0,
            medium: 15.0,
            large: 30.0,
        }
    }
}

impl CategoryThresholds {
    pub fn categorize(&self, area: f64) -> SizeCategory {
        if area <= self.small {
            SizeCategory::Small
        } else if area <= self.medium {
            SizeCategory::Medium
        } else if area <= self.large {
            SizeCategory::Large
        } else {
            SizeCategory::ExtraLarge
        }
    }
}

/// One catalog entry: an unrotated îlot footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IlotSpec {
    pub width: f64,
    pub height: f64,
}

impl IlotSpec {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn category(&self, thresholds: &CategoryThresholds) -> SizeCategory {
        thresholds.categorize(self.area())
    }

    /// Footprint `(width, height)` after applying `rotation`.
    pub fn footprint(&self, rotation: Rotation) -> (f64, f64) {
        match rotation {
            Rotation::Deg0 => (self.width, self.height),
            Rotation::Deg90 => (self.height, self.width),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Îlots are axis-aligned; a quarter turn swaps width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
}

impl Rotation {
    pub fn both() -> [Rotation; 2] {
        [Rotation::Deg0, Rotation::Deg90]
    }

    pub fn flipped(&self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg0,
        }
    }
}

/// Error from [`Catalog::parse`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogParseError {
    #[error("catalog entry {0:?} is not of the form WxH")]
    BadEntry(String),
    #[error("catalog entry {0:?} has a non-positive dimension")]
    NonPositive(String),
}

/// Ordered set of îlot specs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    specs: Vec<IlotSpec>,
}

impl Catalog {
    pub fn new(specs: Vec<IlotSpec>) -> Self {
        Self { specs }
    }

    /// Parse the compact `"3x2,4x3,5x4"` form. Whitespace is ignored and
    /// `X`/`×` are accepted as separators.
    pub fn parse(text: &str) -> Result<Self, CatalogParseError> {
        let mut specs = Vec::new();
        for raw in text.split(',') {
            let entry = raw.trim();
            if entry.is_empty() {
                continue;
            }
            let normalized = entry.replace(['X', '×'], "x");
            let (w, h) = normalized
                .split_once('x')
                .ok_or_else(|| CatalogParseError::BadEntry(entry.to_string()))?;
            let width: f64 = w
                .trim()
                .parse()
                .map_err(|_| CatalogParseError::BadEntry(entry.to_string()))?;
            let height: f64 = h
                .trim()
                .parse()
                .map_err(|_| CatalogParseError::BadEntry(entry.to_string()))?;
            let spec = IlotSpec::new(width, height);
            if !spec.is_valid() {
                return Err(CatalogParseError::NonPositive(entry.to_string()));
            }
            specs.push(spec);
        }
        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[IlotSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl From<Vec<IlotSpec>> for Catalog {
    fn from(specs: Vec<IlotSpec>) -> Self {
        Self::new(specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_form() {
        let c = Catalog::parse("3x2, 4X3,5×4").unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(c.specs()[0], IlotSpec::new(3.0, 2.0));
        assert_eq!(c.specs()[2], IlotSpec::new(5.0, 4.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Catalog::parse("3x2,banana"),
            Err(CatalogParseError::BadEntry(_))
        ));
        assert!(matches!(
            Catalog::parse("0x2"),
            Err(CatalogParseError::NonPositive(_))
        ));
    }

    #[test]
    fn test_categories_follow_thresholds() {
        let t = CategoryThresholds::default();
        assert_eq!(IlotSpec::new(2.0, 3.0).category(&t), SizeCategory::Small);
        assert_eq!(IlotSpec::new(3.0, 4.0).category(&t), SizeCategory::Medium);
        assert_eq!(IlotSpec::new(5.0, 5.0).category(&t), SizeCategory::Large);
        assert_eq!(IlotSpec::new(6.0, 6.0).category(&t), SizeCategory::ExtraLarge);
    }

    #[test]
    fn test_rotation_swaps_footprint() {
        let s = IlotSpec::new(3.0, 2.0);
        assert_eq!(s.footprint(Rotation::Deg0), (3.0, 2.0));
        assert_eq!(s.footprint(Rotation::Deg90), (2.0, 3.0));
        assert_eq!(Rotation::Deg0.flipped(), Rotation::Deg90);
    }
}
