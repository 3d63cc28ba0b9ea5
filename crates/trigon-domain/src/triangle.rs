//! Triangle categories and the belief vector over them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the four mutually exclusive triangle hypotheses
///
/// The numeric ids are part of the stored data and must not change:
/// - 0: General (catch-all, no special properties)
/// - 1: Equilateral
/// - 2: Isosceles
/// - 3: Right
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangleCategory {
    /// Catch-all hypothesis
    General,

    /// All three sides equal
    Equilateral,

    /// Two sides equal
    Isosceles,

    /// One right angle
    Right,
}

impl TriangleCategory {
    /// Number of categories
    pub const COUNT: usize = 4;

    /// All categories in id order
    pub const ALL: [TriangleCategory; Self::COUNT] = [
        TriangleCategory::General,
        TriangleCategory::Equilateral,
        TriangleCategory::Isosceles,
        TriangleCategory::Right,
    ];

    /// Stored numeric id
    pub fn id(&self) -> u8 {
        match self {
            TriangleCategory::General => 0,
            TriangleCategory::Equilateral => 1,
            TriangleCategory::Isosceles => 2,
            TriangleCategory::Right => 3,
        }
    }

    /// Look up a category by its stored numeric id
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    fn index(&self) -> usize {
        self.id() as usize
    }

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TriangleCategory::General => "general",
            TriangleCategory::Equilateral => "equilateral",
            TriangleCategory::Isosceles => "isosceles",
            TriangleCategory::Right => "right",
        }
    }

    /// Parse a category from its name or numeric id
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return Self::from_id(id);
        }
        match s.to_lowercase().as_str() {
            "general" => Some(TriangleCategory::General),
            "equilateral" => Some(TriangleCategory::Equilateral),
            "isosceles" => Some(TriangleCategory::Isosceles),
            "right" => Some(TriangleCategory::Right),
            _ => None,
        }
    }
}

impl std::str::FromStr for TriangleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid triangle category: {}", s))
    }
}

impl fmt::Display for TriangleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Belief distribution over the triangle categories
///
/// After every successful update the weights sum to 1 and each weight is
/// either exactly 0 (eliminated) or at least the elimination floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleWeights([f64; TriangleCategory::COUNT]);

impl TriangleWeights {
    /// Uniform distribution (0.25 per category)
    pub fn uniform() -> Self {
        Self([1.0 / TriangleCategory::COUNT as f64; TriangleCategory::COUNT])
    }

    /// All-zero vector, used as a scratch buffer during updates
    pub(crate) fn zeroed() -> Self {
        Self([0.0; TriangleCategory::COUNT])
    }

    /// Build a vector from raw weights in id order
    ///
    /// No normalization is applied.
    pub fn from_array(weights: [f64; TriangleCategory::COUNT]) -> Self {
        Self(weights)
    }

    /// Raw weights in id order
    pub fn as_array(&self) -> [f64; TriangleCategory::COUNT] {
        self.0
    }

    /// Weight of a single category
    pub fn get(&self, category: TriangleCategory) -> f64 {
        self.0[category.index()]
    }

    pub(crate) fn set(&mut self, category: TriangleCategory, weight: f64) {
        self.0[category.index()] = weight;
    }

    /// Sum of all weights
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Iterate `(category, weight)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (TriangleCategory, f64)> + '_ {
        TriangleCategory::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Categories whose weight is at least `floor`
    pub fn at_least(&self, floor: f64) -> Vec<TriangleCategory> {
        self.iter()
            .filter(|(_, w)| *w >= floor)
            .map(|(c, _)| c)
            .collect()
    }

    /// Categories whose weight is strictly above `floor`
    pub fn above(&self, floor: f64) -> Vec<TriangleCategory> {
        self.iter()
            .filter(|(_, w)| *w > floor)
            .map(|(c, _)| c)
            .collect()
    }

    /// Scale so the weights sum to 1
    ///
    /// Returns `None` when the total is not strictly positive.
    pub fn normalized(&self) -> Option<Self> {
        let total = self.total();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }
        let mut out = *self;
        for w in out.0.iter_mut() {
            *w /= total;
        }
        Some(out)
    }

    /// Name-keyed view for display and JSON output
    pub fn to_map(&self) -> BTreeMap<TriangleCategory, f64> {
        self.iter().collect()
    }
}

impl Default for TriangleWeights {
    fn default() -> Self {
        Self::uniform()
    }
}

/// Effective multiplier per category for one answer
///
/// Categories not covered by the answer keep the neutral multiplier 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleMultipliers([f64; TriangleCategory::COUNT]);

impl TriangleMultipliers {
    /// Neutral multipliers (1.0 everywhere)
    pub fn neutral() -> Self {
        Self([1.0; TriangleCategory::COUNT])
    }

    /// Build from `(category, multiplier)` pairs; missing categories stay 1.0
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (TriangleCategory, f64)>,
    {
        let mut out = Self::neutral();
        for (category, multiplier) in pairs {
            out.set(category, multiplier);
        }
        out
    }

    /// Multiplier for one category
    pub fn get(&self, category: TriangleCategory) -> f64 {
        self.0[category.index()]
    }

    /// Override the multiplier for one category
    pub fn set(&mut self, category: TriangleCategory, multiplier: f64) {
        self.0[category.index()] = multiplier;
    }
}

impl Default for TriangleMultipliers {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ids_roundtrip() {
        for category in TriangleCategory::ALL {
            assert_eq!(TriangleCategory::from_id(category.id()), Some(category));
        }
        assert_eq!(TriangleCategory::from_id(4), None);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(TriangleCategory::parse("Right"), Some(TriangleCategory::Right));
        assert_eq!(TriangleCategory::parse("2"), Some(TriangleCategory::Isosceles));
        assert_eq!(TriangleCategory::parse("scalene"), None);
        assert!("obtuse".parse::<TriangleCategory>().is_err());
    }

    #[test]
    fn test_uniform_weights() {
        let weights = TriangleWeights::uniform();
        assert_eq!(weights.get(TriangleCategory::Equilateral), 0.25);
        assert!((weights.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_rejects_zero_total() {
        assert!(TriangleWeights::zeroed().normalized().is_none());

        let weights = TriangleWeights::from_array([1.0, 1.0, 2.0, 0.0]).normalized().unwrap();
        assert_eq!(weights.get(TriangleCategory::Isosceles), 0.5);
        assert_eq!(weights.get(TriangleCategory::Right), 0.0);
    }

    #[test]
    fn test_at_least_and_above() {
        let weights = TriangleWeights::from_array([0.05, 0.5, 0.45, 0.0]);
        assert_eq!(weights.at_least(0.05).len(), 3);
        assert_eq!(
            weights.above(0.05),
            vec![TriangleCategory::Equilateral, TriangleCategory::Isosceles]
        );
    }

    #[test]
    fn test_multipliers_default_to_neutral() {
        let multipliers = TriangleMultipliers::from_pairs([(TriangleCategory::Right, 3.0)]);
        assert_eq!(multipliers.get(TriangleCategory::Right), 3.0);
        assert_eq!(multipliers.get(TriangleCategory::General), 1.0);
    }

    #[test]
    fn test_weights_map_serializes_by_name() {
        let json = serde_json::to_string(&TriangleWeights::uniform().to_map()).unwrap();
        assert!(json.contains("\"equilateral\":0.25"));
    }
}
