//! Theorems, their links to triangle categories, and derived weights

use crate::{TheoremId, TriangleCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A geometry theorem that may help the learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theorem {
    /// Unique identifier
    pub id: TheoremId,

    /// Statement of the theorem
    pub text: String,

    /// Category the theorem is filed under, if any
    pub category: Option<TriangleCategory>,

    /// Inactive theorems are never ranked
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

impl Theorem {
    /// Create an active theorem
    pub fn new(id: TheoremId, text: impl Into<String>, category: Option<TriangleCategory>) -> Self {
        Self {
            id,
            text: text.into(),
            category,
            active: true,
        }
    }
}

/// How strongly a theorem depends on a triangle category, in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStrength {
    /// Theorem side of the link
    pub theorem_id: TheoremId,

    /// Category side of the link
    pub triangle: TriangleCategory,

    /// Link strength
    pub strength: f64,
}

impl ConnectionStrength {
    /// Create a new connection
    ///
    /// # Panics
    /// Panics if strength is outside [0, 1]
    pub fn new(theorem_id: TheoremId, triangle: TriangleCategory, strength: f64) -> Self {
        assert!((0.0..=1.0).contains(&strength), "Strength must be in [0, 1]");

        Self {
            theorem_id,
            triangle,
            strength,
        }
    }

    /// Whether the link counts as a near-necessary precondition
    pub fn is_strong(&self, threshold: f64) -> bool {
        self.strength >= threshold
    }
}

/// Per-theorem weights derived from the triangle belief vector
///
/// Recomputed wholesale each turn, never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TheoremWeights(BTreeMap<TheoremId, f64>);

impl TheoremWeights {
    /// Every theorem at the same weight
    pub fn flat<I>(theorems: I, weight: f64) -> Self
    where
        I: IntoIterator<Item = TheoremId>,
    {
        Self(theorems.into_iter().map(|id| (id, weight)).collect())
    }

    /// Weight of one theorem (0 when unknown)
    pub fn get(&self, theorem_id: TheoremId) -> f64 {
        self.0.get(&theorem_id).copied().unwrap_or(0.0)
    }

    /// Iterate `(theorem, weight)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (TheoremId, f64)> + '_ {
        self.0.iter().map(|(id, w)| (*id, *w))
    }

    /// Number of theorems tracked
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no theorems are tracked
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(TheoremId, f64)> for TheoremWeights {
    fn from_iter<T: IntoIterator<Item = (TheoremId, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
