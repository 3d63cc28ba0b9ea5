//! Entropy and information-gain evaluation
//!
//! Used by the question selector to estimate how much asking a question
//! would sharpen the triangle belief vector.

use crate::{AnswerId, AnswerMultiplier, TriangleMultipliers, TriangleWeights};
use std::collections::BTreeMap;

/// Shannon entropy in bits, summing only over positive weights
///
/// A one-hot vector has entropy 0; so does the all-zero vector.
pub fn entropy(weights: &TriangleWeights) -> f64 {
    weights
        .iter()
        .map(|(_, p)| p)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.log2())
        .sum()
}

/// Largest displacement any answer could cause to a still-plausible category
///
/// Only categories with weight strictly above `floor` are considered.
pub fn relevance(weights: &TriangleWeights, floor: f64, rows: &[AnswerMultiplier]) -> f64 {
    rows.iter()
        .filter_map(|row| {
            let w = weights.get(row.triangle);
            (w > floor).then(|| (w * row.effective() - w).abs())
        })
        .fold(0.0, f64::max)
}

/// Vector after applying one answer's multipliers, without elimination
pub fn simulate(weights: &TriangleWeights, multipliers: &TriangleMultipliers) -> Option<TriangleWeights> {
    let mut raw = weights.as_array();
    for (slot, (category, _)) in raw.iter_mut().zip(weights.iter()) {
        *slot *= multipliers.get(category);
    }
    TriangleWeights::from_array(raw).normalized()
}

/// Expected entropy reduction from asking a question
///
/// `rows` holds every multiplier row of the question. Each answer's
/// probability is estimated as the sum of weight times multiplier over the
/// categories that answer touches; answers with no positive probability
/// are skipped. Returns 0 when no answer is possible.
pub fn information_gain(weights: &TriangleWeights, rows: &[AnswerMultiplier]) -> f64 {
    let mut by_answer: BTreeMap<AnswerId, Vec<&AnswerMultiplier>> = BTreeMap::new();
    for row in rows {
        by_answer.entry(row.answer_id).or_default().push(row);
    }

    let mut expected = 0.0;
    let mut total_probability = 0.0;

    for answer_rows in by_answer.values() {
        let probability: f64 = answer_rows
            .iter()
            .map(|row| weights.get(row.triangle) * row.effective())
            .sum();
        if probability <= 0.0 {
            continue;
        }

        let multipliers =
            TriangleMultipliers::from_pairs(answer_rows.iter().map(|row| (row.triangle, row.effective())));
        let Some(simulated) = simulate(weights, &multipliers) else {
            continue;
        };

        expected += probability * entropy(&simulated);
        total_probability += probability;
    }

    if total_probability <= 0.0 {
        return 0.0;
    }

    entropy(weights) - expected / total_probability
}
