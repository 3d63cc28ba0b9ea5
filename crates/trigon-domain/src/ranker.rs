//! Theorem Ranker
//!
//! Orders candidate theorems by a weighted blend of triangle affinity, the
//! empirical score for the answer just given, and general helpfulness.

use crate::error::source_error;
use crate::traits::KnowledgeBase;
use crate::{
    AnswerId, ConnectionStrength, EngineConfig, QuestionId, Result, Theorem, TheoremId, TheoremWeights,
    TriangleCategory, TriangleWeights,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One entry of the ranked theorem list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTheorem {
    /// Theorem identifier
    pub theorem_id: TheoremId,

    /// Statement of the theorem
    pub text: String,

    /// Filing category, if any
    pub category: Option<TriangleCategory>,

    /// Derived theorem weight used for filtering
    pub weight: f64,

    /// Sum of connection strength times triangle weight
    pub triangle_affinity: f64,

    /// Empirical score after this (question, answer)
    pub question_answer_score: f64,

    /// Share of past sessions that found the theorem helpful
    pub general_helpfulness: f64,

    /// Final ranking score
    pub combined_score: f64,
}

/// Ranks theorems for the current belief state
#[derive(Debug, Clone, Copy)]
pub struct TheoremRanker<'a> {
    config: &'a EngineConfig,
}

impl<'a> TheoremRanker<'a> {
    /// Create a ranker bound to an engine configuration
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Sum of `strength * weight` over every connection of a theorem
    pub fn triangle_affinity(
        theorem_id: TheoremId,
        triangle_weights: &TriangleWeights,
        connections: &[ConnectionStrength],
    ) -> f64 {
        connections
            .iter()
            .filter(|c| c.theorem_id == theorem_id)
            .map(|c| c.strength * triangle_weights.get(c.triangle))
            .sum()
    }

    /// Theorems worth showing after `asked_count` questions, with their weight
    ///
    /// After the first question every active theorem is a candidate at the
    /// bootstrap weight. Later the derived weight must reach a threshold that
    /// grows with the session length.
    pub fn candidates<'t>(
        &self,
        asked_count: usize,
        theorems: &'t [Theorem],
        theorem_weights: &TheoremWeights,
    ) -> Vec<(&'t Theorem, f64)> {
        let active = theorems.iter().filter(|t| t.active);

        if asked_count == 1 {
            let flat = self.config.bootstrap_theorem_weight;
            return active.map(|t| (t, flat)).collect();
        }

        let threshold = self.config.ranking_threshold(asked_count);
        active
            .map(|t| (t, theorem_weights.get(t.id)))
            .filter(|(_, w)| *w >= threshold)
            .collect()
    }

    /// Produce the ranked theorem list for the answer just given
    ///
    /// Missing statistics count as 0. Sorted by combined score descending,
    /// then theorem id ascending.
    #[allow(clippy::too_many_arguments)]
    pub fn rank<K>(
        &self,
        asked_count: usize,
        theorem_weights: &TheoremWeights,
        triangle_weights: &TriangleWeights,
        question_id: QuestionId,
        answer_id: AnswerId,
        theorems: &[Theorem],
        connections: &[ConnectionStrength],
        kb: &K,
    ) -> Result<Vec<RankedTheorem>>
    where
        K: KnowledgeBase + ?Sized,
        K::Error: Display,
    {
        let coefficients = self.config.ranking;
        let mut ranked = Vec::new();

        for (theorem, weight) in self.candidates(asked_count, theorems, theorem_weights) {
            let triangle_affinity = Self::triangle_affinity(theorem.id, triangle_weights, connections);
            let question_answer_score = kb
                .question_answer_score(question_id, answer_id, theorem.id)
                .map_err(source_error)?
                .unwrap_or(0.0);
            let general_helpfulness = kb
                .general_helpfulness(theorem.id)
                .map_err(source_error)?
                .unwrap_or(0.0);

            let combined_score = coefficients.affinity * triangle_affinity
                + coefficients.question_answer * question_answer_score
                + coefficients.general_helpfulness * general_helpfulness;

            ranked.push(RankedTheorem {
                theorem_id: theorem.id,
                text: theorem.text.clone(),
                category: theorem.category,
                weight,
                triangle_affinity,
                question_answer_score,
                general_helpfulness,
                combined_score,
            });
        }

        ranked.sort_by(|a, b| {
            b.combined_score
                .total_cmp(&a.combined_score)
                .then(a.theorem_id.cmp(&b.theorem_id))
        });
        Ok(ranked)
    }
}
