//! Answer multipliers (per question, answer and triangle category)

use crate::{AnswerId, QuestionId, TriangleCategory, TriangleMultipliers};
use serde::{Deserialize, Serialize};

/// How strongly one answer supports or refutes one triangle category
///
/// The baseline comes from the authored question data; the override, when
/// present, is produced by offline calibration against saved sessions and
/// takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerMultiplier {
    /// Question the answer belongs to
    pub question_id: QuestionId,

    /// Category affected
    pub triangle: TriangleCategory,

    /// Answer given
    pub answer_id: AnswerId,

    /// Authored multiplier
    pub baseline: f64,

    /// Calibrated multiplier, if any
    pub override_value: Option<f64>,
}

impl AnswerMultiplier {
    /// Create a multiplier with no override
    pub fn new(
        question_id: QuestionId,
        triangle: TriangleCategory,
        answer_id: AnswerId,
        baseline: f64,
    ) -> Self {
        Self {
            question_id,
            triangle,
            answer_id,
            baseline,
            override_value: None,
        }
    }

    /// Attach a calibrated override
    pub fn with_override(mut self, value: f64) -> Self {
        self.override_value = Some(value);
        self
    }

    /// Override if present, else baseline
    pub fn effective(&self) -> f64 {
        self.override_value.unwrap_or(self.baseline)
    }
}

/// Collapse multiplier rows for a single answer into a per-category vector
pub fn effective_multipliers(rows: &[AnswerMultiplier]) -> TriangleMultipliers {
    TriangleMultipliers::from_pairs(rows.iter().map(|m| (m.triangle, m.effective())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_takes_precedence() {
        let m = AnswerMultiplier::new(QuestionId(1), TriangleCategory::Right, AnswerId(1), 2.0);
        assert_eq!(m.effective(), 2.0);
        assert_eq!(m.with_override(1.6).effective(), 1.6);
    }

    #[test]
    fn test_effective_multipliers_fill_neutral() {
        let rows = vec![
            AnswerMultiplier::new(QuestionId(1), TriangleCategory::Equilateral, AnswerId(0), 0.1),
            AnswerMultiplier::new(QuestionId(1), TriangleCategory::Isosceles, AnswerId(0), 1.5)
                .with_override(1.2),
        ];
        let multipliers = effective_multipliers(&rows);

        assert_eq!(multipliers.get(TriangleCategory::Equilateral), 0.1);
        assert_eq!(multipliers.get(TriangleCategory::Isosceles), 1.2);
        assert_eq!(multipliers.get(TriangleCategory::General), 1.0);
    }
}
