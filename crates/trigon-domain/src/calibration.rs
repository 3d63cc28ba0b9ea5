//! Offline calibration from saved sessions
//!
//! Produces multiplier overrides and theorem statistics. Nothing here runs
//! during a turn; the store applies the results in a batch.

use crate::{AnswerId, QuestionId, SessionRecord, TheoremId, TriangleCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Calibration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Fraction of the gap to the target closed per calibration run
    pub learning_rate: f64,

    /// Stretch applied to the empirical rate before it becomes a target
    pub scale_factor: f64,

    /// Minimum number of sessions before a multiplier is touched
    pub min_sessions: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.25,
            scale_factor: 1.5,
            min_sessions: 10,
        }
    }
}

/// How often an answer was seen, and how often alongside a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounts {
    /// Occurrences of the (question, answer) pair
    pub total: usize,

    /// Occurrences where the session reported the category
    pub with_triangle: usize,
}

/// Answer occurrences in sessions that reported their triangle categories
#[derive(Debug, Clone, Default)]
pub struct MultiplierTally {
    by_answer: BTreeMap<(QuestionId, AnswerId), usize>,
    by_triangle: BTreeMap<(QuestionId, AnswerId, TriangleCategory), usize>,
}

impl MultiplierTally {
    /// Count every interaction of every session with reported categories
    pub fn from_records(records: &[SessionRecord]) -> Self {
        let mut tally = Self::default();

        for record in records.iter().filter(|r| !r.triangle_types.is_empty()) {
            let reported: BTreeSet<TriangleCategory> = record.triangle_types.iter().copied().collect();
            for interaction in &record.interactions {
                let key = (interaction.question_id, interaction.answer_id);
                *tally.by_answer.entry(key).or_default() += 1;
                for triangle in &reported {
                    *tally.by_triangle.entry((key.0, key.1, *triangle)).or_default() += 1;
                }
            }
        }

        tally
    }

    /// Counts for one multiplier row
    pub fn counts(&self, question_id: QuestionId, answer_id: AnswerId, triangle: TriangleCategory) -> SessionCounts {
        SessionCounts {
            total: self.by_answer.get(&(question_id, answer_id)).copied().unwrap_or(0),
            with_triangle: self
                .by_triangle
                .get(&(question_id, answer_id, triangle))
                .copied()
                .unwrap_or(0),
        }
    }
}

/// New override for a multiplier, or `None` if it should stay untouched
///
/// Neutral (1) and vetoing (0) baselines are never calibrated, nor are rows
/// with fewer than `min_sessions` observations. The override moves the
/// baseline part of the way toward a target derived from the empirical
/// co-occurrence rate, and never drops below the baseline when the rate is 1.
pub fn calibrated_multiplier(config: &CalibrationConfig, baseline: f64, counts: SessionCounts) -> Option<f64> {
    if counts.total == 0 || counts.total < config.min_sessions || baseline == 0.0 || baseline == 1.0 {
        return None;
    }

    let empirical = counts.with_triangle as f64 / counts.total as f64;
    let stretched = empirical * config.scale_factor;
    let target = if baseline > 1.0 {
        stretched.max(1.0)
    } else {
        stretched.min(1.0)
    };

    let updated = baseline + config.learning_rate * (target - baseline);
    if empirical == 1.0 && updated < baseline {
        return Some(baseline);
    }
    Some(updated)
}

/// Helpful counts per (question, answer) for the theorem score table
#[derive(Debug, Clone, Default)]
pub struct TheoremScoreTally {
    totals: BTreeMap<(QuestionId, AnswerId), usize>,
    helpful: BTreeMap<(QuestionId, AnswerId, TheoremId), usize>,
}

impl TheoremScoreTally {
    /// Count every interaction of every saved session
    pub fn from_records(records: &[SessionRecord]) -> Self {
        let mut tally = Self::default();

        for record in records {
            let helpful: BTreeSet<TheoremId> = record.helpful_theorems.iter().copied().collect();
            for interaction in &record.interactions {
                let (q, a) = (interaction.question_id, interaction.answer_id);
                *tally.totals.entry((q, a)).or_default() += 1;
                for theorem_id in &helpful {
                    *tally.helpful.entry((q, a, *theorem_id)).or_default() += 1;
                }
            }
        }

        tally
    }

    /// Interactions seen for a (question, answer) pair
    pub fn total(&self, question_id: QuestionId, answer_id: AnswerId) -> usize {
        self.totals.get(&(question_id, answer_id)).copied().unwrap_or(0)
    }

    /// `(question, answer, theorem, total, helpful, score)` for every theorem
    /// marked helpful at least once
    pub fn scores(&self) -> Vec<(QuestionId, AnswerId, TheoremId, usize, usize, f64)> {
        self.helpful
            .iter()
            .map(|(&(q, a, t), &helpful)| {
                let total = self.total(q, a);
                (q, a, t, total, helpful, helpful as f64 / total as f64)
            })
            .collect()
    }
}

/// Share of sessions listing each theorem as helpful, with the raw counts
pub fn general_helpfulness(records: &[SessionRecord]) -> BTreeMap<TheoremId, (usize, f64)> {
    let mut counts: BTreeMap<TheoremId, usize> = BTreeMap::new();
    for record in records {
        let listed: BTreeSet<TheoremId> = record.helpful_theorems.iter().copied().collect();
        for theorem_id in listed {
            *counts.entry(theorem_id).or_default() += 1;
        }
    }

    let sessions = records.len() as f64;
    counts
        .into_iter()
        .map(|(theorem_id, count)| (theorem_id, (count, count as f64 / sessions)))
        .collect()
}
