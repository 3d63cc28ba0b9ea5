//! Engine tuning knobs
//!
//! Every constant the belief-update engine relies on lives here so the
//! server and CLI can load them from TOML without touching the algorithms.

use crate::{QuestionId, TriangleCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How a category's multiplier is softened before it is applied
///
/// Policies are looked up per category in [`EngineConfig::damping`]; a
/// category with no entry uses its multiplier unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DampingPolicy {
    /// Scale growth (`m > 1`) by `factor` while any other category is still active
    ContestedGrowth {
        /// Fraction of the growth that is kept
        factor: f64,
    },

    /// Scale growth (`m > 1`) by `factor` unconditionally
    Growth {
        /// Fraction of the growth that is kept
        factor: f64,
    },
}

impl DampingPolicy {
    /// Apply the policy to a raw multiplier
    ///
    /// `contested` is true when at least one other category is still active.
    pub fn apply(&self, multiplier: f64, contested: bool) -> f64 {
        let factor = match self {
            DampingPolicy::ContestedGrowth { factor } if contested => *factor,
            DampingPolicy::Growth { factor } => *factor,
            _ => return multiplier,
        };

        if multiplier > 1.0 {
            1.0 + (multiplier - 1.0) * factor
        } else {
            multiplier
        }
    }
}

/// Which previously asked questions are barred from selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExclusionPolicy {
    /// Never ask the same question twice in a session
    #[default]
    FullHistory,

    /// Only the most recent `size` questions are barred
    RecentWindow {
        /// Number of trailing questions to exclude
        size: usize,
    },
}

impl ExclusionPolicy {
    /// Questions excluded given the asked history (oldest first)
    pub fn excluded(&self, asked: &[QuestionId]) -> BTreeSet<QuestionId> {
        match self {
            ExclusionPolicy::FullHistory => asked.iter().copied().collect(),
            ExclusionPolicy::RecentWindow { size } => {
                let start = asked.len().saturating_sub(*size);
                asked[start..].iter().copied().collect()
            }
        }
    }
}

/// What to do when an answer has no multiplier rows at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMultiplierPolicy {
    /// Fail the turn with `MissingMultiplierData`
    #[default]
    Reject,

    /// Treat the answer as neutral and leave the weights untouched
    Ignore,
}

/// Coefficients of the combined theorem ranking score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Weight of the triangle affinity term
    pub affinity: f64,

    /// Weight of the per-(question, answer) empirical score
    pub question_answer: f64,

    /// Weight of the general helpfulness statistic
    pub general_helpfulness: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            affinity: 0.7,
            question_answer: 0.2,
            general_helpfulness: 0.1,
        }
    }
}

/// Configuration for the belief-update engine
///
/// # Examples
///
/// ```
/// use trigon_domain::{EngineConfig, ExclusionPolicy};
///
/// let config = EngineConfig::default();
/// assert_eq!(config.elimination_floor, 0.05);
/// assert_eq!(config.exclusion, ExclusionPolicy::FullHistory);
///
/// let legacy = EngineConfig::default().with_recent_window(10);
/// assert_eq!(legacy.exclusion, ExclusionPolicy::RecentWindow { size: 10 });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weights below this are eliminated and locked at 0
    pub elimination_floor: f64,

    /// Per-category multiplier damping
    pub damping: BTreeMap<TriangleCategory, DampingPolicy>,

    /// Connection strength at or above which a link is a precondition
    pub strong_connection_threshold: f64,

    /// Flat theorem weight used right after the first answer
    pub bootstrap_theorem_weight: f64,

    /// Difficulty of the questions eligible as the opening question
    pub bootstrap_difficulty: u8,

    /// Ranker threshold before any per-question increment
    pub base_threshold: f64,

    /// Ranker threshold growth per asked question
    pub threshold_increment: f64,

    /// Ranking score coefficients
    pub ranking: RankingWeights,

    /// Asked-question exclusion rule
    pub exclusion: ExclusionPolicy,

    /// Behaviour for answers without multiplier data
    pub missing_multipliers: MissingMultiplierPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            elimination_floor: 0.05,
            damping: BTreeMap::from([(
                TriangleCategory::General,
                DampingPolicy::ContestedGrowth { factor: 0.7 },
            )]),
            strong_connection_threshold: 0.9,
            bootstrap_theorem_weight: 0.01,
            bootstrap_difficulty: 1,
            base_threshold: 0.01,
            threshold_increment: 0.05,
            ranking: RankingWeights::default(),
            exclusion: ExclusionPolicy::FullHistory,
            missing_multipliers: MissingMultiplierPolicy::Reject,
        }
    }
}

impl EngineConfig {
    /// Exclude only the last `size` asked questions
    pub fn with_recent_window(mut self, size: usize) -> Self {
        self.exclusion = ExclusionPolicy::RecentWindow { size };
        self
    }

    /// Treat answers without multiplier data as neutral
    pub fn lenient_multipliers(mut self) -> Self {
        self.missing_multipliers = MissingMultiplierPolicy::Ignore;
        self
    }

    /// Ranker threshold after `asked_count` questions
    pub fn ranking_threshold(&self, asked_count: usize) -> f64 {
        self.base_threshold + asked_count as f64 * self.threshold_increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contested_growth_damping() {
        let policy = DampingPolicy::ContestedGrowth { factor: 0.7 };

        assert!((policy.apply(2.0, true) - 1.7).abs() < 1e-12);
        assert_eq!(policy.apply(2.0, false), 2.0);
        assert_eq!(policy.apply(0.5, true), 0.5);
    }

    #[test]
    fn test_growth_damping_ignores_contest() {
        let policy = DampingPolicy::Growth { factor: 0.5 };
        assert_eq!(policy.apply(3.0, false), 2.0);
    }

    #[test]
    fn test_exclusion_policies() {
        let asked: Vec<QuestionId> = (1..=12).map(QuestionId).collect();

        assert_eq!(ExclusionPolicy::FullHistory.excluded(&asked).len(), 12);

        let recent = ExclusionPolicy::RecentWindow { size: 10 }.excluded(&asked);
        assert_eq!(recent.len(), 10);
        assert!(!recent.contains(&QuestionId(1)));
        assert!(!recent.contains(&QuestionId(2)));
        assert!(recent.contains(&QuestionId(12)));

        let short = ExclusionPolicy::RecentWindow { size: 10 }.excluded(&asked[..3]);
        assert_eq!(short.len(), 3);
    }

    #[test]
    fn test_ranking_threshold() {
        let config = EngineConfig::default();
        assert!((config.ranking_threshold(3) - 0.16).abs() < 1e-12);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            elimination_floor = 0.1
            missing_multipliers = "ignore"

            [exclusion]
            mode = "recent_window"
            size = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.elimination_floor, 0.1);
        assert_eq!(config.missing_multipliers, MissingMultiplierPolicy::Ignore);
        assert_eq!(config.exclusion, ExclusionPolicy::RecentWindow { size: 5 });
        assert_eq!(config.strong_connection_threshold, 0.9);
        assert_eq!(
            config.damping.get(&TriangleCategory::General),
            Some(&DampingPolicy::ContestedGrowth { factor: 0.7 })
        );
    }

    #[test]
    fn test_damping_table_from_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "damping": { "right": { "kind": "growth", "factor": 0.5 } } }"#,
        )
        .unwrap();

        assert_eq!(config.damping.len(), 1);
        assert_eq!(
            config.damping.get(&TriangleCategory::Right),
            Some(&DampingPolicy::Growth { factor: 0.5 })
        );
    }
}
