//! Finished-session records and the statistics derived from them

use crate::{Interaction, TheoremId, TriangleCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// End-of-exercise feedback from the learner
///
/// Codes match the stored feedback options table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Feedback {
    /// Did not manage to solve the exercise
    NotSolved,

    /// Solved the exercise
    Solved,

    /// Made progress and wants a new exercise
    NewExercise,

    /// Go back to the current exercise
    Resume,
}

impl Feedback {
    /// Every feedback kind in code order
    pub const ALL: [Feedback; 4] = [
        Feedback::NotSolved,
        Feedback::Solved,
        Feedback::NewExercise,
        Feedback::Resume,
    ];

    /// Stored numeric code
    pub fn code(&self) -> u8 {
        match self {
            Feedback::NotSolved => 4,
            Feedback::Solved => 5,
            Feedback::NewExercise => 6,
            Feedback::Resume => 7,
        }
    }

    /// Default display text
    pub fn description(&self) -> &'static str {
        match self {
            Feedback::NotSolved => "I did not manage to solve the exercise",
            Feedback::Solved => "I solved the exercise",
            Feedback::NewExercise => "I made progress, give me a new exercise",
            Feedback::Resume => "Take me back to the exercise",
        }
    }

    /// Whether the learner wants to keep going with the current question
    pub fn is_resume(&self) -> bool {
        matches!(self, Feedback::Resume)
    }
}

impl TryFrom<u8> for Feedback {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Feedback::ALL
            .into_iter()
            .find(|f| f.code() == code)
            .ok_or_else(|| format!("Invalid feedback code: {} (expected 4-7)", code))
    }
}

impl From<Feedback> for u8 {
    fn from(feedback: Feedback) -> Self {
        feedback.code()
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What is kept of a session once it ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier
    pub session_id: String,

    /// Answers in the order they were given
    #[serde(default)]
    pub interactions: Vec<Interaction>,

    /// Learner feedback, if given
    #[serde(default)]
    pub feedback: Option<Feedback>,

    /// Categories the learner reported as matching the exercise
    #[serde(default)]
    pub triangle_types: Vec<TriangleCategory>,

    /// Theorems the learner reported as helpful
    #[serde(default)]
    pub helpful_theorems: Vec<TheoremId>,
}

impl SessionRecord {
    /// Empty record for a session
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            interactions: Vec::new(),
            feedback: None,
            triangle_types: Vec::new(),
            helpful_theorems: Vec::new(),
        }
    }
}

/// Aggregate view over saved sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStatistics {
    /// Number of sessions
    pub total_sessions: usize,

    /// Session count per feedback code (every code present, possibly 0)
    pub feedback_distribution: BTreeMap<u8, usize>,

    /// Mean interactions per session
    pub average_interactions: f64,

    /// Up to ten most often helpful theorems with their counts
    pub most_helpful_theorems: Vec<TheoremCount>,
}

/// A theorem and how many sessions found it helpful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoremCount {
    /// Theorem identifier
    pub theorem_id: TheoremId,

    /// Number of sessions listing it
    pub count: usize,
}

impl HistoryStatistics {
    /// Compute statistics over a set of records
    pub fn from_records(records: &[SessionRecord]) -> Self {
        let mut feedback_distribution: BTreeMap<u8, usize> =
            Feedback::ALL.iter().map(|f| (f.code(), 0)).collect();
        let mut theorem_counts: HashMap<TheoremId, usize> = HashMap::new();
        let mut total_interactions = 0;

        for record in records {
            if let Some(feedback) = record.feedback {
                *feedback_distribution.entry(feedback.code()).or_default() += 1;
            }
            total_interactions += record.interactions.len();
            for theorem_id in &record.helpful_theorems {
                *theorem_counts.entry(*theorem_id).or_default() += 1;
            }
        }

        let mut most_helpful_theorems: Vec<TheoremCount> = theorem_counts
            .into_iter()
            .map(|(theorem_id, count)| TheoremCount { theorem_id, count })
            .collect();
        most_helpful_theorems.sort_by(|a, b| b.count.cmp(&a.count).then(a.theorem_id.cmp(&b.theorem_id)));
        most_helpful_theorems.truncate(10);

        let average_interactions = if records.is_empty() {
            0.0
        } else {
            total_interactions as f64 / records.len() as f64
        };

        Self {
            total_sessions: records.len(),
            feedback_distribution,
            average_interactions,
            most_helpful_theorems,
        }
    }
}
