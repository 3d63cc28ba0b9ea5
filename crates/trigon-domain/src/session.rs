//! Per-session belief state

use crate::{AnswerId, QuestionId, TheoremWeights, TriangleWeights};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One answered question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Question answered
    pub question_id: QuestionId,

    /// Answer given
    pub answer_id: AnswerId,
}

/// Everything the engine knows about one learner session
///
/// Owned by the caller and passed into each engine operation. The engine
/// assumes exclusive access for the duration of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Questions served so far, oldest first
    pub asked_questions: Vec<QuestionId>,

    /// Current belief over triangle categories
    pub triangle_weights: TriangleWeights,

    /// Theorem weights derived from the triangle weights
    pub theorem_weights: TheoremWeights,

    /// Answers processed so far, oldest first
    pub interactions: Vec<Interaction>,

    /// Unix timestamp (seconds) of the last turn
    pub last_activity: u64,
}

impl SessionState {
    /// Fresh session with uniform triangle weights
    pub fn new(theorem_weights: TheoremWeights) -> Self {
        Self {
            asked_questions: Vec::new(),
            triangle_weights: TriangleWeights::uniform(),
            theorem_weights,
            interactions: Vec::new(),
            last_activity: unix_now(),
        }
    }

    /// Number of questions served
    pub fn asked_count(&self) -> usize {
        self.asked_questions.len()
    }

    /// Whether the question has been served in this session
    pub fn has_asked(&self, question_id: QuestionId) -> bool {
        self.asked_questions.contains(&question_id)
    }

    /// Most recently served question
    pub fn last_asked(&self) -> Option<QuestionId> {
        self.asked_questions.last().copied()
    }

    /// Record activity now
    pub fn touch(&mut self) {
        self.last_activity = unix_now();
    }

    /// Seconds since the last turn
    pub fn idle_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_activity)
    }
}

/// Current Unix time in seconds (0 if the clock is before the epoch)
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
