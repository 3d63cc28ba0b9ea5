//! Questions and answer options

use crate::{AnswerId, QuestionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A diagnostic question put to the learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier
    pub id: QuestionId,

    /// Text shown to the learner
    pub text: String,

    /// Difficulty level (1 = easy, 3 = hard)
    pub difficulty: u8,

    /// Inactive questions are never selected
    #[serde(default = "active_by_default")]
    pub active: bool,

    /// Questions that must already have been asked before this one is eligible
    #[serde(default)]
    pub prerequisites: BTreeSet<QuestionId>,
}

fn active_by_default() -> bool {
    true
}

impl Question {
    /// Create an active question with no prerequisites
    pub fn new(id: QuestionId, text: impl Into<String>, difficulty: u8) -> Self {
        Self {
            id,
            text: text.into(),
            difficulty,
            active: true,
            prerequisites: BTreeSet::new(),
        }
    }

    /// Add a prerequisite question
    pub fn with_prerequisite(mut self, prerequisite: QuestionId) -> Self {
        self.prerequisites.insert(prerequisite);
        self
    }

    /// Mark the question inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether every prerequisite appears in `asked`
    pub fn prerequisites_met(&self, asked: &BTreeSet<QuestionId>) -> bool {
        self.prerequisites.is_subset(asked)
    }
}

/// A selectable answer (the same options apply to every question)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Answer identifier
    pub id: AnswerId,

    /// Display text
    pub text: String,
}
