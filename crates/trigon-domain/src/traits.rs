//! Read contracts for the data the engine consumes
//!
//! The engine never writes through these traits. Implementations live in
//! `trigon-store` (SQLite) and [`crate::memory`] (tests and demos).

use crate::{AnswerId, AnswerMultiplier, ConnectionStrength, Question, QuestionId, Theorem, TheoremId};

/// Resolves answer multipliers with override-over-baseline precedence
pub trait MultiplierResolver {
    /// Error type for lookups
    type Error;

    /// Multiplier rows for one (question, answer) pair
    fn answer_multipliers(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Vec<AnswerMultiplier>, Self::Error>;

    /// Multiplier rows for every answer of a question
    fn question_multipliers(&self, question_id: QuestionId) -> Result<Vec<AnswerMultiplier>, Self::Error>;
}

/// Questions, theorems and their statistics
pub trait KnowledgeBase: MultiplierResolver {
    /// Look up a question by id
    fn question(&self, id: QuestionId) -> Result<Option<Question>, Self::Error>;

    /// All active questions with their prerequisites
    fn active_questions(&self) -> Result<Vec<Question>, Self::Error>;

    /// All active theorems
    fn active_theorems(&self) -> Result<Vec<Theorem>, Self::Error>;

    /// The theorem and triangle connection matrix
    fn connections(&self) -> Result<Vec<ConnectionStrength>, Self::Error>;

    /// Fraction of past sessions that found the theorem helpful
    fn general_helpfulness(&self, theorem_id: TheoremId) -> Result<Option<f64>, Self::Error>;

    /// Empirical helpfulness of a theorem after a specific answer
    fn question_answer_score(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
        theorem_id: TheoremId,
    ) -> Result<Option<f64>, Self::Error>;
}
