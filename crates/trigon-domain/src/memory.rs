//! In-memory knowledge base
//!
//! Backs the engine in unit tests and lets callers run sessions without a
//! database.

use crate::traits::{KnowledgeBase, MultiplierResolver};
use crate::{
    AnswerId, AnswerMultiplier, ConnectionStrength, Question, QuestionId, Theorem, TheoremId,
    TriangleCategory,
};
use std::collections::BTreeMap;
use std::convert::Infallible;

/// Knowledge base held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeBase {
    questions: BTreeMap<QuestionId, Question>,
    theorems: BTreeMap<TheoremId, Theorem>,
    multipliers: Vec<AnswerMultiplier>,
    connections: Vec<ConnectionStrength>,
    general_helpfulness: BTreeMap<TheoremId, f64>,
    question_answer_scores: BTreeMap<(QuestionId, AnswerId, TheoremId), f64>,
}

impl InMemoryKnowledgeBase {
    /// Create an empty knowledge base
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a question
    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.insert(question.id, question);
        self
    }

    /// Add or replace a theorem
    pub fn with_theorem(mut self, theorem: Theorem) -> Self {
        self.theorems.insert(theorem.id, theorem);
        self
    }

    /// Add a baseline multiplier row
    pub fn with_multiplier(
        self,
        question_id: u32,
        answer_id: u32,
        triangle: TriangleCategory,
        baseline: f64,
    ) -> Self {
        self.with_multiplier_row(AnswerMultiplier::new(
            QuestionId(question_id),
            triangle,
            AnswerId(answer_id),
            baseline,
        ))
    }

    /// Add a fully specified multiplier row
    pub fn with_multiplier_row(mut self, row: AnswerMultiplier) -> Self {
        self.multipliers.push(row);
        self
    }

    /// Add a theorem and triangle connection
    pub fn with_connection(mut self, theorem_id: u32, triangle: TriangleCategory, strength: f64) -> Self {
        self.connections
            .push(ConnectionStrength::new(TheoremId(theorem_id), triangle, strength));
        self
    }

    /// Set a theorem's general helpfulness
    pub fn with_general_helpfulness(mut self, theorem_id: u32, value: f64) -> Self {
        self.general_helpfulness.insert(TheoremId(theorem_id), value);
        self
    }

    /// Set the empirical score of a theorem after an answer
    pub fn with_question_answer_score(
        mut self,
        question_id: u32,
        answer_id: u32,
        theorem_id: u32,
        value: f64,
    ) -> Self {
        self.question_answer_scores.insert(
            (QuestionId(question_id), AnswerId(answer_id), TheoremId(theorem_id)),
            value,
        );
        self
    }
}

impl MultiplierResolver for InMemoryKnowledgeBase {
    type Error = Infallible;

    fn answer_multipliers(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Vec<AnswerMultiplier>, Self::Error> {
        Ok(self
            .multipliers
            .iter()
            .filter(|m| m.question_id == question_id && m.answer_id == answer_id)
            .copied()
            .collect())
    }

    fn question_multipliers(&self, question_id: QuestionId) -> Result<Vec<AnswerMultiplier>, Self::Error> {
        Ok(self
            .multipliers
            .iter()
            .filter(|m| m.question_id == question_id)
            .copied()
            .collect())
    }
}

impl KnowledgeBase for InMemoryKnowledgeBase {
    fn question(&self, id: QuestionId) -> Result<Option<Question>, Self::Error> {
        Ok(self.questions.get(&id).cloned())
    }

    fn active_questions(&self) -> Result<Vec<Question>, Self::Error> {
        Ok(self.questions.values().filter(|q| q.active).cloned().collect())
    }

    fn active_theorems(&self) -> Result<Vec<Theorem>, Self::Error> {
        Ok(self.theorems.values().filter(|t| t.active).cloned().collect())
    }

    fn connections(&self) -> Result<Vec<ConnectionStrength>, Self::Error> {
        Ok(self.connections.clone())
    }

    fn general_helpfulness(&self, theorem_id: TheoremId) -> Result<Option<f64>, Self::Error> {
        Ok(self.general_helpfulness.get(&theorem_id).copied())
    }

    fn question_answer_score(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
        theorem_id: TheoremId,
    ) -> Result<Option<f64>, Self::Error> {
        Ok(self
            .question_answer_scores
            .get(&(question_id, answer_id, theorem_id))
            .copied())
    }
}
