//! Question Selector
//!
//! Two phases. With nothing asked yet, the opening question is drawn at
//! random from the easy questions. Afterwards the selector greedily picks
//! the eligible question with the highest relevance times information gain.

use crate::entropy::{information_gain, relevance};
use crate::error::source_error;
use crate::traits::MultiplierResolver;
use crate::{EngineConfig, EngineError, Question, QuestionId, Result, TriangleWeights};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt::Display;
use tracing::debug;

/// A selected question together with the numbers that chose it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredQuestion {
    /// The question
    pub question: Question,

    /// Largest possible weight displacement
    pub relevance: f64,

    /// Expected entropy reduction
    pub information_gain: f64,

    /// `relevance * information_gain`
    pub score: f64,
}

/// Chooses the next question to ask
#[derive(Debug, Clone, Copy)]
pub struct QuestionSelector<'a> {
    config: &'a EngineConfig,
}

impl<'a> QuestionSelector<'a> {
    /// Create a selector bound to an engine configuration
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Pick the opening question uniformly among the easy ones
    ///
    /// # Errors
    /// [`EngineError::NoEasyQuestionAvailable`] when no active question has
    /// the opening difficulty.
    pub fn bootstrap<R: Rng + ?Sized>(&self, questions: &[Question], rng: &mut R) -> Result<Question> {
        let mut easy: Vec<&Question> = questions
            .iter()
            .filter(|q| q.active && q.difficulty == self.config.bootstrap_difficulty)
            .collect();
        easy.sort_by_key(|q| q.id);

        let chosen = easy
            .choose(rng)
            .ok_or(EngineError::NoEasyQuestionAvailable)?;
        debug!(question_id = %chosen.id, pool = easy.len(), "Opening question drawn");
        Ok((*chosen).clone())
    }

    /// Questions eligible after `asked`, in id order
    pub fn candidates<'q>(&self, questions: &'q [Question], asked: &[QuestionId]) -> Vec<&'q Question> {
        let excluded = self.config.exclusion.excluded(asked);
        let asked_set: BTreeSet<QuestionId> = asked.iter().copied().collect();

        let mut eligible: Vec<&Question> = questions
            .iter()
            .filter(|q| q.active && !excluded.contains(&q.id) && q.prerequisites_met(&asked_set))
            .collect();
        eligible.sort_by_key(|q| q.id);
        eligible
    }

    /// Greedy steady-state selection
    ///
    /// Ties go to the lowest question id.
    ///
    /// # Errors
    /// [`EngineError::NoQuestionAvailable`] when no eligible question has a
    /// positive score.
    pub fn select<M>(
        &self,
        questions: &[Question],
        asked: &[QuestionId],
        weights: &TriangleWeights,
        resolver: &M,
    ) -> Result<ScoredQuestion>
    where
        M: MultiplierResolver + ?Sized,
        M::Error: Display,
    {
        let floor = self.config.elimination_floor;
        let mut best: Option<ScoredQuestion> = None;

        for question in self.candidates(questions, asked) {
            let rows = resolver
                .question_multipliers(question.id)
                .map_err(source_error)?;
            let relevance = relevance(weights, floor, &rows);
            let information_gain = information_gain(weights, &rows);
            let score = relevance * information_gain;
            debug!(question_id = %question.id, relevance, information_gain, score, "Scored candidate");

            if !(score.is_finite() && score > 0.0) {
                continue;
            }
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(ScoredQuestion {
                    question: question.clone(),
                    relevance,
                    information_gain,
                    score,
                });
            }
        }

        best.ok_or(EngineError::NoQuestionAvailable)
    }
}
