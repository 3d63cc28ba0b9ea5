//! Engine facade
//!
//! Wires the models together into the three per-turn operations. Each
//! operation either commits all of its changes to the session or none.

use crate::error::source_error;
use crate::multiplier::effective_multipliers;
use crate::traits::KnowledgeBase;
use crate::{
    AnswerId, EngineConfig, EngineError, Interaction, MissingMultiplierPolicy, Question, QuestionId,
    QuestionSelector, RankedTheorem, Result, SessionState, TheoremRanker, TheoremWeightModel,
    TriangleMultipliers, TriangleWeightModel, TriangleWeights,
};
use rand::Rng;
use std::fmt::Display;
use tracing::{debug, info, warn};

/// The belief-update engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fresh session: uniform triangle weights, flat theorem weights
    pub fn start_session<K>(&self, kb: &K) -> Result<SessionState>
    where
        K: KnowledgeBase + ?Sized,
        K::Error: Display,
    {
        let theorems = kb.active_theorems().map_err(source_error)?;
        let theorem_weights = TheoremWeightModel::new(&self.config).bootstrap(&theorems);
        Ok(SessionState::new(theorem_weights))
    }

    /// Apply an answer to the session and return the new triangle weights
    ///
    /// Answering a question that was never served still records it as asked.
    ///
    /// # Errors
    /// - [`EngineError::UnknownQuestion`] if the question does not exist
    /// - [`EngineError::MissingMultiplierData`] if the answer has no
    ///   multiplier rows and the policy is `Reject`
    /// - [`EngineError::DegenerateWeightState`] if no category survives
    pub fn process_answer<K>(
        &self,
        state: &mut SessionState,
        kb: &K,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<TriangleWeights>
    where
        K: KnowledgeBase + ?Sized,
        K::Error: Display,
    {
        let rows = kb
            .answer_multipliers(question_id, answer_id)
            .map_err(source_error)?;

        let multipliers = if rows.is_empty() {
            if kb.question(question_id).map_err(source_error)?.is_none() {
                return Err(EngineError::UnknownQuestion(question_id));
            }
            match self.config.missing_multipliers {
                MissingMultiplierPolicy::Reject => {
                    return Err(EngineError::MissingMultiplierData {
                        question_id,
                        answer_id,
                    });
                }
                MissingMultiplierPolicy::Ignore => {
                    warn!(%question_id, %answer_id, "No multiplier data, answer treated as neutral");
                    TriangleMultipliers::neutral()
                }
            }
        } else {
            effective_multipliers(&rows)
        };

        let triangle_weights =
            TriangleWeightModel::new(&self.config).update(&state.triangle_weights, &multipliers)?;

        let theorems = kb.active_theorems().map_err(source_error)?;
        let connections = kb.connections().map_err(source_error)?;
        let asked_count = if state.has_asked(question_id) {
            state.asked_count()
        } else {
            state.asked_count() + 1
        };
        let theorem_weights = TheoremWeightModel::new(&self.config).derive(
            asked_count,
            &triangle_weights,
            &theorems,
            &connections,
        );

        if !state.has_asked(question_id) {
            state.asked_questions.push(question_id);
        }
        state.triangle_weights = triangle_weights;
        state.theorem_weights = theorem_weights;
        state.interactions.push(Interaction {
            question_id,
            answer_id,
        });
        state.touch();

        debug!(%question_id, %answer_id, weights = ?triangle_weights.as_array(), "Answer processed");
        Ok(triangle_weights)
    }

    /// Theorems ranked for the answer just given
    pub fn ranked_theorems<K>(
        &self,
        state: &SessionState,
        kb: &K,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Vec<RankedTheorem>>
    where
        K: KnowledgeBase + ?Sized,
        K::Error: Display,
    {
        let theorems = kb.active_theorems().map_err(source_error)?;
        let connections = kb.connections().map_err(source_error)?;

        TheoremRanker::new(&self.config).rank(
            state.asked_count(),
            &state.theorem_weights,
            &state.triangle_weights,
            question_id,
            answer_id,
            &theorems,
            &connections,
            kb,
        )
    }

    /// Choose the next question and record it as asked
    ///
    /// The opening question is drawn from `rng`; later questions are chosen
    /// deterministically.
    ///
    /// # Errors
    /// [`EngineError::NoEasyQuestionAvailable`] when opening, otherwise
    /// [`EngineError::NoQuestionAvailable`] once nothing useful is left.
    pub fn select_next_question<K, R>(&self, state: &mut SessionState, kb: &K, rng: &mut R) -> Result<Question>
    where
        K: KnowledgeBase + ?Sized,
        K::Error: Display,
        R: Rng + ?Sized,
    {
        let questions = kb.active_questions().map_err(source_error)?;
        let selector = QuestionSelector::new(&self.config);

        let question = if state.asked_questions.is_empty() {
            selector.bootstrap(&questions, rng)?
        } else {
            let scored = selector.select(&questions, &state.asked_questions, &state.triangle_weights, kb)?;
            info!(
                question_id = %scored.question.id,
                score = scored.score,
                "Selected next question"
            );
            scored.question
        };

        state.asked_questions.push(question.id);
        state.touch();
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKnowledgeBase;
    use crate::{AnswerMultiplier, Theorem, TheoremId, TriangleCategory::*};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn knowledge_base() -> InMemoryKnowledgeBase {
        InMemoryKnowledgeBase::new()
            .with_question(Question::new(QuestionId(1), "Are all three sides equal?", 1))
            .with_question(Question::new(QuestionId(2), "Is one angle 90 degrees?", 2))
            .with_question(Question::new(QuestionId(3), "Are two sides equal?", 2))
            .with_question(Question::new(QuestionId(4), "Is there any data on the sides?", 1))
            .with_multiplier(1, 1, Equilateral, 3.0)
            .with_multiplier(1, 1, Right, 0.1)
            .with_multiplier(1, 0, Equilateral, 0.1)
            .with_multiplier(2, 1, Right, 3.0)
            .with_multiplier(2, 0, Right, 0.1)
            .with_multiplier(3, 1, Isosceles, 2.0)
            .with_multiplier(3, 0, Isosceles, 0.5)
            .with_multiplier(3, 0, Equilateral, 0.1)
            .with_theorem(Theorem::new(TheoremId(1), "Pythagoras", Some(Right)))
            .with_theorem(Theorem::new(TheoremId(2), "All angles are 60 degrees", Some(Equilateral)))
            .with_theorem(Theorem::new(TheoremId(3), "Base angles are equal", Some(Isosceles)))
            .with_connection(1, Right, 1.0)
            .with_connection(2, Equilateral, 1.0)
            .with_connection(3, Isosceles, 0.95)
            .with_connection(3, Equilateral, 0.9)
    }

    #[test]
    fn test_start_session() {
        let engine = Engine::default();
        let state = engine.start_session(&knowledge_base()).unwrap();

        assert_eq!(state.triangle_weights, TriangleWeights::uniform());
        assert_eq!(state.theorem_weights.len(), 3);
        assert_eq!(state.theorem_weights.get(TheoremId(2)), 0.01);
    }

    #[test]
    fn test_full_turn() {
        let engine = Engine::default();
        let kb = knowledge_base();
        let mut state = engine.start_session(&kb).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let opening = engine.select_next_question(&mut state, &kb, &mut rng).unwrap();
        assert_eq!(opening.difficulty, 1);
        assert_eq!(state.asked_questions, vec![opening.id]);

        let weights = engine
            .process_answer(&mut state, &kb, QuestionId(1), AnswerId(0))
            .unwrap();
        assert_eq!(weights.get(Equilateral), 0.0);
        assert_eq!(state.interactions.len(), 1);

        let next = engine.select_next_question(&mut state, &kb, &mut rng).unwrap();
        assert_ne!(next.id, QuestionId(1));
        assert!(next.difficulty > 1);
        assert_eq!(state.last_asked(), Some(next.id));
    }

    #[test]
    fn test_first_answer_ranks_every_theorem_flat() {
        let engine = Engine::default();
        let kb = knowledge_base();
        let mut state = engine.start_session(&kb).unwrap();

        engine
            .process_answer(&mut state, &kb, QuestionId(2), AnswerId(1))
            .unwrap();
        let ranked = engine
            .ranked_theorems(&state, &kb, QuestionId(2), AnswerId(1))
            .unwrap();

        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|t| t.weight == 0.01));
        assert_eq!(ranked[0].theorem_id, TheoremId(1));
    }

    #[test]
    fn test_later_answers_derive_theorem_weights() {
        let engine = Engine::default();
        let kb = knowledge_base();
        let mut state = engine.start_session(&kb).unwrap();

        engine.process_answer(&mut state, &kb, QuestionId(1), AnswerId(0)).unwrap();
        engine.process_answer(&mut state, &kb, QuestionId(2), AnswerId(1)).unwrap();

        assert_eq!(state.asked_count(), 2);
        assert_eq!(state.theorem_weights.get(TheoremId(2)), 0.0);
        assert!(state.theorem_weights.get(TheoremId(1)) > 0.25);

        let ranked = engine
            .ranked_theorems(&state, &kb, QuestionId(2), AnswerId(1))
            .unwrap();
        assert_eq!(ranked[0].theorem_id, TheoremId(1));
        assert!(ranked.iter().all(|t| t.theorem_id != TheoremId(2)));
    }

    #[test]
    fn test_missing_multipliers_rejected_without_side_effects() {
        let engine = Engine::default();
        let kb = knowledge_base();
        let mut state = engine.start_session(&kb).unwrap();
        let before = state.clone();

        let result = engine.process_answer(&mut state, &kb, QuestionId(4), AnswerId(1));

        assert_eq!(
            result,
            Err(EngineError::MissingMultiplierData {
                question_id: QuestionId(4),
                answer_id: AnswerId(1)
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_missing_multipliers_ignored_when_lenient() {
        let engine = Engine::new(EngineConfig::default().lenient_multipliers());
        let kb = knowledge_base();
        let mut state = engine.start_session(&kb).unwrap();

        let weights = engine
            .process_answer(&mut state, &kb, QuestionId(4), AnswerId(1))
            .unwrap();

        assert_eq!(weights, TriangleWeights::uniform());
        assert_eq!(state.interactions.len(), 1);
    }

    #[test]
    fn test_unknown_question() {
        let engine = Engine::default();
        let kb = knowledge_base();
        let mut state = engine.start_session(&kb).unwrap();

        let result = engine.process_answer(&mut state, &kb, QuestionId(77), AnswerId(1));
        assert_eq!(result, Err(EngineError::UnknownQuestion(QuestionId(77))));
    }

    #[test]
    fn test_degenerate_update_leaves_state_untouched() {
        let engine = Engine::default();
        let kb = knowledge_base().with_multiplier_row(AnswerMultiplier::new(
            QuestionId(4),
            General,
            AnswerId(0),
            0.0,
        ));
        let mut state = engine.start_session(&kb).unwrap();
        state.triangle_weights = TriangleWeights::from_array([1.0, 0.0, 0.0, 0.0]);
        let before = state.clone();

        let result = engine.process_answer(&mut state, &kb, QuestionId(4), AnswerId(0));

        assert_eq!(result, Err(EngineError::DegenerateWeightState));
        assert_eq!(state, before);
    }

    #[test]
    fn test_selection_failure_leaves_history_untouched() {
        let engine = Engine::default();
        let kb = InMemoryKnowledgeBase::new().with_question(Question::new(QuestionId(1), "Hard", 3));
        let mut state = engine.start_session(&kb).unwrap();

        let result = engine.select_next_question(&mut state, &kb, &mut StdRng::seed_from_u64(0));

        assert_eq!(result, Err(EngineError::NoEasyQuestionAvailable));
        assert!(state.asked_questions.is_empty());
    }
}
