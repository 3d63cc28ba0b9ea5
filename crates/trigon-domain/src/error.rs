//! Errors returned by engine operations

use crate::{AnswerId, QuestionId};
use std::fmt::Display;
use thiserror::Error;

/// Errors that can occur during a turn
///
/// All of them are recoverable. A turn that fails leaves the session
/// exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// No active question of the opening difficulty exists
    #[error("No easy question available to open the session")]
    NoEasyQuestionAvailable,

    /// Every remaining candidate scored zero or is blocked by prerequisites
    #[error("No question available")]
    NoQuestionAvailable,

    /// The answer has no multiplier rows
    #[error("No multiplier data for question {question_id}, answer {answer_id}")]
    MissingMultiplierData {
        /// Question answered
        question_id: QuestionId,
        /// Answer given
        answer_id: AnswerId,
    },

    /// Every triangle weight collapsed to zero
    #[error("Triangle weights collapsed to zero")]
    DegenerateWeightState,

    /// The question does not exist in the knowledge base
    #[error("Unknown question: {0}")]
    UnknownQuestion(QuestionId),

    /// The knowledge base failed to answer a query
    #[error("Knowledge base error: {0}")]
    Source(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

pub(crate) fn source_error<E: Display>(err: E) -> EngineError {
    EngineError::Source(err.to_string())
}
