//! Trigon Domain Layer
//!
//! The belief-update engine behind Trigon's adaptive questioning. It keeps a
//! probability vector over four triangle categories, narrows it with every
//! answer, and uses it to pick the next question and rank geometry theorems.
//!
//! ## Key Concepts
//!
//! - **Triangle weights**: belief over general, equilateral, isosceles and right
//! - **Multipliers**: per (question, answer, category) evidence factors
//! - **Elimination floor**: categories under it are locked at 0
//! - **Information gain**: expected entropy reduction from a question
//! - **Theorem ranking**: triangle affinity blended with empirical statistics
//!
//! ## Architecture
//!
//! - Pure computation, no I/O
//! - Data arrives through the [`traits::KnowledgeBase`] contract
//! - [`SessionState`] is owned by the caller; the engine never locks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calibration;
pub mod config;
pub mod engine;
pub mod entropy;
pub mod error;
pub mod history;
pub mod ids;
pub mod memory;
pub mod multiplier;
pub mod question;
pub mod ranker;
pub mod selector;
pub mod session;
pub mod theorem;
pub mod theorem_model;
pub mod traits;
pub mod triangle;
pub mod weight_model;

// Re-exports for convenience
pub use calibration::CalibrationConfig;
pub use config::{DampingPolicy, EngineConfig, ExclusionPolicy, MissingMultiplierPolicy, RankingWeights};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use history::{Feedback, HistoryStatistics, SessionRecord, TheoremCount};
pub use ids::{AnswerId, QuestionId, TheoremId};
pub use memory::InMemoryKnowledgeBase;
pub use multiplier::AnswerMultiplier;
pub use question::{AnswerOption, Question};
pub use ranker::{RankedTheorem, TheoremRanker};
pub use selector::{QuestionSelector, ScoredQuestion};
pub use session::{Interaction, SessionState};
pub use theorem::{ConnectionStrength, Theorem, TheoremWeights};
pub use theorem_model::TheoremWeightModel;
pub use triangle::{TriangleCategory, TriangleMultipliers, TriangleWeights};
pub use weight_model::TriangleWeightModel;
