//! JSON seed import
//!
//! A seed document carries the authored knowledge base: questions with
//! their prerequisites, theorems, answer multipliers and the theorem and
//! triangle connection matrix. Importing is an upsert, so a seed can be
//! re-applied after edits without losing calibration results.

use crate::{SqliteStore, StoreError};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use trigon_domain::{AnswerMultiplier, AnswerOption, ConnectionStrength, Question, Theorem};

/// Authored knowledge base contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSeed {
    /// Answer options (the schema already provides no / yes / don't know / probably)
    pub answers: Vec<AnswerOption>,

    /// Questions
    pub questions: Vec<Question>,

    /// Theorems
    pub theorems: Vec<Theorem>,

    /// Answer multipliers
    pub multipliers: Vec<AnswerMultiplier>,

    /// Theorem and triangle connections
    pub connections: Vec<ConnectionStrength>,
}

impl KnowledgeSeed {
    /// Parse a seed document
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a seed file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Row counts written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Answer options written
    pub answers: usize,
    /// Questions written
    pub questions: usize,
    /// Prerequisite links written
    pub prerequisites: usize,
    /// Theorems written
    pub theorems: usize,
    /// Multiplier rows written
    pub multipliers: usize,
    /// Connections written
    pub connections: usize,
}

impl SqliteStore {
    /// Import a seed in one transaction
    ///
    /// Nothing is written if any row is rejected (bad difficulty, strength
    /// outside [0, 1], prerequisite on an unknown question, ...).
    pub fn import_seed(&mut self, seed: &KnowledgeSeed) -> Result<ImportSummary, StoreError> {
        let tx = self.conn.transaction()?;
        let mut summary = ImportSummary::default();

        for answer in &seed.answers {
            tx.execute(
                "INSERT INTO answer_options (answer_id, text) VALUES (?1, ?2)
                 ON CONFLICT(answer_id) DO UPDATE SET text = excluded.text",
                params![answer.id.value(), answer.text],
            )?;
            summary.answers += 1;
        }

        for question in &seed.questions {
            tx.execute(
                "INSERT INTO questions (question_id, text, difficulty, active) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(question_id) DO UPDATE SET
                 text = excluded.text, difficulty = excluded.difficulty, active = excluded.active",
                params![question.id.value(), question.text, question.difficulty, question.active],
            )?;
            summary.questions += 1;
        }

        for question in &seed.questions {
            tx.execute(
                "DELETE FROM question_prerequisites WHERE dependent_question_id = ?1",
                params![question.id.value()],
            )?;
            for prerequisite in &question.prerequisites {
                tx.execute(
                    "INSERT INTO question_prerequisites (prerequisite_question_id, dependent_question_id)
                     VALUES (?1, ?2)",
                    params![prerequisite.value(), question.id.value()],
                )?;
                summary.prerequisites += 1;
            }
        }

        for theorem in &seed.theorems {
            tx.execute(
                "INSERT INTO theorems (theorem_id, text, category, active) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(theorem_id) DO UPDATE SET
                 text = excluded.text, category = excluded.category, active = excluded.active",
                params![
                    theorem.id.value(),
                    theorem.text,
                    theorem.category.map(|c| c.id()),
                    theorem.active
                ],
            )?;
            summary.theorems += 1;
        }

        for row in &seed.multipliers {
            tx.execute(
                "INSERT INTO answer_multipliers
                 (question_id, triangle_id, answer_id, baseline_multiplier, override_multiplier)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(question_id, triangle_id, answer_id) DO UPDATE SET
                 baseline_multiplier = excluded.baseline_multiplier,
                 override_multiplier = COALESCE(excluded.override_multiplier, answer_multipliers.override_multiplier)",
                params![
                    row.question_id.value(),
                    row.triangle.id(),
                    row.answer_id.value(),
                    row.baseline,
                    row.override_value
                ],
            )?;
            summary.multipliers += 1;
        }

        for link in &seed.connections {
            tx.execute(
                "INSERT INTO theorem_triangle_matrix (theorem_id, triangle_id, connection_strength)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(theorem_id, triangle_id) DO UPDATE SET
                 connection_strength = excluded.connection_strength",
                params![link.theorem_id.value(), link.triangle.id(), link.strength],
            )?;
            summary.connections += 1;
        }

        tx.commit()?;
        info!(
            questions = summary.questions,
            theorems = summary.theorems,
            multipliers = summary.multipliers,
            connections = summary.connections,
            "Knowledge seed imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_defaults_missing_sections() {
        let seed = KnowledgeSeed::from_json(r#"{"questions": [{"id": 1, "text": "Q", "difficulty": 1}]}"#).unwrap();

        assert_eq!(seed.questions.len(), 1);
        assert!(seed.questions[0].active);
        assert!(seed.theorems.is_empty());
    }

    #[test]
    fn test_rejected_row_rolls_back_import() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let seed = KnowledgeSeed::from_json(
            r#"{"questions": [
                {"id": 1, "text": "Fine", "difficulty": 1},
                {"id": 2, "text": "Too hard", "difficulty": 9}
            ]}"#,
        )
        .unwrap();

        assert!(store.import_seed(&seed).is_err());
        assert!(store.all_questions().unwrap().is_empty());
    }
}
