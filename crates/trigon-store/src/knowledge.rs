//! Knowledge-base reads backing the engine

use crate::{triangle_from_sql, SqliteStore, StoreError};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use trigon_domain::traits::{KnowledgeBase, MultiplierResolver};
use trigon_domain::{
    AnswerId, AnswerMultiplier, AnswerOption, ConnectionStrength, Feedback, Question, QuestionId, Theorem,
    TheoremId,
};

/// A feedback choice offered at the end of an exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackOption {
    /// Feedback code
    pub id: Feedback,

    /// Display text
    pub text: String,
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: QuestionId(row.get(0)?),
        text: row.get(1)?,
        difficulty: row.get(2)?,
        active: row.get(3)?,
        prerequisites: BTreeSet::new(),
    })
}

fn theorem_from_row(row: &Row<'_>) -> rusqlite::Result<Theorem> {
    let category: Option<i64> = row.get(2)?;
    Ok(Theorem {
        id: TheoremId(row.get(0)?),
        text: row.get(1)?,
        category: category.map(|raw| triangle_from_sql(2, raw)).transpose()?,
        active: row.get(3)?,
    })
}

impl SqliteStore {
    fn prerequisites(&self) -> Result<BTreeMap<QuestionId, BTreeSet<QuestionId>>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT dependent_question_id, prerequisite_question_id FROM question_prerequisites",
        )?;
        let pairs = stmt
            .query_map([], |row| Ok((QuestionId(row.get(0)?), QuestionId(row.get(1)?))))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut map: BTreeMap<QuestionId, BTreeSet<QuestionId>> = BTreeMap::new();
        for (dependent, prerequisite) in pairs {
            map.entry(dependent).or_default().insert(prerequisite);
        }
        Ok(map)
    }

    fn questions_where(&self, filter: &str) -> Result<Vec<Question>, StoreError> {
        let sql = format!(
            "SELECT question_id, text, difficulty, active FROM questions {} ORDER BY question_id",
            filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut questions = stmt
            .query_map([], question_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut prerequisites = self.prerequisites()?;
        for question in &mut questions {
            if let Some(set) = prerequisites.remove(&question.id) {
                question.prerequisites = set;
            }
        }
        Ok(questions)
    }

    /// Every question, active or not
    pub fn all_questions(&self) -> Result<Vec<Question>, StoreError> {
        self.questions_where("")
    }

    fn theorems_where(&self, filter: &str) -> Result<Vec<Theorem>, StoreError> {
        let sql = format!(
            "SELECT theorem_id, text, category, active FROM theorems {} ORDER BY theorem_id",
            filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let theorems = stmt
            .query_map([], theorem_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(theorems)
    }

    /// Every theorem, active or not
    pub fn all_theorems(&self) -> Result<Vec<Theorem>, StoreError> {
        self.theorems_where("")
    }

    /// Answer choices, shared by every question
    pub fn answer_options(&self) -> Result<Vec<AnswerOption>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT answer_id, text FROM answer_options ORDER BY answer_id")?;
        let options = stmt
            .query_map([], |row| {
                Ok(AnswerOption {
                    id: AnswerId(row.get(0)?),
                    text: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(options)
    }

    /// Feedback choices
    pub fn feedback_options(&self) -> Result<Vec<FeedbackOption>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT feedback_id, text FROM feedback_options ORDER BY feedback_id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, u8>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(code, text)| {
                Feedback::try_from(code)
                    .map(|id| FeedbackOption { id, text })
                    .map_err(StoreError::InvalidData)
            })
            .collect()
    }

    fn multipliers_where(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<AnswerMultiplier>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(AnswerMultiplier {
                    question_id: QuestionId(row.get(0)?),
                    triangle: triangle_from_sql(1, row.get(1)?)?,
                    answer_id: AnswerId(row.get(2)?),
                    baseline: row.get(3)?,
                    override_value: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every multiplier row
    pub fn all_multipliers(&self) -> Result<Vec<AnswerMultiplier>, StoreError> {
        self.multipliers_where(
            "SELECT question_id, triangle_id, answer_id, baseline_multiplier, override_multiplier
             FROM answer_multipliers ORDER BY question_id, answer_id, triangle_id",
            [],
        )
    }
}

impl MultiplierResolver for SqliteStore {
    type Error = StoreError;

    fn answer_multipliers(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Vec<AnswerMultiplier>, Self::Error> {
        self.multipliers_where(
            "SELECT question_id, triangle_id, answer_id, baseline_multiplier, override_multiplier
             FROM answer_multipliers WHERE question_id = ?1 AND answer_id = ?2
             ORDER BY triangle_id",
            params![question_id.value(), answer_id.value()],
        )
    }

    fn question_multipliers(&self, question_id: QuestionId) -> Result<Vec<AnswerMultiplier>, Self::Error> {
        self.multipliers_where(
            "SELECT question_id, triangle_id, answer_id, baseline_multiplier, override_multiplier
             FROM answer_multipliers WHERE question_id = ?1
             ORDER BY answer_id, triangle_id",
            params![question_id.value()],
        )
    }
}

impl KnowledgeBase for SqliteStore {
    fn question(&self, id: QuestionId) -> Result<Option<Question>, Self::Error> {
        let question = self
            .conn
            .query_row(
                "SELECT question_id, text, difficulty, active FROM questions WHERE question_id = ?1",
                params![id.value()],
                question_from_row,
            )
            .optional()?;

        let Some(mut question) = question else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT prerequisite_question_id FROM question_prerequisites WHERE dependent_question_id = ?1",
        )?;
        question.prerequisites = stmt
            .query_map(params![id.value()], |row| Ok(QuestionId(row.get(0)?)))?
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Some(question))
    }

    fn active_questions(&self) -> Result<Vec<Question>, Self::Error> {
        self.questions_where("WHERE active = 1")
    }

    fn active_theorems(&self) -> Result<Vec<Theorem>, Self::Error> {
        self.theorems_where("WHERE active = 1")
    }

    fn connections(&self) -> Result<Vec<ConnectionStrength>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT theorem_id, triangle_id, connection_strength FROM theorem_triangle_matrix
             ORDER BY theorem_id, triangle_id",
        )?;
        let connections = stmt
            .query_map([], |row| {
                Ok(ConnectionStrength {
                    theorem_id: TheoremId(row.get(0)?),
                    triangle: triangle_from_sql(1, row.get(1)?)?,
                    strength: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(connections)
    }

    fn general_helpfulness(&self, theorem_id: TheoremId) -> Result<Option<f64>, Self::Error> {
        let value: Option<Option<f64>> = self
            .conn
            .query_row(
                "SELECT general_helpfulness FROM theorem_general_helpfulness WHERE theorem_id = ?1",
                params![theorem_id.value()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    fn question_answer_score(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
        theorem_id: TheoremId,
    ) -> Result<Option<f64>, Self::Error> {
        let value: Option<Option<f64>> = self
            .conn
            .query_row(
                "SELECT score FROM theorem_scores
                 WHERE question_id = ?1 AND answer_id = ?2 AND theorem_id = ?3",
                params![question_id.value(), answer_id.value(), theorem_id.value()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.flatten())
    }
}
