//! Offline recalibration
//!
//! Recomputes multiplier overrides, per-answer theorem scores and general
//! helpfulness from the saved sessions. Runs in a single transaction.

use crate::{triangle_from_sql, SqliteStore, StoreError};
use rusqlite::params;
use serde::Serialize;
use tracing::{debug, info};
use trigon_domain::calibration::{
    calibrated_multiplier, general_helpfulness, MultiplierTally, TheoremScoreTally,
};
use trigon_domain::{AnswerId, CalibrationConfig, QuestionId};

/// What a recalibration run changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CalibrationReport {
    /// Sessions read
    pub sessions: usize,

    /// Multiplier rows that received a new override
    pub multipliers_updated: usize,

    /// Rows written to the theorem score table
    pub theorem_scores: usize,

    /// Theorems with a general helpfulness value
    pub theorems_rated: usize,
}

impl SqliteStore {
    /// Recompute calibration data from saved sessions
    pub fn recalibrate(&mut self, config: &CalibrationConfig) -> Result<CalibrationReport, StoreError> {
        let records = self.all_sessions()?;
        let multiplier_tally = MultiplierTally::from_records(&records);
        let score_tally = TheoremScoreTally::from_records(&records);
        let helpfulness = general_helpfulness(&records);

        let mut report = CalibrationReport {
            sessions: records.len(),
            ..Default::default()
        };

        let tx = self.conn.transaction()?;

        let mut stmt = tx.prepare(
            "SELECT question_id, triangle_id, answer_id, baseline_multiplier FROM answer_multipliers",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    QuestionId(row.get(0)?),
                    triangle_from_sql(1, row.get(1)?)?,
                    AnswerId(row.get(2)?),
                    row.get::<_, f64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        for (question_id, triangle, answer_id, baseline) in rows {
            let counts = multiplier_tally.counts(question_id, answer_id, triangle);
            tx.execute(
                "UPDATE answer_multipliers
                 SET session_count_total = ?1, session_count_with_triangle = ?2
                 WHERE question_id = ?3 AND triangle_id = ?4 AND answer_id = ?5",
                params![
                    counts.total as i64,
                    counts.with_triangle as i64,
                    question_id.value(),
                    triangle.id(),
                    answer_id.value()
                ],
            )?;

            if let Some(value) = calibrated_multiplier(config, baseline, counts) {
                debug!(%question_id, %answer_id, %triangle, baseline, value, "Multiplier calibrated");
                tx.execute(
                    "UPDATE answer_multipliers SET override_multiplier = ?1
                     WHERE question_id = ?2 AND triangle_id = ?3 AND answer_id = ?4",
                    params![value, question_id.value(), triangle.id(), answer_id.value()],
                )?;
                report.multipliers_updated += 1;
            }
        }

        tx.execute("DELETE FROM theorem_scores", [])?;
        for (question_id, answer_id, theorem_id, total, helpful, score) in score_tally.scores() {
            tx.execute(
                "INSERT INTO theorem_scores
                 (question_id, answer_id, theorem_id, count_total, count_helpful, score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    question_id.value(),
                    answer_id.value(),
                    theorem_id.value(),
                    total as i64,
                    helpful as i64,
                    score
                ],
            )?;
            report.theorem_scores += 1;
        }

        tx.execute("DELETE FROM theorem_general_helpfulness", [])?;
        for (theorem_id, (count, value)) in &helpfulness {
            tx.execute(
                "INSERT INTO theorem_general_helpfulness
                 (theorem_id, helpful_session_count, general_helpfulness) VALUES (?1, ?2, ?3)",
                params![theorem_id.value(), *count as i64, value],
            )?;
            report.theorems_rated += 1;
        }

        tx.commit()?;
        info!(
            sessions = report.sessions,
            multipliers = report.multipliers_updated,
            theorem_scores = report.theorem_scores,
            "Recalibration complete"
        );
        Ok(report)
    }
}
