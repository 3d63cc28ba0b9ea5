//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use trigon_domain::{
    AnswerOption, HistoryStatistics, Question, RankedTheorem, SessionRecord, TriangleWeights,
};
use trigon_store::{CalibrationReport, ImportSummary};

/// How results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

#[derive(Clone, Copy)]
enum Tone {
    Good,
    Bad,
    Note,
    Caution,
    Heading,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    fn table(&self, header: &[&str], rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(header.iter().map(|h| h.to_string()));
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Triangle weights, one row per category
    pub fn format_weights(&self, weights: &TriangleWeights) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(&weights.to_map());
        }

        let rows = weights
            .iter()
            .map(|(category, weight)| {
                let bar = "#".repeat((weight * 20.0).round() as usize);
                vec![category.to_string(), format!("{:.3}", weight), bar]
            })
            .collect();
        Ok(self.table(&["Triangle", "Weight", ""], rows))
    }

    /// Ranked theorems, best first
    pub fn format_theorems(&self, theorems: &[RankedTheorem]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(theorems);
        }
        if theorems.is_empty() {
            return Ok(self.colorize("No relevant theorems yet.", Tone::Caution));
        }

        let rows = theorems
            .iter()
            .map(|t| {
                vec![
                    t.theorem_id.to_string(),
                    t.text.clone(),
                    t.category.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                    format!("{:.3}", t.combined_score),
                ]
            })
            .collect();
        Ok(self.table(&["ID", "Theorem", "Triangle", "Score"], rows))
    }

    /// A question and its answer choices
    pub fn format_question(&self, question: &Question, answers: &[AnswerOption]) -> String {
        let mut out = self.colorize(&format!("Q{}: {}", question.id, question.text), Tone::Heading);
        for answer in answers {
            out.push_str(&format!("\n  [{}] {}", answer.id, answer.text));
        }
        out
    }

    /// Saved sessions
    pub fn format_sessions(&self, sessions: &[SessionRecord]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(sessions);
        }
        if sessions.is_empty() {
            return Ok(self.colorize("No sessions found.", Tone::Caution));
        }

        let rows = sessions
            .iter()
            .map(|s| {
                let triangles: Vec<String> = s.triangle_types.iter().map(|c| c.to_string()).collect();
                let theorems: Vec<String> = s.helpful_theorems.iter().map(|t| t.to_string()).collect();
                vec![
                    s.session_id.clone(),
                    s.interactions.len().to_string(),
                    s.feedback.map(|f| f.to_string()).unwrap_or_else(|| "-".to_string()),
                    triangles.join(", "),
                    theorems.join(", "),
                ]
            })
            .collect();
        Ok(self.table(
            &["Session", "Answers", "Feedback", "Triangles", "Helpful theorems"],
            rows,
        ))
    }

    /// Aggregates over saved sessions
    pub fn format_statistics(&self, stats: &HistoryStatistics) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(stats);
        }

        let mut rows = vec![
            vec!["Sessions".to_string(), stats.total_sessions.to_string()],
            vec![
                "Average answers".to_string(),
                format!("{:.2}", stats.average_interactions),
            ],
        ];
        for (code, count) in &stats.feedback_distribution {
            rows.push(vec![format!("Feedback {}", code), count.to_string()]);
        }
        for entry in &stats.most_helpful_theorems {
            rows.push(vec![
                format!("Theorem {}", entry.theorem_id),
                format!("helpful in {} sessions", entry.count),
            ]);
        }
        Ok(self.table(&["Statistic", "Value"], rows))
    }

    /// Import counts
    pub fn format_import(&self, summary: &ImportSummary) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(summary);
        }

        let rows = vec![
            vec!["Answers".to_string(), summary.answers.to_string()],
            vec!["Questions".to_string(), summary.questions.to_string()],
            vec!["Prerequisites".to_string(), summary.prerequisites.to_string()],
            vec!["Theorems".to_string(), summary.theorems.to_string()],
            vec!["Multipliers".to_string(), summary.multipliers.to_string()],
            vec!["Connections".to_string(), summary.connections.to_string()],
        ];
        Ok(self.table(&["Imported", "Rows"], rows))
    }

    /// Calibration counts
    pub fn format_calibration(&self, report: &CalibrationReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(report);
        }

        let rows = vec![
            vec!["Sessions read".to_string(), report.sessions.to_string()],
            vec![
                "Multipliers updated".to_string(),
                report.multipliers_updated.to_string(),
            ],
            vec!["Theorem scores".to_string(), report.theorem_scores.to_string()],
            vec!["Theorems rated".to_string(), report.theorems_rated.to_string()],
        ];
        Ok(self.table(&["Calibration", "Count"], rows))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), Tone::Good)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), Tone::Bad)
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), Tone::Note)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), Tone::Caution)
    }

    fn colorize(&self, text: &str, tone: Tone) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match tone {
            Tone::Good => text.green().to_string(),
            Tone::Bad => text.red().to_string(),
            Tone::Note => text.blue().to_string(),
            Tone::Caution => text.yellow().to_string(),
            Tone::Heading => text.cyan().bold().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trigon_domain::{AnswerId, Feedback, Interaction, QuestionId, TheoremId, TriangleCategory};

    fn record() -> SessionRecord {
        let mut record = SessionRecord::new("s-1");
        record.interactions.push(Interaction {
            question_id: QuestionId(3),
            answer_id: AnswerId(1),
        });
        record.feedback = Some(Feedback::Solved);
        record.triangle_types = vec![TriangleCategory::Right];
        record.helpful_theorems = vec![TheoremId(1)];
        record
    }

    #[test]
    fn test_weights_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_weights(&TriangleWeights::uniform()).unwrap();
        assert!(output.contains("equilateral"));
        assert!(output.contains("0.250"));
    }

    #[test]
    fn test_weights_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_weights(&TriangleWeights::uniform()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["right"], 0.25);
    }

    #[test]
    fn test_sessions_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_sessions(&[record()]).unwrap();
        assert!(output.contains("s-1"));
        assert!(output.contains("right"));
        assert!(output.contains("Helpful theorems"));
    }

    #[test]
    fn test_empty_sessions() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_sessions(&[]).unwrap();
        assert!(output.contains("No sessions found"));
    }

    #[test]
    fn test_statistics_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let stats = HistoryStatistics::from_records(&[record()]);
        let output = formatter.format_statistics(&stats).unwrap();
        assert!(output.contains("Feedback 5"));
        assert!(output.contains("Theorem 1"));
    }

    #[test]
    fn test_question_lists_answers() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let question = Question::new(QuestionId(1), "Are all sides equal?", 1);
        let answers = vec![
            AnswerOption {
                id: AnswerId(0),
                text: "No".to_string(),
            },
            AnswerOption {
                id: AnswerId(1),
                text: "Yes".to_string(),
            },
        ];
        let output = formatter.format_question(&question, &answers);
        assert_eq!(output, "Q1: Are all sides equal?\n  [0] No\n  [1] Yes");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
