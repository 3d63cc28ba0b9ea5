//! Interactive question-and-answer loop.
//!
//! The loop reads from any [`LineSource`] and writes to any `Write`, so the
//! same code drives the terminal and the tests.

use crate::error::{CliError, Result};
use crate::output::Formatter;
use rand::Rng;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fmt::Display;
use std::io::Write;
use trigon_domain::traits::KnowledgeBase;
use trigon_domain::{
    AnswerId, AnswerOption, Engine, EngineError, Feedback, Question, SessionRecord, SessionState,
    TheoremId, TriangleCategory,
};

/// Number of ranked theorems shown after each answer
const THEOREMS_SHOWN: usize = 5;

/// Where answers come from
pub trait LineSource {
    /// Read one line; `None` once input is exhausted or interrupted
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Terminal input with line editing and history
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    /// Open the terminal editor
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                self.editor.add_history_entry(line.as_str()).ok();
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(CliError::Readline(e)),
        }
    }
}

/// Match typed input against the answer options by id or text
pub fn parse_answer(input: &str, answers: &[AnswerOption]) -> Option<AnswerId> {
    let input = input.trim();
    if let Ok(id) = input.parse::<u32>() {
        return answers.iter().find(|a| a.id.value() == id).map(|a| a.id);
    }
    answers
        .iter()
        .find(|a| a.text.eq_ignore_ascii_case(input))
        .map(|a| a.id)
}

fn is_quit(input: &str) -> bool {
    matches!(input.trim(), "q" | "quit" | "exit")
}

/// One interactive session over a knowledge base
pub struct PlaySession<'a, K: ?Sized, W> {
    engine: &'a Engine,
    kb: &'a K,
    answers: &'a [AnswerOption],
    formatter: &'a Formatter,
    out: W,
}

impl<'a, K, W> PlaySession<'a, K, W>
where
    K: KnowledgeBase + ?Sized,
    K::Error: Display,
    W: Write,
{
    /// Prepare a session
    pub fn new(
        engine: &'a Engine,
        kb: &'a K,
        answers: &'a [AnswerOption],
        formatter: &'a Formatter,
        out: W,
    ) -> Self {
        Self {
            engine,
            kb,
            answers,
            formatter,
            out,
        }
    }

    /// Run until the learner quits or no useful question is left
    ///
    /// Feedback 7 at the end goes back to the question that was on screen.
    pub fn run<S, R>(&mut self, session_id: &str, input: &mut S, rng: &mut R) -> Result<SessionRecord>
    where
        S: LineSource,
        R: Rng + ?Sized,
    {
        let mut state = self.engine.start_session(self.kb)?;
        let mut record = SessionRecord::new(session_id);
        let mut pending: Option<Question> = None;

        loop {
            let unanswered = self.question_loop(&mut state, input, rng, pending.take())?;
            record.interactions = state.interactions.clone();

            match self.ask_feedback(input)? {
                Some(Feedback::Resume) if unanswered.is_some() => {
                    record.feedback = Some(Feedback::Resume);
                    pending = unanswered;
                }
                Some(Feedback::Resume) => {
                    writeln!(self.out, "{}", self.formatter.warning("Nothing to resume"))?;
                    break;
                }
                Some(feedback) => {
                    record.feedback = Some(feedback);
                    record.triangle_types = self.ask_triangles(input)?;
                    record.helpful_theorems = self.ask_theorems(input)?;
                    break;
                }
                None => break,
            }
        }

        Ok(record)
    }

    /// Ask questions until quit or exhaustion; returns the unanswered question on quit
    fn question_loop<S, R>(
        &mut self,
        state: &mut SessionState,
        input: &mut S,
        rng: &mut R,
        mut pending: Option<Question>,
    ) -> Result<Option<Question>>
    where
        S: LineSource,
        R: Rng + ?Sized,
    {
        loop {
            let question = match pending.take() {
                Some(question) => question,
                None => match self.engine.select_next_question(state, self.kb, rng) {
                    Ok(question) => question,
                    Err(EngineError::NoQuestionAvailable) | Err(EngineError::NoEasyQuestionAvailable) => {
                        writeln!(self.out, "{}", self.formatter.info("No more useful questions."))?;
                        return Ok(None);
                    }
                    Err(e) => return Err(e.into()),
                },
            };

            writeln!(self.out, "{}", self.formatter.format_question(&question, self.answers))?;

            let Some(line) = input.read_line("answer> ")? else {
                return Ok(Some(question));
            };
            if is_quit(&line) {
                return Ok(Some(question));
            }

            let Some(answer_id) = parse_answer(&line, self.answers) else {
                writeln!(self.out, "{}", self.formatter.warning("Unknown answer, try again"))?;
                pending = Some(question);
                continue;
            };

            match self.engine.process_answer(state, self.kb, question.id, answer_id) {
                Ok(weights) => {
                    let ranked = self
                        .engine
                        .ranked_theorems(state, self.kb, question.id, answer_id)?;
                    let shown = &ranked[..ranked.len().min(THEOREMS_SHOWN)];
                    writeln!(self.out, "{}", self.formatter.format_weights(&weights)?)?;
                    writeln!(self.out, "{}", self.formatter.format_theorems(shown)?)?;
                }
                Err(e @ EngineError::MissingMultiplierData { .. }) | Err(e @ EngineError::DegenerateWeightState) => {
                    writeln!(self.out, "{}", self.formatter.error(&e.to_string()))?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn ask_feedback<S: LineSource>(&mut self, input: &mut S) -> Result<Option<Feedback>> {
        for feedback in Feedback::ALL {
            writeln!(self.out, "  [{}] {}", feedback.code(), feedback.description())?;
        }

        loop {
            let Some(line) = input.read_line("feedback (blank to skip)> ")? else {
                return Ok(None);
            };
            let line = line.trim();
            if line.is_empty() {
                return Ok(None);
            }

            match line.parse::<u8>().ok().and_then(|code| Feedback::try_from(code).ok()) {
                Some(feedback) => return Ok(Some(feedback)),
                None => {
                    writeln!(self.out, "{}", self.formatter.warning("Feedback must be 4, 5, 6 or 7"))?;
                }
            }
        }
    }

    fn ask_triangles<S: LineSource>(&mut self, input: &mut S) -> Result<Vec<TriangleCategory>> {
        let Some(line) = input.read_line("triangle types (comma separated)> ")? else {
            return Ok(Vec::new());
        };

        let mut categories = Vec::new();
        for part in line.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match TriangleCategory::parse(part) {
                Some(category) if !categories.contains(&category) => categories.push(category),
                Some(_) => {}
                None => {
                    let message = format!("Ignoring unknown triangle type: {}", part);
                    writeln!(self.out, "{}", self.formatter.warning(&message))?;
                }
            }
        }
        Ok(categories)
    }

    fn ask_theorems<S: LineSource>(&mut self, input: &mut S) -> Result<Vec<TheoremId>> {
        let Some(line) = input.read_line("helpful theorem ids (comma separated)> ")? else {
            return Ok(Vec::new());
        };

        let mut theorems = Vec::new();
        for part in line.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.parse::<u32>() {
                Ok(id) => theorems.push(TheoremId(id)),
                Err(_) => {
                    let message = format!("Ignoring invalid theorem id: {}", part);
                    writeln!(self.out, "{}", self.formatter.warning(&message))?;
                }
            }
        }
        Ok(theorems)
    }
}
