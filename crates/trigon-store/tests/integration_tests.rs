//! Integration tests for trigon-store
//!
//! These tests import the demo seed and drive the engine against SQLite.

use rand::rngs::StdRng;
use rand::SeedableRng;
use trigon_domain::traits::{KnowledgeBase, MultiplierResolver};
use trigon_domain::{
    AnswerId, CalibrationConfig, Engine, Feedback, Interaction, QuestionId, SessionRecord, TheoremId,
    TriangleCategory,
};
use trigon_store::{KnowledgeSeed, SqliteStore};

const DEMO_SEED: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/demo_seed.json"));

fn seeded_store() -> SqliteStore {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let seed = KnowledgeSeed::from_json(DEMO_SEED).unwrap();
    store.import_seed(&seed).unwrap();
    store
}

fn record(id: &str, answers: &[(u32, u32)], triangles: &[TriangleCategory], helpful: &[u32]) -> SessionRecord {
    let mut record = SessionRecord::new(id);
    record.interactions = answers
        .iter()
        .map(|&(q, a)| Interaction {
            question_id: QuestionId(q),
            answer_id: AnswerId(a),
        })
        .collect();
    record.triangle_types = triangles.to_vec();
    record.helpful_theorems = helpful.iter().copied().map(TheoremId).collect();
    record.feedback = Some(Feedback::Solved);
    record
}

#[test]
fn test_import_demo_seed() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let seed = KnowledgeSeed::from_json(DEMO_SEED).unwrap();

    let summary = store.import_seed(&seed).unwrap();

    assert_eq!(summary.questions, 12);
    assert_eq!(summary.theorems, 12);
    assert_eq!(store.active_questions().unwrap().len(), 11);
    assert_eq!(store.all_questions().unwrap().len(), 12);
    assert_eq!(store.active_theorems().unwrap().len(), 12);
    assert_eq!(store.answer_options().unwrap().len(), 4);
    assert_eq!(store.feedback_options().unwrap().len(), 4);
}

#[test]
fn test_reimport_is_idempotent() {
    let mut store = seeded_store();
    let seed = KnowledgeSeed::from_json(DEMO_SEED).unwrap();

    store.import_seed(&seed).unwrap();

    assert_eq!(store.all_questions().unwrap().len(), 12);
    assert_eq!(
        store.all_multipliers().unwrap().len(),
        seed.multipliers.len()
    );
}

#[test]
fn test_question_lookup_includes_prerequisites() {
    let store = seeded_store();

    let question = store.question(QuestionId(4)).unwrap().unwrap();
    assert_eq!(question.difficulty, 2);
    assert!(question.prerequisites.contains(&QuestionId(1)));

    assert!(store.question(QuestionId(999)).unwrap().is_none());
}

#[test]
fn test_multiplier_lookup() {
    let store = seeded_store();

    let rows = store.answer_multipliers(QuestionId(1), AnswerId(1)).unwrap();
    let equilateral = rows
        .iter()
        .find(|m| m.triangle == TriangleCategory::Equilateral)
        .unwrap();
    assert_eq!(equilateral.effective(), 3.0);
    assert_eq!(equilateral.override_value, None);

    let all = store.question_multipliers(QuestionId(1)).unwrap();
    assert!(all.len() > rows.len());
    assert!(store.answer_multipliers(QuestionId(1), AnswerId(9)).unwrap().is_empty());
}

#[test]
fn test_connections_and_missing_statistics() {
    let store = seeded_store();

    let connections = store.connections().unwrap();
    assert!(connections
        .iter()
        .any(|c| c.theorem_id == TheoremId(1) && c.triangle == TriangleCategory::Right && c.strength == 1.0));

    assert_eq!(store.general_helpfulness(TheoremId(1)).unwrap(), None);
    assert_eq!(
        store
            .question_answer_score(QuestionId(1), AnswerId(1), TheoremId(1))
            .unwrap(),
        None
    );
}

#[test]
fn test_engine_session_against_sqlite() {
    let store = seeded_store();
    let engine = Engine::default();
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = engine.start_session(&store).unwrap();

    let opening = engine.select_next_question(&mut state, &store, &mut rng).unwrap();
    assert_eq!(opening.difficulty, 1);

    // answer "yes" to the right-angle question regardless of the opener
    let weights = engine
        .process_answer(&mut state, &store, QuestionId(3), AnswerId(1))
        .unwrap();
    assert!((weights.total() - 1.0).abs() < 1e-9);
    assert_eq!(weights.get(TriangleCategory::Equilateral), 0.0);

    let ranked = engine
        .ranked_theorems(&state, &store, QuestionId(3), AnswerId(1))
        .unwrap();
    assert!(ranked.iter().any(|t| t.theorem_id == TheoremId(1)));
    assert!(ranked
        .windows(2)
        .all(|pair| pair[0].combined_score >= pair[1].combined_score));

    let mut served = vec![];
    for _ in 0..5 {
        match engine.select_next_question(&mut state, &store, &mut rng) {
            Ok(question) => {
                for prerequisite in &question.prerequisites {
                    assert!(served.contains(prerequisite) || state.asked_questions.contains(prerequisite));
                }
                served.push(question.id);
                engine
                    .process_answer(&mut state, &store, question.id, AnswerId(2))
                    .unwrap();
            }
            Err(_) => break,
        }
    }
    assert!(!served.contains(&QuestionId(12)));
}

#[test]
fn test_session_history_round_trip() {
    let store = seeded_store();

    store.save_session(&record("first", &[(1, 1)], &[], &[4])).unwrap();
    store.save_session(&record("second", &[(3, 1), (6, 1)], &[], &[1])).unwrap();
    store.save_session(&record("third", &[], &[], &[1])).unwrap();

    assert_eq!(store.session_count().unwrap(), 3);

    let latest = store.load_sessions(Some(2), 0).unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].session_id, "third");

    let older = store.load_sessions(Some(2), 2).unwrap();
    assert_eq!(older.len(), 1);
    assert_eq!(older[0].session_id, "first");

    let stats = store.statistics().unwrap();
    assert_eq!(stats.total_sessions, 3);
    assert_eq!(stats.feedback_distribution[&5], 3);
    assert_eq!(stats.most_helpful_theorems[0].theorem_id, TheoremId(1));
    assert!((stats.average_interactions - 1.0).abs() < 1e-12);
}

#[test]
fn test_saving_same_session_twice_replaces_it() {
    let store = seeded_store();

    store.save_session(&record("dup", &[(1, 1)], &[], &[])).unwrap();
    store.save_session(&record("dup", &[(1, 1), (2, 0)], &[], &[])).unwrap();

    let sessions = store.all_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].interactions.len(), 2);
}

#[test]
fn test_recalibration() {
    let mut store = seeded_store();
    for i in 0..10 {
        let helpful: &[u32] = if i % 2 == 0 { &[1] } else { &[1, 2] };
        store
            .save_session(&record(&format!("s{}", i), &[(3, 1)], &[TriangleCategory::Right], helpful))
            .unwrap();
    }

    let report = store.recalibrate(&CalibrationConfig::default()).unwrap();
    assert_eq!(report.sessions, 10);
    assert!(report.multipliers_updated >= 3);

    let rows = store.answer_multipliers(QuestionId(3), AnswerId(1)).unwrap();
    let by_triangle = |t: TriangleCategory| rows.iter().find(|m| m.triangle == t).unwrap();

    // always reported together with the answer: never weakened
    assert_eq!(by_triangle(TriangleCategory::Right).override_value, Some(3.0));
    // never reported: pulled toward 0
    let equilateral = by_triangle(TriangleCategory::Equilateral).effective();
    assert!((equilateral - 0.0375).abs() < 1e-12);
    let general = by_triangle(TriangleCategory::General).effective();
    assert!((general - 0.45).abs() < 1e-12);

    // answers not seen often enough stay untouched
    let no_rows = store.answer_multipliers(QuestionId(3), AnswerId(0)).unwrap();
    assert!(no_rows.iter().all(|m| m.override_value.is_none()));

    assert_eq!(
        store
            .question_answer_score(QuestionId(3), AnswerId(1), TheoremId(1))
            .unwrap(),
        Some(1.0)
    );
    assert_eq!(
        store
            .question_answer_score(QuestionId(3), AnswerId(1), TheoremId(2))
            .unwrap(),
        Some(0.5)
    );
    assert_eq!(store.general_helpfulness(TheoremId(2)).unwrap(), Some(0.5));
    assert_eq!(store.general_helpfulness(TheoremId(5)).unwrap(), None);
}

#[test]
fn test_persistence_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trigon.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        store
            .import_seed(&KnowledgeSeed::from_json(DEMO_SEED).unwrap())
            .unwrap();
        store.save_session(&record("kept", &[(1, 0)], &[], &[])).unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    assert_eq!(store.active_questions().unwrap().len(), 11);
    assert_eq!(store.session_count().unwrap(), 1);
}
