//! HTTP request handlers for the tutoring server.
//!
//! Every session-scoped route expects `Authorization: Bearer <token>`.
//! Handlers lock the session first and the store second.

use crate::session::{LiveSession, SessionError, SessionRegistry, SharedSession, TokenManager};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use trigon_domain::{
    AnswerId, AnswerOption, Engine, EngineError, Feedback, HistoryStatistics, Question, QuestionId,
    RankedTheorem, SessionRecord, TheoremId, TriangleCategory,
};
use trigon_store::{FeedbackOption, SqliteStore, StoreError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Belief-update engine
    pub engine: Arc<Engine>,
    /// Knowledge base and session history
    pub store: Arc<Mutex<SqliteStore>>,
    /// Live sessions
    pub sessions: Arc<SessionRegistry>,
    /// Session token issuer
    pub tokens: Arc<TokenManager>,
}

impl AppState {
    /// Assemble state around an opened store
    pub fn new(engine: Engine, store: SqliteStore, tokens: TokenManager) -> Self {
        Self {
            engine: Arc::new(engine),
            store: Arc::new(Mutex::new(store)),
            sessions: Arc::new(SessionRegistry::new()),
            tokens: Arc::new(tokens),
        }
    }
}

type WeightMap = BTreeMap<TriangleCategory, f64>;

/// Response to `POST /session/start`
#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    /// New session id
    pub session_id: String,
    /// Bearer token for later requests
    pub token: String,
    /// Opening triangle weights
    pub triangle_weights: WeightMap,
}

/// Response to `GET /session/status`
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    /// Session id
    pub session_id: String,
    /// Questions served so far
    pub asked_questions: Vec<QuestionId>,
    /// Number of answers processed
    pub interaction_count: usize,
    /// Current triangle weights
    pub triangle_weights: WeightMap,
    /// Question served and not yet answered
    pub pending_question: Option<QuestionId>,
    /// Feedback recorded so far
    pub feedback: Option<Feedback>,
}

/// Response to `POST /session/reset`
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetSessionResponse {
    /// Confirmation message
    pub message: String,
    /// Triangle weights after the reset
    pub triangle_weights: WeightMap,
}

/// Body of `POST /session/end`
#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    /// Final feedback
    #[serde(default)]
    pub feedback: Option<Feedback>,
    /// Categories the exercise turned out to be
    #[serde(default)]
    pub triangle_types: Vec<TriangleCategory>,
    /// Theorems that helped
    #[serde(default)]
    pub helpful_theorems: Vec<TheoremId>,
    /// Whether to save the session to history
    #[serde(default = "default_save")]
    pub save: bool,
}

fn default_save() -> bool {
    true
}

/// Response to `POST /session/end`
#[derive(Debug, Serialize, Deserialize)]
pub struct EndSessionResponse {
    /// Confirmation message
    pub message: String,
    /// Saved record, if the session was saved
    pub session: Option<SessionRecord>,
}

/// Body of `POST /feedback`
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    /// Feedback code (4-7)
    pub feedback: Feedback,
    /// Categories the exercise turned out to be
    #[serde(default)]
    pub triangle_types: Vec<TriangleCategory>,
    /// Theorems that helped
    #[serde(default)]
    pub helpful_theorems: Vec<TheoremId>,
}

/// Response to `POST /feedback`
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackResponse {
    /// Confirmation message
    pub message: String,
    /// `"resume"` when the next question will repeat the pending one
    pub action: Option<String>,
}

/// Response to `GET /questions/next`
#[derive(Debug, Serialize, Deserialize)]
pub struct NextQuestionResponse {
    /// Question to show
    pub question: Question,
    /// Whether this is the pending question served again
    pub resumed: bool,
}

/// Body of `POST /answers/submit` and `POST /theorems/relevant`
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Question answered
    pub question_id: QuestionId,
    /// Answer given
    pub answer_id: AnswerId,
}

/// Response to `POST /answers/submit`
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    /// Triangle weights after the answer
    pub triangle_weights: WeightMap,
    /// Theorems ranked for this answer
    pub theorems: Vec<RankedTheorem>,
}

/// Response to `POST /theorems/relevant`
#[derive(Debug, Serialize, Deserialize)]
pub struct RelevantTheoremsResponse {
    /// Theorems ranked for the answer
    pub theorems: Vec<RankedTheorem>,
}

/// Query string of `GET /sessions/history`
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of sessions
    pub limit: Option<usize>,
    /// Sessions to skip
    #[serde(default)]
    pub offset: usize,
}

/// Response to `GET /sessions/history`
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Saved sessions, most recent first
    pub sessions: Vec<SessionRecord>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of live sessions
    pub active_sessions: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Engine rejected the turn
    Engine(EngineError),
    /// Token or session lookup failed
    Session(SessionError),
    /// Storage failure
    Store(StoreError),
    /// Missing or malformed credentials
    Unauthorized(String),
    /// Invalid request content
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Engine(e) => match e {
                EngineError::NoEasyQuestionAvailable
                | EngineError::NoQuestionAvailable
                | EngineError::UnknownQuestion(_) => StatusCode::NOT_FOUND,
                EngineError::MissingMultiplierData { .. } | EngineError::DegenerateWeightState => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                EngineError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Session(e) => match e {
                SessionError::TokenExpired | SessionError::InvalidToken => StatusCode::UNAUTHORIZED,
                SessionError::UnknownSession(_) => StatusCode::NOT_FOUND,
                SessionError::JwtEncode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let message = match self {
            AppError::Engine(e) => e.to_string(),
            AppError::Session(e) => e.to_string(),
            AppError::Store(e) => e.to_string(),
            AppError::Unauthorized(msg) | AppError::BadRequest(msg) => msg,
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

/// Resolve the bearer token to a live session
async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(String, SharedSession), AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = state.tokens.validate_token(token)?;
    let session = state.sessions.get(&claims.session_id).await?;
    Ok((claims.session_id, session))
}

fn apply_report(record: &mut SessionRecord, triangle_types: Vec<TriangleCategory>, helpful_theorems: Vec<TheoremId>) {
    if !triangle_types.is_empty() {
        record.triangle_types = triangle_types;
    }
    if !helpful_theorems.is_empty() {
        record.helpful_theorems = helpful_theorems;
    }
}

/// POST /session/start - Open a new session
async fn start_session(State(state): State<AppState>) -> Result<Json<StartSessionResponse>, AppError> {
    let session_id = uuid::Uuid::now_v7().to_string();

    let engine_state = {
        let store = state.store.lock().await;
        state.engine.start_session(&*store)?
    };
    let triangle_weights = engine_state.triangle_weights.to_map();

    let token = state.tokens.generate_token(&session_id)?;
    state
        .sessions
        .insert(session_id.clone(), LiveSession::new(&session_id, engine_state))
        .await;

    info!(%session_id, "Session started");
    Ok(Json(StartSessionResponse {
        session_id,
        token,
        triangle_weights,
    }))
}

/// GET /session/status - Current state of the caller's session
async fn session_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let (session_id, session) = authorize(&state, &headers).await?;
    let live = session.lock().await;

    Ok(Json(SessionStatusResponse {
        session_id,
        asked_questions: live.state.asked_questions.clone(),
        interaction_count: live.state.interactions.len(),
        triangle_weights: live.state.triangle_weights.to_map(),
        pending_question: live.pending_question.as_ref().map(|q| q.id),
        feedback: live.record.feedback,
    }))
}

/// POST /session/reset - Start over without ending the session
async fn reset_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ResetSessionResponse>, AppError> {
    let (session_id, session) = authorize(&state, &headers).await?;
    let mut live = session.lock().await;

    let fresh = {
        let store = state.store.lock().await;
        state.engine.start_session(&*store)?
    };
    *live = LiveSession::new(&session_id, fresh);

    info!(%session_id, "Session reset");
    Ok(Json(ResetSessionResponse {
        message: "Session state reset".to_string(),
        triangle_weights: live.state.triangle_weights.to_map(),
    }))
}

/// POST /session/end - Close the session, optionally saving it to history
async fn end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EndSessionRequest>, JsonRejection>,
) -> Result<Json<EndSessionResponse>, AppError> {
    let (session_id, session) = authorize(&state, &headers).await?;
    let Json(request) = payload?;

    let saved = {
        let mut live = session.lock().await;
        if request.feedback.is_some() {
            live.record.feedback = request.feedback;
        }
        apply_report(&mut live.record, request.triangle_types, request.helpful_theorems);
        live.record.interactions = live.state.interactions.clone();

        if request.save {
            let store = state.store.lock().await;
            store.save_session(&live.record)?;
            Some(live.record.clone())
        } else {
            None
        }
    };

    state.sessions.remove(&session_id).await;
    info!(%session_id, saved = saved.is_some(), "Session ended");

    Ok(Json(EndSessionResponse {
        message: "Session ended".to_string(),
        session: saved,
    }))
}

/// POST /feedback - Record feedback without ending the session
///
/// Feedback 7 asks for the pending question to be served again.
async fn submit_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let (session_id, session) = authorize(&state, &headers).await?;
    let Json(request) = payload?;
    let mut live = session.lock().await;

    live.record.feedback = Some(request.feedback);

    if request.feedback.is_resume() {
        live.resume_requested = true;
        debug!(%session_id, "Resume requested");
        return Ok(Json(FeedbackResponse {
            message: "Feedback recorded, the current question will be resumed".to_string(),
            action: Some("resume".to_string()),
        }));
    }

    apply_report(&mut live.record, request.triangle_types, request.helpful_theorems);
    Ok(Json(FeedbackResponse {
        message: "Feedback recorded".to_string(),
        action: None,
    }))
}

/// GET /feedback/options - Feedback choices
async fn feedback_options(State(state): State<AppState>) -> Result<Json<Vec<FeedbackOption>>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.feedback_options()?))
}

/// GET /questions/next - Serve the next question
async fn next_question(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NextQuestionResponse>, AppError> {
    let (session_id, session) = authorize(&state, &headers).await?;
    let mut live = session.lock().await;

    if live.resume_requested {
        live.resume_requested = false;
        if let Some(question) = live.pending_question.clone() {
            debug!(%session_id, question_id = %question.id, "Resuming pending question");
            return Ok(Json(NextQuestionResponse {
                question,
                resumed: true,
            }));
        }
    }

    let store = state.store.lock().await;
    let mut rng = StdRng::from_entropy();
    let question = state
        .engine
        .select_next_question(&mut live.state, &*store, &mut rng)?;
    live.pending_question = Some(question.clone());

    Ok(Json(NextQuestionResponse {
        question,
        resumed: false,
    }))
}

/// GET /answers/options - Answer choices
async fn answer_options(State(state): State<AppState>) -> Result<Json<Vec<AnswerOption>>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.answer_options()?))
}

fn check_answer(store: &SqliteStore, answer_id: AnswerId) -> Result<(), AppError> {
    if store.answer_options()?.iter().any(|a| a.id == answer_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid answer_id: {}", answer_id)))
    }
}

/// POST /answers/submit - Apply an answer and rank theorems for it
async fn submit_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let (session_id, session) = authorize(&state, &headers).await?;
    let Json(request) = payload?;
    let mut live = session.lock().await;
    let store = state.store.lock().await;

    check_answer(&store, request.answer_id)?;

    let mut next = live.state.clone();
    let weights = state
        .engine
        .process_answer(&mut next, &*store, request.question_id, request.answer_id)?;
    let theorems = state
        .engine
        .ranked_theorems(&next, &*store, request.question_id, request.answer_id)?;

    live.state = next;
    if live
        .pending_question
        .as_ref()
        .is_some_and(|q| q.id == request.question_id)
    {
        live.pending_question = None;
    }

    debug!(%session_id, question_id = %request.question_id, answer_id = %request.answer_id, "Answer submitted");
    Ok(Json(SubmitAnswerResponse {
        triangle_weights: weights.to_map(),
        theorems,
    }))
}

/// POST /theorems/relevant - Rank theorems for an answer without applying it
async fn relevant_theorems(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<RelevantTheoremsResponse>, AppError> {
    let (_, session) = authorize(&state, &headers).await?;
    let Json(request) = payload?;
    let live = session.lock().await;
    let store = state.store.lock().await;

    check_answer(&store, request.answer_id)?;

    let theorems = state
        .engine
        .ranked_theorems(&live.state, &*store, request.question_id, request.answer_id)?;
    Ok(Json(RelevantTheoremsResponse { theorems }))
}

/// GET /sessions/history - Saved sessions, most recent first
async fn session_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let store = state.store.lock().await;
    let sessions = store.load_sessions(query.limit, query.offset)?;
    Ok(Json(HistoryResponse { sessions }))
}

/// GET /sessions/statistics - Aggregates over saved sessions
async fn session_statistics(State(state): State<AppState>) -> Result<Json<HistoryStatistics>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.statistics()?))
}

/// GET /health - Liveness check
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        active_sessions: state.sessions.len().await,
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/session/start", post(start_session))
        .route("/session/status", get(session_status))
        .route("/session/reset", post(reset_session))
        .route("/session/end", post(end_session))
        .route("/feedback", post(submit_feedback))
        .route("/feedback/options", get(feedback_options))
        .route("/questions/next", get(next_question))
        .route("/answers/options", get(answer_options))
        .route("/answers/submit", post(submit_answer))
        .route("/theorems/relevant", post(relevant_theorems))
        .route("/sessions/history", get(session_history))
        .route("/sessions/statistics", get(session_statistics))
        .route("/health", get(health_check))
        .with_state(state)
}
