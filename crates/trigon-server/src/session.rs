//! Session tokens and the registry of live sessions.
//!
//! A client starts a session and receives a JWT whose claims carry the
//! session id. Every later request presents that token; the registry maps
//! the id to the session's state behind its own mutex, so turns on one
//! session are serialized while different sessions proceed in parallel.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use trigon_domain::session::unix_now;
use trigon_domain::{Question, SessionRecord, SessionState};

/// Session management error
#[derive(Debug, Error)]
pub enum SessionError {
    /// JWT encoding failed
    #[error("Failed to encode JWT: {0}")]
    JwtEncode(#[from] jsonwebtoken::errors::Error),

    /// Token expired
    #[error("Session token expired")]
    TokenExpired,

    /// Invalid token
    #[error("Invalid session token")]
    InvalidToken,

    /// Token is valid but the session is gone (ended or expired)
    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session identifier
    pub session_id: String,

    /// Token expiration timestamp (Unix epoch)
    pub exp: u64,

    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Issues and validates session tokens
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_secs: u64,
}

impl TokenManager {
    /// Create a token manager with the given JWT secret and expiry
    pub fn new(jwt_secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_secs,
        }
    }

    /// Generate a token for the given session
    pub fn generate_token(&self, session_id: &str) -> Result<String, SessionError> {
        let now = unix_now();
        let claims = SessionClaims {
            session_id: session_id.to_string(),
            exp: now + self.token_expiry_secs,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and extract its claims
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let validation = Validation::default();
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            })?;

        Ok(token_data.claims)
    }
}

/// A session that is still in progress
#[derive(Debug, Clone)]
pub struct LiveSession {
    /// Engine state
    pub state: SessionState,

    /// Record saved when the session ends
    pub record: SessionRecord,

    /// Last question served and not yet answered
    pub pending_question: Option<Question>,

    /// Learner asked to go back to the pending question
    pub resume_requested: bool,
}

impl LiveSession {
    /// Wrap a fresh engine state
    pub fn new(session_id: &str, state: SessionState) -> Self {
        Self {
            state,
            record: SessionRecord::new(session_id),
            pending_question: None,
            resume_requested: false,
        }
    }
}

/// Handle to one live session
pub type SharedSession = Arc<Mutex<LiveSession>>;

/// Live sessions keyed by session id
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, replacing any session with the same id
    pub async fn insert(&self, session_id: String, session: LiveSession) -> SharedSession {
        let shared = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::clone(&shared));
        shared
    }

    /// Look up a session
    pub async fn get(&self, session_id: &str) -> Result<SharedSession, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))
    }

    /// Drop a session; returns whether it was present
    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is live
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove every session idle for longer than `ttl_secs` as of `now`
    ///
    /// Sessions currently locked by a turn are in use and never expire.
    pub async fn expire_idle(&self, ttl_secs: u64, now: u64) -> Vec<String> {
        let mut sessions = self.sessions.write().await;

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, session)| match session.try_lock() {
                Ok(live) => live.state.idle_secs(now) > ttl_secs,
                Err(_) => false,
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }
        expired
    }
}
