// --------------------------------------------------
// Session management.
//
// Responsibilities:
// - Register / verify local credentials
// - Issue and revoke bearer tokens (in memory)
// - Upsert the user's profile whenever a session starts
// -------------------------------------------------

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::clock::now_fixed_offset;
use crate::error::AppError;
use crate::models::Account;
use crate::state::AppState;
use crate::store::Store;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub created_at: DateTime<FixedOffset>,
    pub expires_at: DateTime<FixedOffset>,
}

// In-memory tokens; a session is valid until `expires_at` or sign-out
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    // Expired sessions are dropped whenever a new one opens
    pub fn open(&self, user: User, now: DateTime<FixedOffset>) -> Session {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user,
            created_at: now,
            expires_at: now + self.ttl,
        };
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    pub fn get(&self, token: &str, now: DateTime<FixedOffset>) -> Option<Session> {
        let found = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()?;
        if found.expires_at > now {
            return Some(found);
        }
        self.close(token);
        tracing::debug!(user_id = %found.user.id, "session expired");
        None
    }

    // Returns whether a session was actually dropped
    pub fn close(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn sign_up(
    store: &Store,
    sessions: &SessionRegistry,
    email: &str,
    password: &str,
    now: DateTime<FixedOffset>,
) -> Result<Session, AppError> {
    let email = normalize_email(email);
    if !email.contains('@') {
        return Err(AppError::Validation("email is invalid".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let salt = Uuid::new_v4().simple().to_string();
    let account = Account {
        user_id: Uuid::new_v4(),
        email: email.clone(),
        password_hash: hash_password(&salt, password),
        salt,
    };
    let user = User {
        id: account.user_id,
        email,
    };

    store.register_account(account, now)?;
    tracing::info!(user_id = %user.id, "account registered");

    Ok(sessions.open(user, now))
}

pub fn sign_in(
    store: &Store,
    sessions: &SessionRegistry,
    email: &str,
    password: &str,
    now: DateTime<FixedOffset>,
) -> Result<Session, AppError> {
    let email = normalize_email(email);
    let rejected = || AppError::Unauthorized("invalid email or password".to_string());

    let Some(account) = store.find_account(&email)? else {
        tracing::warn!("sign-in for unknown email");
        return Err(rejected());
    };
    if hash_password(&account.salt, password) != account.password_hash {
        tracing::warn!(user_id = %account.user_id, "sign-in with wrong password");
        return Err(rejected());
    }

    store.upsert_profile(account.user_id, &account.email, now)?;
    tracing::info!(user_id = %account.user_id, "signed in");

    Ok(sessions.open(
        User {
            id: account.user_id,
            email: account.email,
        },
        now,
    ))
}

pub fn sign_out(sessions: &SessionRegistry, token: &str) -> bool {
    let closed = sessions.close(token);
    if closed {
        tracing::info!("signed out");
    }
    closed
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// Resolve the caller's session from `Authorization: Bearer <token>`
pub fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;
    state
        .sessions
        .get(token, now_fixed_offset())
        .ok_or_else(|| AppError::Unauthorized("session expired or unknown".to_string()))
}
