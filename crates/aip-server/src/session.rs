//! Admin sessions.
//!
//! [`SessionStore`] is the single holder of sign-in state. Handlers and the
//! route guard receive it through axum state; anything that wants to react to
//! sign-in changes calls [`SessionStore::subscribe`] and drops the receiver
//! to unsubscribe.

use std::collections::HashMap;
use std::sync::Arc;

use aip_core::{hash_password, verify_password, AppConfig, BcryptError};
use aip_db::DbError;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio::task::{JoinError, JoinHandle};

const EVENT_CAPACITY: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: i64, email: String },
    SignedOut { user_id: i64, email: String },
    SignedUp { user_id: i64, email: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("sign-up is disabled")]
    SignUpDisabled,
    #[error("an account with that email already exists")]
    EmailTaken,
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("password hashing failed: {0}")]
    Hash(#[from] BcryptError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] JoinError),
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// bcrypt cost used when sign-up hashes a new password.
    pub password_cost: u32,
    pub ttl: Duration,
    pub allow_sign_up: bool,
}

impl SessionSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            password_cost: config.password_cost,
            ttl: Duration::hours(i64::from(config.session_ttl_hours)),
            allow_sign_up: config.allow_sign_up,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: PgPool,
    settings: Arc<SessionSettings>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionStore {
    #[must_use]
    pub fn new(pool: PgPool, settings: SessionSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            pool,
            settings: Arc::new(settings),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    #[must_use]
    pub fn sign_up_enabled(&self) -> bool {
        self.settings.allow_sign_up
    }

    /// Verifies credentials against `admin_users` and opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password, [`AuthError::Db`] if the lookup fails, or
    /// [`AuthError::Task`] if the verification task panics.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = aip_db::get_admin_user_by_email(&self.pool, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let candidate = password.to_string();
        let stored = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&candidate, &stored)).await?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.open_session(user.id, user.email).await;
        self.emit(AuthEvent::SignedIn {
            user_id: session.user_id,
            email: session.email.clone(),
        });
        Ok(session)
    }

    /// Creates an admin account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignUpDisabled`] unless enabled in config,
    /// [`AuthError::InvalidInput`] for a malformed email or short password,
    /// [`AuthError::EmailTaken`] for a duplicate email, [`AuthError::Hash`] or
    /// [`AuthError::Task`] if hashing fails, or [`AuthError::Db`].
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if !self.settings.allow_sign_up {
            return Err(AuthError::SignUpDisabled);
        }
        let email = validate_credentials(email, password)?;

        let plain = password.to_string();
        let cost = self.settings.password_cost;
        let hash = tokio::task::spawn_blocking(move || hash_password(&plain, cost)).await??;
        let user = aip_db::create_admin_user(&self.pool, email, &hash)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    AuthError::EmailTaken
                } else {
                    AuthError::Db(e)
                }
            })?;

        let session = self.open_session(user.id, user.email).await;
        self.emit(AuthEvent::SignedUp {
            user_id: session.user_id,
            email: session.email.clone(),
        });
        Ok(session)
    }

    /// Ends the session for `token`. Returns `false` if none was open.
    pub async fn sign_out(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        match removed {
            Some(session) => {
                self.emit(AuthEvent::SignedOut {
                    user_id: session.user_id,
                    email: session.email,
                });
                true
            }
            None => false,
        }
    }

    /// The live session for `token`. Expired sessions are evicted.
    pub async fn get_session(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(session) if session.expires_at > now => return Some(session.clone()),
                Some(_) => {}
            }
        }
        self.sessions.write().await.remove(token);
        None
    }

    /// Registers a listener for auth events. Dropping the receiver
    /// unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Stores a fresh session. Expired sessions whose tokens were never
    /// presented again are dropped here, so the map stays bounded by the
    /// number of live sessions.
    pub(crate) async fn open_session(&self, user_id: i64, email: String) -> Session {
        let now = Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user_id,
            email,
            signed_in_at: now,
            expires_at: now + self.settings.ttl,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted expired sessions");
        }
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn validate_credentials<'a>(email: &'a str, password: &str) -> Result<&'a str, AuthError> {
    let email = email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(AuthError::InvalidInput("email must be a valid address"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidInput(
            "password must be at least 8 characters",
        ));
    }
    Ok(email)
}

/// Logs every auth event until the store is dropped.
pub fn spawn_auth_event_logger(store: &SessionStore) -> JoinHandle<()> {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedIn { user_id, email }) => {
                    tracing::info!(user_id, email = %email, "admin signed in");
                }
                Ok(AuthEvent::SignedOut { user_id, email }) => {
                    tracing::info!(user_id, email = %email, "admin signed out");
                }
                Ok(AuthEvent::SignedUp { user_id, email }) => {
                    tracing::info!(user_id, email = %email, "admin account created");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
