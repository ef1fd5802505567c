//! Client-side session: the persisted bearer token, its decoded claims, and
//! the authentication state other components subscribe to.

pub mod guard;
pub mod store;

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;

pub use guard::{Navigator, PollHandle, SessionGuard, TokenStatus};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("token store error: {0}")]
    Store(String),

    #[error("unreadable token store: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Store(err.to_string())
    }
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl SessionClaims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }

    pub fn username(&self) -> Option<&str> {
        self.claims
            .get("username")
            .or_else(|| self.claims.get("sub"))
            .and_then(Value::as_str)
    }
}

/// Decode a JWT payload without verifying its signature.
///
/// The client never holds the signing secret; the server remains the
/// authority on signatures. Expiry is checked by the caller against its own
/// clock so the comparison is exact (no leeway).
pub fn decode_claims(token: &str) -> Result<SessionClaims, SessionError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| SessionError::MalformedToken(e.to_string()))
}

pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// Shared session service.
///
/// All token access goes through here; nothing else touches the store.
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    state: Arc<watch::Sender<AuthState>>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let initial = match store.read() {
            Ok(Some(token)) => match decode_claims(&token) {
                Ok(claims) if !claims.is_expired_at(now_timestamp()) => AuthState::Authenticated,
                _ => AuthState::Unauthenticated,
            },
            _ => AuthState::Unauthenticated,
        };

        let (state, _) = watch::channel(initial);
        Self {
            store,
            state: Arc::new(state),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Current token, read fresh from the store
    pub fn get(&self) -> Option<String> {
        match self.store.read() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn set(&self, token: &str) -> Result<(), SessionError> {
        self.store.write(token)?;
        self.publish(AuthState::Authenticated);
        tracing::info!("Session token stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.remove()?;
        self.publish(AuthState::Unauthenticated);
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Last published state; may lag the store until the guard next checks it
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn claims(&self) -> Option<SessionClaims> {
        self.get().and_then(|token| decode_claims(&token).ok())
    }

    fn publish(&self, next: AuthState) {
        self.state.send_if_modified(|current| {
            let changed = *current != next;
            *current = next;
            changed
        });
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("state", &self.state()).finish()
    }
}
