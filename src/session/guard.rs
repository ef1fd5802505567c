use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{decode_claims, now_timestamp, Session, SessionClaims};

/// Classification of whatever token is currently persisted
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStatus {
    Missing,
    Malformed(String),
    Expired { exp: i64 },
    Valid(SessionClaims),
}

impl TokenStatus {
    pub fn classify(token: Option<&str>, now: i64) -> Self {
        let Some(token) = token else {
            return TokenStatus::Missing;
        };

        match decode_claims(token) {
            Err(e) => TokenStatus::Malformed(e.to_string()),
            Ok(claims) if claims.is_expired_at(now) => TokenStatus::Expired { exp: claims.exp },
            Ok(claims) => TokenStatus::Valid(claims),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenStatus::Valid(_))
    }

    fn reason(&self) -> &'static str {
        match self {
            TokenStatus::Missing => "no token found",
            TokenStatus::Malformed(_) => "token could not be decoded",
            TokenStatus::Expired { .. } => "token expired",
            TokenStatus::Valid(_) => "token valid",
        }
    }
}

/// Where the guard sends the user after evicting a session
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Enforces that only a currently valid token counts as logged in
pub struct SessionGuard {
    session: Session,
    poll_interval: Duration,
}

impl SessionGuard {
    pub fn new(session: Session, poll_interval: Duration) -> Self {
        Self {
            session,
            poll_interval,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Read-only check; never mutates the session
    pub fn check(&self) -> TokenStatus {
        self.check_at(now_timestamp())
    }

    pub fn check_at(&self, now: i64) -> TokenStatus {
        TokenStatus::classify(self.session.get().as_deref(), now)
    }

    /// `check` plus eviction: anything other than a valid token leaves the
    /// session cleared
    pub fn is_authenticated(&self) -> bool {
        match self.check() {
            TokenStatus::Valid(_) => true,
            status => {
                self.evict(&status);
                false
            }
        }
    }

    fn evict(&self, status: &TokenStatus) {
        match status {
            TokenStatus::Missing => tracing::debug!("No session token, treating as logged out"),
            other => tracing::warn!("Evicting session: {}", other.reason()),
        }

        if let Err(e) = self.session.clear() {
            tracing::error!("Failed to clear session token: {}", e);
        }
    }

    /// Start periodic re-validation.
    ///
    /// Only runs when a token exists at start. Each tick re-reads the store;
    /// the first tick that finds no valid token evicts the session, calls the
    /// navigator once, and ends the task.
    pub fn start_polling(self: &Arc<Self>, navigator: Arc<dyn Navigator>) -> Option<PollHandle> {
        if self.session.get().is_none() {
            return None;
        }

        let guard = Arc::clone(self);
        let period = self.poll_interval;
        let first_tick = Instant::now() + period;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(target: "session_poll", "Started ({:?} interval)", period);

            loop {
                ticker.tick().await;

                let status = guard.check();
                if status.is_valid() {
                    continue;
                }

                tracing::info!(target: "session_poll", "Logging out: {}", status.reason());
                guard.evict(&status);
                navigator.redirect_to_login();
                break;
            }
        });

        Some(PollHandle { task })
    }
}

/// Running poll timer; dropping it stops the timer
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the poller evicts the session (or is cancelled)
    pub async fn wait(&mut self) {
        let _ = (&mut self.task).await;
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
