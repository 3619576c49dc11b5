//! Per-session component models
//!
//! Each browser session owns one [`ComponentModel`]. Rounds lock the model for
//! their whole duration, so two requests of the same session run one after the
//! other while different sessions never contend.
//!
//! Sessions live in a bounded moka cache: a session untouched for the idle
//! timeout is evicted, and past the capacity the least recently used ones go
//! first. Only the server decides session ids.

use moka::future::Cache;
use pna_reactive::ComponentModel;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Session identifier handed to the browser
pub type SessionId = Uuid;

/// Shared handle to a session's model
pub type SessionModel = Arc<Mutex<ComponentModel>>;

/// Idle time after which a session is evicted
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Live sessions kept at most
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

/// Live sessions
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Cache<SessionId, SessionModel>,
}

impl SessionStore {
    /// Store with the default idle timeout and capacity
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }

    /// Store evicting sessions idle for `idle_timeout`, holding at most
    /// `max_sessions`
    #[must_use]
    pub fn with_limits(idle_timeout: Duration, max_sessions: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .time_to_idle(idle_timeout)
                .max_capacity(max_sessions)
                .build(),
        }
    }

    /// Start a session owning `model`
    pub async fn create(&self, model: ComponentModel) -> (SessionId, SessionModel) {
        let id = Uuid::new_v4();
        let model = Arc::new(Mutex::new(model));
        self.sessions.insert(id, Arc::clone(&model)).await;
        tracing::debug!(session = %id, "session started");
        (id, model)
    }

    /// Model of a live session; reading it resets the idle timer
    pub async fn get(&self, id: &SessionId) -> Option<SessionModel> {
        self.sessions.get(id).await
    }

    /// Forget a session
    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).await.is_some()
    }

    /// Number of live sessions, after pending evictions have run
    pub async fn len(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }

    /// Whether no session is live
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
