//! Shared application state: the live session registry plus per-session
//! event hubs and background tickers.

pub mod crisis;
pub mod lifecycle;
pub mod minigames;
pub mod outcome;
pub mod rooms;
pub mod session;

use std::sync::Arc;

use dashmap::DashMap;
use rand::rng;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    config::AppConfig,
    dto::sse::ServerEvent,
    error::ServiceError,
    state::session::{Session, make_session_code},
};

/// Cheaply clonable handle on the central application state.
pub type SharedState = Arc<AppState>;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Broadcast capacity of each session's event hub.
const SSE_CHANNEL_CAPACITY: usize = 16;
/// Give up allocating a session code after this many collisions.
const CODE_ALLOCATION_ATTEMPTS: usize = 512;

/// One live session: the aggregate behind its lock, the SSE hub fanning out
/// events to subscribers, and the pump simulation ticker.
///
/// The `RwLock` is the serialization point the original design lacked: every
/// command for a session runs under the write guard, so compound invariants
/// (role uniqueness, exactly-once room order) actually hold.
pub struct SessionHandle {
    session: RwLock<Session>,
    events: SseHub,
    pump_ticker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionHandle {
    fn new(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
            events: SseHub::new(SSE_CHANNEL_CAPACITY),
            pump_ticker: Mutex::new(None),
        }
    }

    /// The session aggregate guarded by its per-session lock.
    pub fn session(&self) -> &RwLock<Session> {
        &self.session
    }

    /// Broadcast hub for this session's SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }

    /// Install the pump ticker task, aborting any previous one.
    pub async fn install_pump_ticker(&self, handle: JoinHandle<()>) {
        let mut guard = self.pump_ticker.lock().await;
        if let Some(previous) = guard.replace(handle) {
            previous.abort();
        }
    }

    /// Stop the pump ticker if one is running.
    pub async fn abort_pump_ticker(&self) {
        let mut guard = self.pump_ticker.lock().await;
        if let Some(ticker) = guard.take() {
            ticker.abort();
        }
    }
}

/// Central application state storing every live session.
pub struct AppState {
    sessions: DashMap<String, Arc<SessionHandle>>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            sessions: DashMap::new(),
            config,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Allocate an unused session code.
    pub fn allocate_code(&self) -> Result<String, ServiceError> {
        let mut rng = rng();
        for _ in 0..CODE_ALLOCATION_ATTEMPTS {
            let code = make_session_code(&mut rng);
            if !self.sessions.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(ServiceError::InvalidState(
            "no free session codes available".into(),
        ))
    }

    /// Register a freshly created session.
    pub fn insert_session(&self, session: Session) -> Arc<SessionHandle> {
        let code = session.code.clone();
        let handle = Arc::new(SessionHandle::new(session));
        self.sessions.insert(code, handle.clone());
        handle
    }

    /// Look up a live session by code.
    pub fn session(&self, code: &str) -> Result<Arc<SessionHandle>, ServiceError> {
        self.sessions
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::NotFound(format!("session `{code}` not found")))
    }

    /// Drop a session, stopping its background ticker.
    pub async fn remove_session(&self, code: &str) {
        if let Some((_, handle)) = self.sessions.remove(code) {
            handle.abort_pump_ticker().await;
            info!(%code, "session removed");
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Collect the codes of sessions whose timer deadline passed more than
    /// `grace_ms` ago. The timer stays advisory for gameplay; this only
    /// bounds memory held by abandoned sessions.
    pub async fn expired_sessions(&self, now_ms: i64, grace_ms: i64) -> Vec<String> {
        let mut expired = Vec::new();
        for entry in self.sessions.iter() {
            let session = entry.value().session().read().await;
            if let Some(deadline) = session.timer_deadline_ms {
                if now_ms - deadline > grace_ms {
                    expired.push(session.code.clone());
                }
            }
        }
        expired
    }
}

/// Simple broadcast hub wrapper used for a session's SSE stream.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(state: &SharedState, code: &str, deadline_ms: Option<i64>) {
        let handle = state.insert_session(Session::new(code.into(), "Ada".into()));
        let mut session = handle
            .session()
            .try_write()
            .expect("no other lock holders in test");
        session.timer_deadline_ms = deadline_ms;
    }

    #[tokio::test]
    async fn expired_sessions_respect_the_grace_period() {
        let state = AppState::new(AppConfig::default());
        seeded(&state, "GV1111", Some(1_000));
        seeded(&state, "GV2222", Some(9_000));
        // A lobby that never started has no deadline and is never swept.
        seeded(&state, "GV3333", None);

        let expired = state.expired_sessions(10_000, 5_000).await;
        assert_eq!(expired, vec!["GV1111".to_string()]);

        state.remove_session("GV1111").await;
        assert_eq!(state.session_count(), 2);
        assert!(state.session("GV1111").is_err());
        assert!(state.session("GV2222").is_ok());
    }
}
