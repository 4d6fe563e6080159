//! In-memory snapshot store with session-gated writes

use crate::types::TickerState;
use tokio::sync::{watch, RwLock};

/// Identifies one `start()`..`stop()` span of a poller
pub type SessionId = u64;

struct StoreInner {
    state: TickerState,
    session: Option<SessionId>,
    revision: u64,
}

/// Result of an accepted write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub revision: u64,
    /// Headline price as written by this update
    pub headline_price: String,
}

/// Holds the published ticker state
///
/// Writes carry the session id of the tick that produced them and are
/// rejected unless that session is still open. Opening, closing and writing
/// all happen under the same lock, so once `close_session` returns no write
/// from the closed session can land.
pub struct SnapshotStore {
    inner: RwLock<StoreInner>,
    updates: watch::Sender<TickerState>,
}

impl SnapshotStore {
    /// Creates a store holding the loading state
    pub fn new() -> Self {
        let (updates, _) = watch::channel(TickerState::loading());
        Self {
            inner: RwLock::new(StoreInner {
                state: TickerState::loading(),
                session: None,
                revision: 0,
            }),
            updates,
        }
    }

    /// Opens a session, replacing any previous one
    pub async fn open_session(&self, session: SessionId) {
        self.inner.write().await.session = Some(session);
    }

    /// Closes the given session if it is the open one
    pub async fn close_session(&self, session: SessionId) {
        let mut inner = self.inner.write().await;
        if inner.session == Some(session) {
            inner.session = None;
        }
    }

    /// Currently open session, if any
    pub async fn active_session(&self) -> Option<SessionId> {
        self.inner.read().await.session
    }

    /// Applies `update` if `session` is open
    ///
    /// # Returns
    /// The new revision and headline, or `None` when the write was rejected
    pub async fn publish<F>(&self, session: SessionId, update: F) -> Option<Published>
    where
        F: FnOnce(&mut TickerState),
    {
        let mut inner = self.inner.write().await;
        if inner.session != Some(session) {
            return None;
        }

        update(&mut inner.state);
        inner.revision += 1;
        self.updates.send_replace(inner.state.clone());

        log::debug!(
            "Published {} snapshot, revision {}",
            inner.state.snapshot.kind(),
            inner.revision
        );

        Some(Published {
            revision: inner.revision,
            headline_price: inner.state.headline_price.clone(),
        })
    }

    /// Current state
    pub async fn current(&self) -> TickerState {
        self.inner.read().await.state.clone()
    }

    /// Number of accepted writes so far
    pub async fn revision(&self) -> u64 {
        self.inner.read().await.revision
    }

    /// Receiver that sees every published state
    pub fn subscribe(&self) -> watch::Receiver<TickerState> {
        self.updates.subscribe()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
