//! Market data poller
//!
//! Keeps a [`TickerState`] fresh while it is running: one tick as soon as it
//! starts, then one per interval. Every tick goes through the
//! [`FallbackChain`] and publishes into the [`SnapshotStore`]; nothing a tick
//! does can fail the caller.

use crate::{
    config::PollerConfig,
    error::ProviderError,
    metrics::{PollMetrics, PollerMetrics},
    provider::MarketDataSource,
    providers::{fallback::TickOutcome, CoinGeckoProvider, FallbackChain},
    store::{Published, SessionId, SnapshotStore},
    types::{
        ComponentHealth, HealthStatus, MarketSnapshot, PollerStatus, TickerEvent, TickerState,
        UpdateKind,
    },
};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Everything a tick needs, shared with the background task
struct TickContext {
    token_id: String,
    fallback_price: String,
    chain: FallbackChain,
    store: Arc<SnapshotStore>,
    metrics: Arc<PollMetrics>,
    events: broadcast::Sender<TickerEvent>,
}

impl TickContext {
    fn emit(&self, event: TickerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Runs one tick for `session`
    ///
    /// # Returns
    /// What the tick published, or `None` if the session was closed by the
    /// time the result arrived
    async fn tick(&self, session: SessionId) -> Option<UpdateKind> {
        if self.store.active_session().await != Some(session) {
            return None;
        }

        let provider = self.chain.provider_name();
        let outcome = self.chain.run(&self.token_id).await;

        let (kind, published, error) = match &outcome {
            TickOutcome::Full(market) => {
                let published = self
                    .store
                    .publish(session, |state| state.apply_full(market, provider))
                    .await;
                (UpdateKind::Full, published, None)
            }
            TickOutcome::Partial {
                quote,
                primary_error,
            } => {
                let published = self
                    .store
                    .publish(session, |state| state.apply_partial(quote, provider))
                    .await;
                (UpdateKind::Partial, published, Some(primary_error.to_string()))
            }
            TickOutcome::Unavailable {
                primary_error,
                fallback_error,
            } => {
                let published = self
                    .store
                    .publish(session, |state| state.apply_placeholder(&self.fallback_price))
                    .await;
                let message = format!("primary: {}; fallback: {}", primary_error, fallback_error);
                (UpdateKind::Placeholder, published, Some(message))
            }
        };

        let Some(Published {
            revision,
            headline_price: headline,
        }) = published
        else {
            tracing::debug!(
                session = session,
                kind = ?kind,
                "Discarding tick result for stopped session"
            );
            self.metrics.record_discarded().await;
            self.emit(TickerEvent::ResultDiscarded {
                id: Uuid::new_v4(),
                token_id: self.token_id.clone(),
                kind,
                timestamp: Utc::now(),
            });
            return None;
        };

        self.metrics.record_tick(kind).await;

        let event = match kind {
            UpdateKind::Full => TickerEvent::SnapshotPublished {
                id: Uuid::new_v4(),
                token_id: self.token_id.clone(),
                price: headline,
                revision,
                timestamp: Utc::now(),
            },
            UpdateKind::Partial => {
                tracing::warn!(
                    token_id = %self.token_id,
                    error = error.as_deref().unwrap_or_default(),
                    "Primary market data unavailable, applied fallback price"
                );
                TickerEvent::FallbackUsed {
                    id: Uuid::new_v4(),
                    token_id: self.token_id.clone(),
                    price: headline,
                    primary_error: error.unwrap_or_default(),
                    revision,
                    timestamp: Utc::now(),
                }
            }
            UpdateKind::Placeholder => {
                tracing::error!(
                    token_id = %self.token_id,
                    error = error.as_deref().unwrap_or_default(),
                    "Market data unavailable, showing placeholder price"
                );
                TickerEvent::PlaceholderApplied {
                    id: Uuid::new_v4(),
                    token_id: self.token_id.clone(),
                    error_message: error.unwrap_or_default(),
                    revision,
                    timestamp: Utc::now(),
                }
            }
        };
        self.emit(event);

        Some(kind)
    }
}

/// Handle to the background task of a running poller
struct RunningTask {
    session: SessionId,
    shutdown: watch::Sender<bool>,
    _handle: JoinHandle<()>,
}

/// Market data poller
///
/// An explicit lifecycle object: whoever shows the data owns the poller and
/// calls [`start`](Self::start) / [`stop`](Self::stop).
///
/// # Example
/// ```no_run
/// use xend_market_sdk::{MarketDataPoller, PollerConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PollerConfig::from_env()?;
/// let poller = MarketDataPoller::new(config.clone())?;
/// poller.start(config.poll_interval).await;
///
/// let state = poller.state().await;
/// println!("XEND: ${}", state.headline_price);
///
/// poller.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct MarketDataPoller {
    config: PollerConfig,
    ctx: Arc<TickContext>,
    running: Mutex<Option<RunningTask>>,
    next_session: AtomicU64,
}

impl MarketDataPoller {
    /// Creates a poller backed by CoinGecko
    pub fn new(config: PollerConfig) -> Result<Self, ProviderError> {
        let provider = CoinGeckoProvider::new(&config)?;
        Ok(Self::with_source(config, Arc::new(provider)))
    }

    /// Creates a poller with a custom source
    ///
    /// This is primarily for testing with mock sources.
    pub fn with_source(config: PollerConfig, source: Arc<dyn MarketDataSource>) -> Self {
        let metrics = Arc::new(PollMetrics::new(source.provider_name()));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let ctx = TickContext {
            token_id: config.token_id.clone(),
            fallback_price: config.fallback_price.clone(),
            chain: FallbackChain::new(source, metrics.clone()),
            store: Arc::new(SnapshotStore::new()),
            metrics,
            events,
        };

        Self {
            config,
            ctx: Arc::new(ctx),
            running: Mutex::new(None),
            next_session: AtomicU64::new(0),
        }
    }

    fn new_session(&self) -> SessionId {
        self.next_session.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Starts polling: one tick now, then one every `interval`
    ///
    /// Does nothing if the poller is already running or `interval` is zero.
    pub async fn start(&self, interval: Duration) {
        if interval.is_zero() {
            tracing::warn!("Refusing to start market data poller with a zero interval");
            return;
        }

        let mut running = self.running.lock().await;
        if running.is_some() {
            tracing::debug!("Market data poller already running");
            return;
        }

        // A one-off `poll_once` session still open is taken over, so its
        // result is published instead of discarded
        let session = match self.ctx.store.active_session().await {
            Some(session) => session,
            None => {
                let session = self.new_session();
                self.ctx.store.open_session(session).await;
                session
            }
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let ctx = self.ctx.clone();
        let handle = tokio::spawn(poll_loop(ctx, session, interval, shutdown_rx));

        *running = Some(RunningTask {
            session,
            shutdown,
            _handle: handle,
        });

        tracing::info!(
            token_id = %self.config.token_id,
            interval_ms = interval.as_millis() as u64,
            session = session,
            "Market data poller started"
        );
        self.ctx.emit(TickerEvent::PollerStatusChanged {
            id: Uuid::new_v4(),
            status: PollerStatus::Running,
            timestamp: Utc::now(),
        });
    }

    /// Stops polling
    ///
    /// After this returns the published state will not change again for
    /// this session. A request already in flight is left to finish and its
    /// result is dropped.
    pub async fn stop(&self) {
        let Some(task) = self.running.lock().await.take() else {
            return;
        };

        self.ctx.store.close_session(task.session).await;
        let _ = task.shutdown.send(true);

        tracing::info!(session = task.session, "Market data poller stopped");
        self.ctx.emit(TickerEvent::PollerStatusChanged {
            id: Uuid::new_v4(),
            status: PollerStatus::Stopped,
            timestamp: Utc::now(),
        });
    }

    /// True between `start()` and `stop()`
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Runs a single tick right away
    ///
    /// Uses the running session if there is one, otherwise a one-off session
    /// that is closed again afterwards. If `start()` runs while the one-off
    /// tick is in flight, the running poller adopts its session and the
    /// result is still published.
    pub async fn poll_once(&self) -> Option<UpdateKind> {
        let (session, one_shot) = {
            let running = self.running.lock().await;
            match running.as_ref() {
                Some(task) => (task.session, false),
                None => {
                    let session = self.new_session();
                    self.ctx.store.open_session(session).await;
                    (session, true)
                }
            }
        };

        let result = self.ctx.tick(session).await;

        if one_shot {
            let running = self.running.lock().await;
            if running.as_ref().map(|task| task.session) != Some(session) {
                self.ctx.store.close_session(session).await;
            }
        }
        result
    }

    /// Current published state
    pub async fn state(&self) -> TickerState {
        self.ctx.store.current().await
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> MarketSnapshot {
        self.ctx.store.current().await.snapshot
    }

    /// Number of published updates so far
    pub async fn revision(&self) -> u64 {
        self.ctx.store.revision().await
    }

    /// Receiver for every published state
    pub fn subscribe(&self) -> watch::Receiver<TickerState> {
        self.ctx.store.subscribe()
    }

    /// Receiver for ticker events
    pub fn subscribe_events(&self) -> broadcast::Receiver<TickerEvent> {
        self.ctx.events.subscribe()
    }

    /// The configuration this poller was built with
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Returns the name of the current provider
    pub fn provider_name(&self) -> &str {
        self.ctx.chain.provider_name()
    }

    /// Gets request latency and tick outcome metrics
    pub async fn get_metrics(&self) -> PollerMetrics {
        self.ctx.metrics.get_metrics().await
    }

    /// Perform a health check on the poller
    ///
    /// # Returns
    /// `Healthy` for a full snapshot, `Degraded` for a partial snapshot or a
    /// placeholder headline, `Unhealthy` while nothing has been fetched
    pub async fn health_check(&self) -> ComponentHealth {
        let state = self.state().await;
        let mut details = std::collections::HashMap::new();

        details.insert(
            "provider_name".to_string(),
            serde_json::json!(self.provider_name()),
        );
        details.insert(
            "snapshot".to_string(),
            serde_json::json!(state.snapshot.kind()),
        );
        details.insert(
            "placeholder".to_string(),
            serde_json::json!(state.placeholder),
        );
        details.insert(
            "running".to_string(),
            serde_json::json!(self.is_running().await),
        );
        details.insert(
            "revision".to_string(),
            serde_json::json!(self.revision().await),
        );

        let status = match (&state.snapshot, state.placeholder) {
            (MarketSnapshot::Loading, false) => HealthStatus::Unhealthy,
            (MarketSnapshot::Full(_), false) => HealthStatus::Healthy,
            _ => HealthStatus::Degraded,
        };

        let message = match status {
            HealthStatus::Healthy => "Market data is fresh".to_string(),
            HealthStatus::Degraded if state.placeholder => {
                "Both endpoints failed, showing placeholder price".to_string()
            }
            HealthStatus::Degraded => {
                "Primary endpoint failed, supply and all-time fields may be stale".to_string()
            }
            HealthStatus::Unhealthy => "No market data fetched yet".to_string(),
        };

        ComponentHealth {
            name: "market_data_poller".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: Utc::now(),
        }
    }
}

/// Background loop for one session
async fn poll_loop(
    ctx: Arc<TickContext>,
    session: SessionId,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        if *shutdown.borrow() {
            break;
        }
        ctx.tick(session).await;
    }

    tracing::debug!(session = session, "Market data poll loop exited");
}
