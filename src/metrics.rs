//! Poll metrics collection and reporting
//!
//! Tracks latency and success rates per endpoint, plus how each tick ended.

use crate::types::UpdateKind;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep per endpoint
const MAX_SAMPLES: usize = 100;

/// Which endpoint a request went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Full market listing
    Primary,
    /// Simple current-price query
    Fallback,
}

/// Metrics for a single endpoint
#[derive(Debug, Clone)]
pub struct EndpointMetrics {
    /// 50th percentile latency of successful requests in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful requests in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of requests tracked
    pub total_requests: u64,
    /// Number of failed requests
    pub failed_requests: u64,
}

impl EndpointMetrics {
    /// Creates metrics with no data
    pub fn empty() -> Self {
        Self {
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
        }
    }
}

/// Counts of how ticks ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickCounts {
    pub full: u64,
    pub partial: u64,
    pub placeholder: u64,
    /// Ticks that resolved after `stop()` and were dropped
    pub discarded: u64,
}

/// Snapshot of everything the collector knows
#[derive(Debug, Clone)]
pub struct PollerMetrics {
    pub provider_name: String,
    pub primary: EndpointMetrics,
    pub fallback: EndpointMetrics,
    pub ticks: TickCounts,
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct EndpointWindow {
    samples: VecDeque<LatencySample>,
    total_requests: u64,
    failed_requests: u64,
}

impl EndpointWindow {
    fn record(&mut self, duration: Duration, success: bool) {
        self.total_requests += 1;
        if !success {
            self.failed_requests += 1;
        }
        if self.samples.len() >= MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(LatencySample {
            duration_ms: duration.as_secs_f64() * 1000.0,
            success,
        });
    }

    fn summarize(&self) -> EndpointMetrics {
        if self.samples.is_empty() {
            return EndpointMetrics::empty();
        }

        let mut latencies: Vec<f64> = self
            .samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if self.total_requests > 0 {
            (self.total_requests - self.failed_requests) as f64 / self.total_requests as f64
        } else {
            1.0
        };

        EndpointMetrics {
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: self.total_requests,
            failed_requests: self.failed_requests,
        }
    }
}

/// Collects request and tick metrics for one poller
pub struct PollMetrics {
    provider_name: String,
    primary: RwLock<EndpointWindow>,
    fallback: RwLock<EndpointWindow>,
    ticks: RwLock<TickCounts>,
}

impl PollMetrics {
    /// Creates a new collector for a provider
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            primary: RwLock::new(EndpointWindow::default()),
            fallback: RwLock::new(EndpointWindow::default()),
            ticks: RwLock::new(TickCounts::default()),
        }
    }

    fn window(&self, endpoint: Endpoint) -> &RwLock<EndpointWindow> {
        match endpoint {
            Endpoint::Primary => &self.primary,
            Endpoint::Fallback => &self.fallback,
        }
    }

    /// Records a request with its duration and success status
    pub async fn record_request(&self, endpoint: Endpoint, duration: Duration, success: bool) {
        self.window(endpoint).write().await.record(duration, success);
    }

    /// Records how a tick ended
    pub async fn record_tick(&self, kind: UpdateKind) {
        let mut ticks = self.ticks.write().await;
        match kind {
            UpdateKind::Full => ticks.full += 1,
            UpdateKind::Partial => ticks.partial += 1,
            UpdateKind::Placeholder => ticks.placeholder += 1,
        }
    }

    /// Records a tick whose result arrived after stop
    pub async fn record_discarded(&self) {
        self.ticks.write().await.discarded += 1;
    }

    /// Metrics for one endpoint
    pub async fn endpoint(&self, endpoint: Endpoint) -> EndpointMetrics {
        self.window(endpoint).read().await.summarize()
    }

    /// Tick outcome counters
    pub async fn ticks(&self) -> TickCounts {
        self.ticks.read().await.clone()
    }

    /// Computes current metrics
    pub async fn get_metrics(&self) -> PollerMetrics {
        PollerMetrics {
            provider_name: self.provider_name.clone(),
            primary: self.endpoint(Endpoint::Primary).await,
            fallback: self.endpoint(Endpoint::Fallback).await,
            ticks: self.ticks().await,
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
