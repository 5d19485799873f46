//! Per-dependency circuit breaker
//!
//! # States
//! - Closed: calls pass through, every outcome lands in the sliding window
//! - Open: calls are rejected without touching the executor
//! - Half-Open: a small trial budget probes whether the peer recovered
//!
//! # State Transitions
//! ```text
//! Closed    → Open:      failure rate >= threshold (once minimum calls buffered)
//! Open      → Half-Open: wait duration elapsed, on the next call
//! Half-Open → Closed:    one trial succeeds (window reset)
//! Half-Open → Open:      one trial fails (timer reset)
//! ```
//!
//! Many concurrent requests share one breaker per dependency, so all state
//! lives behind a single mutex that is never held across an await.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

use super::{DependencyKey, Rejection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the breaker remembers recent outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlidingWindow {
    /// The last `n` calls.
    CountBased(usize),
    /// Calls finished within the trailing duration.
    TimeBased(Duration),
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failure percentage (0-100] at which the breaker opens.
    pub failure_rate_threshold: f64,
    pub sliding_window: SlidingWindow,
    /// Outcomes required in the window before the rate is evaluated.
    pub minimum_number_of_calls: usize,
    pub wait_duration_in_open_state: Duration,
    pub permitted_calls_in_half_open_state: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window: SlidingWindow::CountBased(20),
            minimum_number_of_calls: 10,
            wait_duration_in_open_state: Duration::from_secs(10),
            permitted_calls_in_half_open_state: 3,
        }
    }
}

struct OutcomeWindow {
    kind: SlidingWindow,
    // (finished at, failed)
    outcomes: VecDeque<(Instant, bool)>,
}

impl OutcomeWindow {
    fn new(kind: SlidingWindow) -> Self {
        Self {
            kind,
            outcomes: VecDeque::new(),
        }
    }

    fn record(&mut self, failed: bool, now: Instant) {
        self.outcomes.push_back((now, failed));
        self.evict(now);
    }

    fn evict(&mut self, now: Instant) {
        match self.kind {
            SlidingWindow::CountBased(size) => {
                while self.outcomes.len() > size.max(1) {
                    self.outcomes.pop_front();
                }
            }
            SlidingWindow::TimeBased(span) => {
                while let Some((at, _)) = self.outcomes.front() {
                    if now.duration_since(*at) > span {
                        self.outcomes.pop_front();
                    } else {
                        break;
                    }
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.outcomes.len()
    }

    fn failure_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let failures = self.outcomes.iter().filter(|(_, failed)| *failed).count();
        failures as f64 * 100.0 / self.outcomes.len() as f64
    }

    fn reset(&mut self) {
        self.outcomes.clear();
    }
}

struct Inner {
    state: CircuitState,
    window: OutcomeWindow,
    opened_at: Option<Instant>,
    half_open_in_flight: u32,
    // Bumped on every transition; outcomes from older generations are dropped.
    generation: u64,
    last_transition_at: Option<DateTime<Utc>>,
}

/// Point-in-time view used by health reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failure_rate: f64,
    pub buffered_calls: usize,
    pub last_transition_at: Option<DateTime<Utc>>,
}

pub struct CircuitBreaker {
    dependency: DependencyKey,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(dependency: DependencyKey, config: CircuitBreakerConfig) -> Self {
        let window = OutcomeWindow::new(config.sliding_window);
        Self {
            dependency,
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                window,
                opened_at: None,
                half_open_in_flight: 0,
                generation: 0,
                last_transition_at: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Poison is ignored; no mutation leaves Inner half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let mut inner = self.lock();
        inner.window.evict(Instant::now());
        CircuitSnapshot {
            state: inner.state,
            failure_rate: inner.window.failure_rate(),
            buffered_calls: inner.window.len(),
            last_transition_at: inner.last_transition_at,
        }
    }

    /// Ask for permission to call the dependency.
    ///
    /// The returned permit must be completed with [`CallPermit::record`];
    /// dropping it unrecorded (e.g. on cancellation) hands a half-open trial
    /// slot back.
    pub fn try_acquire(&self) -> Result<CallPermit<'_>, Rejection> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Ok(self.permit(&inner, false)),
            CircuitState::Open => {
                let waited = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.config.wait_duration_in_open_state)
                    .unwrap_or(true);
                if waited {
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    inner.half_open_in_flight = 1;
                    Ok(self.permit(&inner, true))
                } else {
                    Err(Rejection::CircuitOpen)
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_in_flight < self.config.permitted_calls_in_half_open_state.max(1)
                {
                    inner.half_open_in_flight += 1;
                    Ok(self.permit(&inner, true))
                } else {
                    Err(Rejection::CircuitOpen)
                }
            }
        }
    }

    fn permit(&self, inner: &Inner, trial: bool) -> CallPermit<'_> {
        CallPermit {
            breaker: self,
            generation: inner.generation,
            trial,
            recorded: false,
        }
    }

    fn on_outcome(&self, generation: u64, success: bool) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        match inner.state {
            CircuitState::Closed => {
                inner.window.record(!success, Instant::now());
                if inner.window.len() >= self.minimum_calls() {
                    let rate = inner.window.failure_rate();
                    if rate >= self.config.failure_rate_threshold {
                        warn!(
                            dependency = %self.dependency,
                            failure_rate = rate,
                            threshold = self.config.failure_rate_threshold,
                            "Failure rate above threshold"
                        );
                        self.transition(&mut inner, CircuitState::Open);
                    }
                }
            }
            CircuitState::HalfOpen => {
                let next = if success {
                    CircuitState::Closed
                } else {
                    CircuitState::Open
                };
                self.transition(&mut inner, next);
            }
            CircuitState::Open => {}
        }
    }

    /// A count-based window never holds more than its size.
    fn minimum_calls(&self) -> usize {
        let minimum = self.config.minimum_number_of_calls.max(1);
        match self.config.sliding_window {
            SlidingWindow::CountBased(size) => minimum.min(size.max(1)),
            SlidingWindow::TimeBased(_) => minimum,
        }
    }

    fn on_abandoned(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation == generation && inner.state == CircuitState::HalfOpen {
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
        }
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        inner.generation += 1;
        inner.half_open_in_flight = 0;
        inner.last_transition_at = Some(Utc::now());
        match to {
            CircuitState::Open => inner.opened_at = Some(Instant::now()),
            CircuitState::Closed => {
                inner.opened_at = None;
                inner.window.reset();
            }
            CircuitState::HalfOpen => {}
        }

        if to == CircuitState::Open {
            warn!(dependency = %self.dependency, %from, %to, "Circuit breaker transition");
        } else {
            info!(dependency = %self.dependency, %from, %to, "Circuit breaker transition");
        }
        metrics::counter!(
            "circuit_breaker_transitions_total",
            "dependency" => self.dependency.to_string(),
            "to" => to.as_str()
        )
        .increment(1);
    }
}

/// Admission ticket for one attempt through the breaker.
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    recorded: bool,
}

impl CallPermit<'_> {
    pub fn record(mut self, success: bool) {
        self.recorded = true;
        self.breaker.on_outcome(self.generation, success);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.recorded && self.trial {
            self.breaker.on_abandoned(self.generation);
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
