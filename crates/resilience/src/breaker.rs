//! Per-dependency circuit breaker.
//!
//! State transitions:
//! ```text
//! Closed ──(threshold connectivity failures)──► Open
//!   ▲                                             │
//!   │                                  (cool-down elapsed, next call)
//!   │                                             ▼
//!   └────────────(trial succeeds)──────────── HalfOpen ──(trial fails)──► Open
//! ```
//!
//! One breaker is created per remote dependency at start-up and shared by
//! every request through an `Arc`. All state lives behind a single mutex that
//! is never held across an await point.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Breaker thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive connectivity failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial call is allowed.
    pub open_duration: Duration,
}

impl BreakerConfig {
    pub fn new(failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            open_duration,
        }
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_secs(60),
        }
    }
}

/// Observable state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakerState {
    /// Calls pass through.
    Closed,
    /// Calls are rejected without touching the network.
    Open,
    /// A single trial call is probing the dependency.
    HalfOpen,
}

impl BreakerState {
    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// Circuit breaker guarding one remote dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker for the named dependency.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                last_failure_at: None,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    /// Returns the dependency name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured thresholds.
    pub fn config(&self) -> BreakerConfig {
        self.config
    }

    /// Returns the current state.
    ///
    /// An open breaker whose cool-down has elapsed still reports `Open` until
    /// the next call arrives and becomes the trial.
    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    /// Returns the current consecutive connectivity failure count.
    pub fn consecutive_failures(&self) -> u32 {
        self.inner.lock().consecutive_failures
    }

    /// Returns when the last connectivity failure was recorded.
    pub fn last_failure_at(&self) -> Option<Instant> {
        self.inner.lock().last_failure_at
    }

    /// Asks permission to make a call.
    ///
    /// Returns `None` when the circuit is open, or when it is half-open and
    /// the trial call is already in flight.
    pub fn acquire(&self) -> Option<CallPermit<'_>> {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => Some(CallPermit::new(self, false)),
            BreakerState::Open => {
                let cooled_down = inner
                    .opened_at
                    .is_none_or(|at| at.elapsed() >= self.config.open_duration);
                if cooled_down {
                    self.transition(&mut inner, BreakerState::HalfOpen);
                    inner.trial_in_flight = true;
                    Some(CallPermit::new(self, true))
                } else {
                    None
                }
            }
            BreakerState::HalfOpen => {
                if inner.trial_in_flight {
                    None
                } else {
                    inner.trial_in_flight = true;
                    Some(CallPermit::new(self, true))
                }
            }
        }
    }

    /// Forces the breaker back to closed with a clean failure count.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        self.transition(&mut inner, BreakerState::Closed);
        inner.consecutive_failures = 0;
        inner.last_failure_at = None;
        inner.opened_at = None;
        inner.trial_in_flight = false;
    }

    fn on_success(&self, trial: bool) {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => inner.consecutive_failures = 0,
            BreakerState::HalfOpen if trial => {
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                inner.trial_in_flight = false;
                self.transition(&mut inner, BreakerState::Closed);
            }
            // Late answer from a call admitted before the circuit opened.
            BreakerState::HalfOpen | BreakerState::Open => {}
        }
    }

    fn on_failure(&self, trial: bool) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        inner.last_failure_at = Some(now);
        match inner.state {
            BreakerState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    inner.opened_at = Some(now);
                    self.transition(&mut inner, BreakerState::Open);
                }
            }
            BreakerState::HalfOpen if trial => {
                inner.consecutive_failures += 1;
                inner.opened_at = Some(now);
                inner.trial_in_flight = false;
                self.transition(&mut inner, BreakerState::Open);
            }
            BreakerState::HalfOpen | BreakerState::Open => {}
        }
    }

    fn release_trial(&self) {
        let mut inner = self.inner.lock();
        if inner.state == BreakerState::HalfOpen {
            inner.trial_in_flight = false;
        }
    }

    fn transition(&self, inner: &mut BreakerInner, to: BreakerState) {
        let from = inner.state;
        if from == to {
            return;
        }
        inner.state = to;

        match to {
            BreakerState::Open => tracing::warn!(
                dependency = %self.name,
                %from,
                failures = inner.consecutive_failures,
                cool_down_secs = self.config.open_duration.as_secs(),
                "circuit breaker opened"
            ),
            _ => tracing::info!(dependency = %self.name, %from, %to, "circuit breaker transition"),
        }
        metrics::counter!(
            "circuit_breaker_transitions_total",
            "dependency" => self.name.clone(),
            "to" => to.as_str()
        )
        .increment(1);
    }
}

/// Permission to make one call through a breaker.
///
/// The outcome must be reported with [`record_success`](Self::record_success)
/// or [`record_failure`](Self::record_failure). A trial permit dropped without
/// an outcome frees the half-open slot so the next call can probe again.
#[derive(Debug)]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            trial,
            settled: false,
        }
    }

    /// Returns true if this permit is the half-open trial call.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// Reports that the dependency answered.
    pub fn record_success(mut self) {
        self.settled = true;
        self.breaker.on_success(self.trial);
    }

    /// Reports a connectivity failure.
    pub fn record_failure(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.trial);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.release_trial();
        }
    }
}
