//! Circuit breaker with the classic three states: Closed (normal operation),
//! Open (failing fast), and HalfOpen (probing recovery).
//!
//! State lives in an atomic; counters live behind a parking_lot mutex that is
//! only held for short synchronous sections, never across the protected
//! operation's await point.

use crate::resilience::{BreakerMetrics, CircuitBreakerConfig};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitState {
    /// Normal operation, calls pass through
    Closed = 0,
    /// Failing fast, calls are rejected without executing
    Open = 1,
    /// Probing recovery with a limited number of calls
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Open,
        }
    }
}

/// Errors produced by a protected call
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open; the operation was not executed
    #[error("Circuit breaker is open for {component}")]
    CircuitOpen { component: String },

    /// The operation ran and failed; the failure was recorded
    #[error("Operation failed: {0}")]
    OperationFailed(E),
}

/// Consecutive-failure circuit breaker protecting a single component.
#[derive(Debug)]
pub struct CircuitBreaker {
    component: String,
    state: AtomicU8,
    config: CircuitBreakerConfig,
    counters: Mutex<Counters>,
}

#[derive(Debug)]
struct Counters {
    total_calls: u64,
    success_count: u64,
    failure_count: u64,
    consecutive_failures: u64,
    half_open_successes: u64,
    opened_at: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(component: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let component = component.into();
        debug!(
            component = %component,
            failure_threshold = config.failure_threshold,
            cooldown_ms = config.cooldown.as_millis() as u64,
            "🛡️ Circuit breaker initialized"
        );

        Self {
            component,
            state: AtomicU8::new(CircuitState::Closed as u8),
            config,
            counters: Mutex::new(Counters {
                total_calls: 0,
                success_count: 0,
                failure_count: 0,
                consecutive_failures: 0,
                half_open_successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Current circuit state
    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Component name this breaker protects
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Number of consecutive failures that opens the circuit
    pub fn failure_threshold(&self) -> u32 {
        self.config.failure_threshold
    }

    /// Execute an operation under circuit breaker protection
    pub async fn call<F, T, E, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.allow_call() {
            return Err(CircuitBreakerError::CircuitOpen {
                component: self.component.clone(),
            });
        }

        let result = operation().await;

        match &result {
            Ok(_) => self.record_success(),
            Err(_) => self.record_failure(),
        }

        result.map_err(CircuitBreakerError::OperationFailed)
    }

    fn allow_call(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let mut counters = self.counters.lock();
                let cooled_down = counters
                    .opened_at
                    .map(|t| t.elapsed() >= self.config.cooldown)
                    .unwrap_or(true);
                if cooled_down {
                    counters.half_open_successes = 0;
                    drop(counters);
                    self.state
                        .store(CircuitState::HalfOpen as u8, Ordering::Release);
                    info!(component = %self.component, "🟡 Circuit breaker half-open (probing recovery)");
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self) {
        let mut counters = self.counters.lock();
        counters.total_calls += 1;
        counters.success_count += 1;
        counters.consecutive_failures = 0;

        if self.state() == CircuitState::HalfOpen {
            counters.half_open_successes += 1;
            if counters.half_open_successes >= u64::from(self.config.success_threshold) {
                counters.opened_at = None;
                self.state
                    .store(CircuitState::Closed as u8, Ordering::Release);
                info!(
                    component = %self.component,
                    total_calls = counters.total_calls,
                    "🟢 Circuit breaker closed (recovered)"
                );
            }
        }
    }

    fn record_failure(&self) {
        let mut counters = self.counters.lock();
        counters.total_calls += 1;
        counters.failure_count += 1;
        counters.consecutive_failures += 1;

        let should_open = match self.state() {
            CircuitState::Closed => {
                counters.consecutive_failures >= u64::from(self.config.failure_threshold)
            }
            // Any failure during a recovery probe reopens immediately
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };

        if should_open {
            counters.opened_at = Some(Instant::now());
            counters.half_open_successes = 0;
            self.state.store(CircuitState::Open as u8, Ordering::Release);
            warn!(
                component = %self.component,
                consecutive_failures = counters.consecutive_failures,
                failure_threshold = self.config.failure_threshold,
                "🔴 Circuit breaker opened (failing fast)"
            );
        }
    }

    /// Snapshot of current metrics
    pub fn metrics(&self) -> BreakerMetrics {
        let counters = self.counters.lock();
        let failure_rate = if counters.total_calls > 0 {
            counters.failure_count as f64 / counters.total_calls as f64
        } else {
            0.0
        };
        BreakerMetrics {
            total_calls: counters.total_calls,
            success_count: counters.success_count,
            failure_count: counters.failure_count,
            consecutive_failures: counters.consecutive_failures,
            half_open_successes: counters.half_open_successes,
            current_state: self.state(),
            failure_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn config(failure_threshold: u32, cooldown_ms: u64) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold,
            cooldown: Duration::from_millis(cooldown_ms),
            success_threshold: 1,
        }
    }

    #[tokio::test]
    async fn test_normal_operation() {
        let breaker = CircuitBreaker::new("classifier", config(3, 100));
        assert_eq!(breaker.state(), CircuitState::Closed);

        let result = breaker.call(|| async { Ok::<_, String>("positive") }).await;
        assert!(result.is_ok());

        let metrics = breaker.metrics();
        assert_eq!(metrics.total_calls, 1);
        assert_eq!(metrics.success_count, 1);
        assert_eq!(metrics.failure_count, 0);
    }

    #[tokio::test]
    async fn test_opens_after_consecutive_failures() {
        let breaker = CircuitBreaker::new("classifier", config(2, 100));

        let _ = breaker.call(|| async { Err::<(), _>("inference error") }).await;
        assert_eq!(breaker.state(), CircuitState::Closed);

        let _ = breaker.call(|| async { Err::<(), _>("inference error") }).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        // Next call fails fast without executing
        let result = breaker
            .call(|| async { Ok::<_, String>("should not run") })
            .await;
        assert!(matches!(
            result,
            Err(CircuitBreakerError::CircuitOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_success_resets_consecutive_count() {
        let breaker = CircuitBreaker::new("classifier", config(2, 100));

        let _ = breaker.call(|| async { Err::<(), _>("error") }).await;
        let _ = breaker.call(|| async { Ok::<_, String>(()) }).await;
        let _ = breaker.call(|| async { Err::<(), _>("error") }).await;

        // Never two in a row, circuit stays closed
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_recovery_after_cooldown() {
        let breaker = CircuitBreaker::new("classifier", config(1, 20));

        let _ = breaker.call(|| async { Err::<(), _>("error") }).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        sleep(Duration::from_millis(30)).await;

        let result = breaker.call(|| async { Ok::<_, String>(()) }).await;
        assert!(result.is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let breaker = CircuitBreaker::new("classifier", config(1, 20));

        let _ = breaker.call(|| async { Err::<(), _>("error") }).await;
        sleep(Duration::from_millis(30)).await;

        let _ = breaker.call(|| async { Err::<(), _>("still failing") }).await;
        assert_eq!(breaker.state(), CircuitState::Open);
    }
}
