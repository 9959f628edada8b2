use crate::resilience::CircuitState;
use serde::{Deserialize, Serialize};

/// Snapshot of circuit breaker activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerMetrics {
    pub total_calls: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub consecutive_failures: u64,
    pub half_open_successes: u64,
    pub current_state: CircuitState,
    pub failure_rate: f64,
}

impl BreakerMetrics {
    pub fn new() -> Self {
        Self {
            total_calls: 0,
            success_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
            half_open_successes: 0,
            current_state: CircuitState::Closed,
            failure_rate: 0.0,
        }
    }
}

impl Default for BreakerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
