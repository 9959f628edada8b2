use std::time::Duration;

/// Circuit breaker thresholds.
///
/// Defaults match a slow model-inference classifier: a handful of consecutive
/// failures opens the circuit, a short cool-down follows, then a couple of
/// successful probes close it again.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open before probing recovery
    pub cooldown: Duration,
    /// Successful half-open probes required to close the circuit
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(10),
            success_threshold: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CircuitBreakerConfig::default();
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.cooldown, Duration::from_secs(10));
        assert_eq!(config.success_threshold, 2);
    }
}
