// rfidr-rs/rfidr/src/utils/timeout.rs
//! Wait budgets for event latches.

use std::time::Duration;

/// Longest a radio run or ADC conversion may take before the wait is
/// reported as a timeout.
pub const DEFAULT_EVENT_TIMEOUT_MS: u64 = 2000;

/// Budget for the host to read back a state notification.
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 5000;

pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_to_duration() {
        assert_eq!(ms(500).as_millis(), 500);
    }

    #[test]
    fn ack_budget_outlasts_event_budget() {
        assert!(ms(DEFAULT_ACK_TIMEOUT_MS) >= ms(DEFAULT_EVENT_TIMEOUT_MS));
    }
}
