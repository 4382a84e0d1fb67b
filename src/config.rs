//! Timing and capacity settings for the dashboard.

use std::time::Duration;

/// How often a simulated transaction is added to the log.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(5000);
/// How long the refresh control stays disabled after a refresh.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1000);
/// How many transactions the log keeps.
pub const DEFAULT_TRANSACTION_LOG_CAPACITY: usize = 10;

/// Settings that control the dashboard's timers and transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    /// The period of the timer that adds simulated transactions.
    pub tick_interval: Duration,
    /// The delay before the refresh control is re-enabled.
    pub refresh_delay: Duration,
    /// The maximum number of transactions shown in the log.
    pub transaction_log_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            refresh_delay: DEFAULT_REFRESH_DELAY,
            transaction_log_capacity: DEFAULT_TRANSACTION_LOG_CAPACITY,
        }
    }
}
