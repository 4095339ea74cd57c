//! # Global configuration.
//!
//! Provides [`Config`] centralized settings for a [`SignalHub`](crate::SignalHub)
//! and the countdown timers it creates.
//!
//! ## Sentinel values
//! - `notification_interval = 0s` → clamped to 1ms (a repeating timer needs a period)
//! - `notification_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::application::AppState;

/// Smallest tick period a countdown timer will schedule.
pub(crate) const MIN_NOTIFICATION_INTERVAL: Duration = Duration::from_millis(1);

/// Global configuration for the signal hub.
///
/// ## Field semantics
/// - `notification_interval`: Countdown tick period (`0s` is clamped to 1ms)
/// - `notification_capacity`: Notification center ring buffer size (min 1)
/// - `initial_app_state`: Lifecycle state assumed before the first notification
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Period between two countdown ticks.
    ///
    /// Used by [`SignalHub::countdown_timer`](crate::SignalHub::countdown_timer) and
    /// [`CountdownTimer::from_config`](crate::CountdownTimer::from_config).
    pub notification_interval: Duration,

    /// Capacity of the notification center broadcast ring buffer.
    ///
    /// A dispatch loop that lags behind more than `notification_capacity`
    /// notifications skips the oldest ones and logs the gap.
    pub notification_capacity: usize,

    /// Lifecycle state reported by the application handler until the first
    /// lifecycle notification arrives.
    pub initial_app_state: AppState,
}

impl Config {
    /// Returns the countdown tick period clamped to a minimum of 1ms.
    #[inline]
    pub fn notification_interval_clamped(&self) -> Duration {
        self.notification_interval.max(MIN_NOTIFICATION_INTERVAL)
    }

    /// Returns the notification center capacity clamped to a minimum of 1.
    #[inline]
    pub fn notification_capacity_clamped(&self) -> usize {
        self.notification_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `notification_interval = 1s`
    /// - `notification_capacity = 1024`
    /// - `initial_app_state = AppState::Inactive` (launch state before activation)
    fn default() -> Self {
        Self {
            notification_interval: Duration::from_secs(1),
            notification_capacity: 1024,
            initial_app_state: AppState::Inactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_clamped() {
        let cfg = Config {
            notification_interval: Duration::ZERO,
            notification_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.notification_interval_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.notification_capacity_clamped(), 1);
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.notification_interval_clamped(), Duration::from_secs(1));
        assert_eq!(cfg.notification_capacity_clamped(), 1024);
        assert_eq!(cfg.initial_app_state, AppState::Inactive);
    }
}
