use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::signal_hub::SignalHub;
use crate::{
    application::{ApplicationHandler, DayChangeHandler},
    config::Config,
    error::ReachabilityError,
    notifications::NotificationCenter,
    reachability::{Reachability, ReachabilityMonitor},
    scheduling::TokioScheduler,
};

/// Builder for constructing a [`SignalHub`] with optional components.
pub struct SignalHubBuilder {
    cfg: Config,
    reachability: Option<Arc<dyn Reachability>>,
}

impl SignalHubBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            reachability: None,
        }
    }

    /// Attaches a reachability primitive.
    ///
    /// The hub wraps it in a [`ReachabilityMonitor`]; without one,
    /// [`SignalHub::reachability`] returns `None`.
    pub fn with_reachability(mut self, primitive: Arc<dyn Reachability>) -> Self {
        self.reachability = Some(primitive);
        self
    }

    /// Builds the hub and spawns its dispatch loop.
    ///
    /// Initializes:
    /// - notification center (capacity from config)
    /// - application and day-change handlers
    /// - reachability monitor (if a primitive was attached)
    /// - shared tokio scheduler for countdown timers
    ///
    /// # Errors
    /// Returns the primitive's error if its notifier refuses to start.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn build(self) -> Result<Arc<SignalHub>, ReachabilityError> {
        let center = NotificationCenter::new(self.cfg.notification_capacity_clamped());
        let application = Arc::new(ApplicationHandler::new(self.cfg.initial_app_state));
        let day_change = Arc::new(DayChangeHandler::new());

        let reachability = self
            .reachability
            .map(ReachabilityMonitor::new)
            .transpose()?;

        let hub = Arc::new(SignalHub::new_internal(
            self.cfg,
            center,
            application,
            day_change,
            reachability,
            Arc::new(TokioScheduler::new()),
            CancellationToken::new(),
        ));
        hub.dispatch_listener();
        tracing::info!(
            reachability = hub.reachability().is_some(),
            "signal hub started"
        );
        Ok(hub)
    }
}
