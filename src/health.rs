//! Health reporter: a pure read of the database uplink state.

use tokio::sync::watch;

use crate::uplink::ConnectionState;

/// Read-only view of a supervisor's connection state.
///
/// Never connects and never mutates anything; `is_ready` is a snapshot
/// read consumed by the external readiness probe.
#[derive(Debug, Clone)]
pub struct HealthReporter {
    state_rx: watch::Receiver<ConnectionState>,
}

impl HealthReporter {
    /// Creates a reporter observing the given state channel.
    #[must_use]
    pub fn new(state_rx: watch::Receiver<ConnectionState>) -> Self {
        Self { state_rx }
    }

    /// Returns `true` when the observed uplink is [`ConnectionState::Ready`].
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state_rx.borrow().is_ready()
    }
}
