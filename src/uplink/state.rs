//! Connection state machine states.

/// Lifecycle state of one logical connection.
///
/// Exactly one state holds at any time; transitions are performed only by
/// the owning supervisor task and published through a `watch` channel, so
/// readers always observe a consistent snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No live link; a retry may be pending.
    #[default]
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// Raw link open; session setup not yet complete.
    Connected,
    /// Raw link open and session setup complete; units may flow.
    Ready,
}

impl ConnectionState {
    /// Returns `true` only for [`ConnectionState::Ready`].
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ready_reports_ready() {
        assert!(ConnectionState::Ready.is_ready());
        assert!(!ConnectionState::Disconnected.is_ready());
        assert!(!ConnectionState::Connecting.is_ready());
        assert!(!ConnectionState::Connected.is_ready());
    }

    #[test]
    fn default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }
}
