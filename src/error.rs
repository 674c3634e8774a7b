//! Sink error type with explicit retryable/fatal classification.
//!
//! Every failure crosses the sink boundary as a [`SinkError`] whose kind is
//! decided once, by the sink that produced it. The supervisor never inspects
//! underlying driver errors; it only branches on [`SinkError::is_fatal`].

/// Error produced by a [`Sink`](crate::sink::Sink) operation.
///
/// The two variants encode the recovery policy:
///
/// | Variant          | Supervisor behavior                              |
/// |------------------|--------------------------------------------------|
/// | `ConnectionLost` | mark `Disconnected`, retry after the fixed delay |
/// | `Fatal`          | surface once, halt; state stays `Disconnected`   |
///
/// Retrying a `Fatal` error would mask unrecoverable configuration mistakes
/// such as bad credentials, so those are never fed back into the retry loop.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The endpoint was unreachable or the link dropped mid-session.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// A non-connectivity failure (protocol, authentication, malformed
    /// configuration). Not retried.
    #[error("fatal sink error: {0}")]
    Fatal(String),
}

impl SinkError {
    /// Returns `true` if this error must not be retried.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Classifies a raw I/O error.
    ///
    /// Every socket-level failure is connectivity by definition: refused,
    /// reset, timed out and torn-down links all land in `ConnectionLost`.
    #[must_use]
    pub fn from_io(err: &std::io::Error) -> Self {
        Self::ConnectionLost(err.to_string())
    }
}
