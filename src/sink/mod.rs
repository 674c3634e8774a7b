//! Sink abstraction: a destination for one unit of work at a time.
//!
//! The supervisor is written against this trait and knows nothing about
//! MySQL or sockets. Two concrete sinks exist: [`MySqlSink`] for SQL
//! statements and [`TcpLogSink`] for newline-delimited JSON log records.

pub mod mysql;
pub mod tcp;

pub use mysql::{MySqlSink, SqlStatement};
pub use tcp::TcpLogSink;

use crate::error::SinkError;

/// Abstract destination capable of accepting one unit of work for
/// transmission.
///
/// A sink owns its raw connection and is driven exclusively by one
/// [`Supervisor`](crate::uplink::Supervisor):
///
/// 1. [`connect`](Sink::connect) establishes (or re-establishes) the raw
///    link;
/// 2. [`initialize`](Sink::initialize) runs one-time session setup on the
///    fresh link — the link is not considered ready until it returns `Ok`;
/// 3. [`send`](Sink::send) transmits exactly one unit and completes only
///    once the unit has been handed to the transport.
///
/// Implementations classify every failure into a [`SinkError`] kind at
/// this boundary; the supervisor never looks at driver errors.
pub trait Sink: Send + 'static {
    /// The unit of work this sink transmits.
    type Unit: Send + 'static;

    /// Short name used in log lines (`"mysql"`, `"log-shipper"`).
    fn name(&self) -> &'static str;

    /// Establishes the raw connection, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a classified [`SinkError`] when the endpoint cannot be
    /// reached or rejects the session.
    fn connect(&mut self) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Runs one-time session setup on a freshly connected link.
    ///
    /// The default implementation does nothing; sinks without setup
    /// (the log shipper) are ready as soon as the socket is open.
    ///
    /// # Errors
    ///
    /// Returns a classified [`SinkError`]; a non-fatal error forces a
    /// reconnect cycle.
    fn initialize(&mut self) -> impl Future<Output = Result<(), SinkError>> + Send {
        async { Ok(()) }
    }

    /// Transmits one unit over the live connection.
    ///
    /// # Errors
    ///
    /// Returns a classified [`SinkError`]; on `ConnectionLost` the unit is
    /// retained by the caller and retransmitted after reconnect.
    fn send(&mut self, unit: &Self::Unit) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Resolves when the live link fails.
    ///
    /// The supervisor races this against the unit channel while the queue
    /// is idle, so an unexpected close is observed without waiting for the
    /// next `send`. The default never resolves, for transports with no way
    /// to observe a silent link.
    fn watch_link(&mut self) -> impl Future<Output = SinkError> + Send {
        std::future::pending()
    }
}
