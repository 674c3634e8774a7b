//! # medlink-uplink
//!
//! Resilient outbound connection supervision for the MedLink telehealth
//! backend. The backend talks to two remote endpoints whose availability
//! is not guaranteed — the MySQL database and a line-oriented JSON log
//! ingester — and both are managed by the same supervisor machinery:
//! maintain one logical connection, queue pending units while down, and
//! flush them in order once the link is ready again.
//!
//! ## Architecture
//!
//! ```text
//! Route handlers / logging calls
//!     │  enqueue (never blocks, never fails)
//!     ├── UplinkHandle<SqlStatement> ──► Supervisor ──► MySqlSink
//!     │                                   │ connect / initialize / drain
//!     ├── UplinkHandle<LogRecord>    ──► Supervisor ──► TcpLogSink
//!     │
//!     └── GET /health ◄── HealthReporter (watch on database uplink state)
//! ```
//!
//! Transient failures retry forever on a fixed delay; non-connectivity
//! failures halt the supervisor and are surfaced once. Classification
//! happens inside each sink, never in the supervisor.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod health;
pub mod shipper;
pub mod sink;
pub mod uplink;
