//! Resilient connection supervision: state machine, queue and handles.
//!
//! One [`Supervisor`] per outbound endpoint. The database uplink and the
//! log-shipping uplink are both instances of this module over different
//! [`Sink`](crate::sink::Sink) implementations.

pub mod queue;
pub mod state;
pub mod supervisor;

pub use queue::DeliveryQueue;
pub use state::ConnectionState;
pub use supervisor::{Supervisor, UplinkHandle};
