//! Connection supervisor: owns one logical connection and its queue.
//!
//! [`Supervisor::spawn`] starts a single tokio task that drives the
//! connect → initialize → drain cycle for one [`Sink`] and never returns
//! under normal operation. Callers hold a cheap, cloneable
//! [`UplinkHandle`] and interact only through [`UplinkHandle::enqueue`]
//! and [`UplinkHandle::state`] — neither can fail or block.
//!
//! All state transitions and queue mutation happen on the supervisor task,
//! so the state machine needs no locks; the state is published through a
//! `watch` channel for concurrent readers.

use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use super::queue::DeliveryQueue;
use super::state::ConnectionState;
use crate::error::SinkError;
use crate::sink::Sink;

/// Caller-side handle to a running supervisor.
///
/// Cloning is cheap; every clone feeds the same queue and observes the
/// same state.
pub struct UplinkHandle<U> {
    unit_tx: mpsc::UnboundedSender<U>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl<U> Clone for UplinkHandle<U> {
    fn clone(&self) -> Self {
        Self {
            unit_tx: self.unit_tx.clone(),
            state_rx: self.state_rx.clone(),
        }
    }
}

impl<U> fmt::Debug for UplinkHandle<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UplinkHandle")
            .field("state", &*self.state_rx.borrow())
            .finish()
    }
}

impl<U> UplinkHandle<U> {
    /// Appends a unit to the delivery queue.
    ///
    /// Always succeeds and never blocks, in every connection state. If the
    /// supervisor has halted on a fatal error the unit is silently dropped;
    /// failures are never surfaced through this contract.
    pub fn enqueue(&self, unit: U) {
        let _ = self.unit_tx.send(unit);
    }

    /// Returns a snapshot of the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Returns `true` when the connection is [`ConnectionState::Ready`].
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Returns a watch receiver for observing state transitions.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Builds a handle with no supervisor behind it, pinned to `state`.
    ///
    /// Enqueued units land in the returned receiver; the returned sender
    /// flips the observed state. Lets handler and shipper tests run
    /// without spawning supervisors.
    #[cfg(test)]
    pub(crate) fn detached(
        state: ConnectionState,
    ) -> (
        Self,
        mpsc::UnboundedReceiver<U>,
        watch::Sender<ConnectionState>,
    ) {
        let (unit_tx, unit_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(state);
        (Self { unit_tx, state_rx }, unit_rx, state_tx)
    }
}

/// Why a ready session ended.
enum SessionEnd {
    /// A sink operation failed; the error decides retry vs halt.
    Failed(SinkError),
    /// Every handle was dropped; no more units can ever arrive.
    Closed,
}

/// Single-instance state machine maintaining one logical connection.
///
/// There is no separate `start`: spawning is starting, and because the
/// supervisor owns the sink exclusively, a second concurrent connect
/// attempt cannot exist by construction.
pub struct Supervisor<S: Sink> {
    sink: S,
    queue: DeliveryQueue<S::Unit>,
    unit_rx: mpsc::UnboundedReceiver<S::Unit>,
    state_tx: watch::Sender<ConnectionState>,
    retry_delay: Duration,
}

impl<S: Sink> fmt::Debug for Supervisor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("sink", &self.sink.name())
            .field("queued", &self.queue.len())
            .field("state", &*self.state_tx.borrow())
            .finish()
    }
}

impl<S: Sink> Supervisor<S> {
    /// Spawns the supervisor task and returns the caller handle.
    ///
    /// The task lives until a fatal error or until all handles are
    /// dropped; it retries transient failures forever on the fixed
    /// `retry_delay` with no backoff growth and no attempt cap.
    pub fn spawn(sink: S, retry_delay: Duration) -> UplinkHandle<S::Unit> {
        let (unit_tx, unit_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let supervisor = Self {
            sink,
            queue: DeliveryQueue::new(),
            unit_rx,
            state_tx,
            retry_delay,
        };
        tokio::spawn(supervisor.run());

        UplinkHandle { unit_tx, state_rx }
    }

    fn transition(&self, next: ConnectionState) {
        tracing::debug!(sink = self.sink.name(), state = ?next, "state transition");
        self.state_tx.send_replace(next);
    }

    /// Surfaces a fatal error once and leaves the state `Disconnected`.
    ///
    /// Restart-or-crash policy belongs to the external process supervisor;
    /// retrying here would mask unrecoverable configuration mistakes.
    fn halt(&self, err: &SinkError) {
        tracing::error!(
            sink = self.sink.name(),
            error = %err,
            "fatal uplink error; supervisor halted"
        );
        self.transition(ConnectionState::Disconnected);
    }

    async fn run(mut self) {
        loop {
            self.transition(ConnectionState::Connecting);
            if let Err(err) = self.sink.connect().await {
                if err.is_fatal() {
                    self.halt(&err);
                    return;
                }
                tracing::error!(
                    sink = self.sink.name(),
                    error = %err,
                    retry_in_secs = self.retry_delay.as_secs(),
                    "connect failed; retrying"
                );
                self.transition(ConnectionState::Disconnected);
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }
            self.transition(ConnectionState::Connected);
            tracing::info!(sink = self.sink.name(), "connected");

            match self.sink.initialize().await {
                Ok(()) => {}
                Err(err) if err.is_fatal() => {
                    self.halt(&err);
                    return;
                }
                Err(err) => {
                    tracing::error!(
                        sink = self.sink.name(),
                        error = %err,
                        "session initialization failed; reconnecting"
                    );
                    self.transition(ConnectionState::Disconnected);
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
            }
            self.transition(ConnectionState::Ready);

            match self.run_session().await {
                SessionEnd::Closed => {
                    self.transition(ConnectionState::Disconnected);
                    tracing::debug!(sink = self.sink.name(), "all handles dropped; exiting");
                    return;
                }
                SessionEnd::Failed(err) if err.is_fatal() => {
                    self.halt(&err);
                    return;
                }
                SessionEnd::Failed(err) => {
                    tracing::error!(
                        sink = self.sink.name(),
                        error = %err,
                        queued = self.queue.len(),
                        retry_in_secs = self.retry_delay.as_secs(),
                        "connection lost; retrying"
                    );
                    self.transition(ConnectionState::Disconnected);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// Drains the queue while `Ready`, then waits for more units.
    ///
    /// Strictly one unit in flight at a time; the head is popped only after
    /// its transmission completes, so a mid-flight drop leaves it (and
    /// everything behind it) queued for the next session.
    ///
    /// While idle, the unit channel is raced against the sink's link watch
    /// so an unexpected close flips the state even when nothing is being
    /// transmitted.
    async fn run_session(&mut self) -> SessionEnd {
        loop {
            // Pull everything that arrived while disconnected, in order.
            while let Ok(unit) = self.unit_rx.try_recv() {
                self.queue.push_back(unit);
            }

            while let Some(unit) = self.queue.front() {
                let sent = self.sink.send(unit).await;
                match sent {
                    Ok(()) => {
                        self.queue.pop_front();
                    }
                    Err(err) => return SessionEnd::Failed(err),
                }
            }

            tokio::select! {
                maybe_unit = self.unit_rx.recv() => match maybe_unit {
                    Some(unit) => self.queue.push_back(unit),
                    None => return SessionEnd::Closed,
                },
                err = self.sink.watch_link() => return SessionEnd::Failed(err),
            }
        }
    }
}
