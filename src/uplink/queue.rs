//! Ordered buffer of pending units awaiting transmission.

use std::collections::VecDeque;

/// FIFO buffer of units not yet delivered to the sink.
///
/// Owned exclusively by the supervisor task; nothing else touches it.
/// Growth is unbounded: under sustained disconnection, memory grows
/// linearly with the enqueue rate. That trade-off is documented service
/// behavior, not an accident (see DESIGN.md).
#[derive(Debug)]
pub struct DeliveryQueue<U> {
    units: VecDeque<U>,
}

impl<U> DeliveryQueue<U> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: VecDeque::new(),
        }
    }

    /// Appends a unit at the tail. Never fails, never reorders.
    pub fn push_back(&mut self, unit: U) {
        self.units.push_back(unit);
    }

    /// Returns the unit at the head without removing it.
    ///
    /// The head stays queued until its transmission is acknowledged, so a
    /// mid-flight connection drop leaves it in place for the next drain.
    #[must_use]
    pub fn front(&self) -> Option<&U> {
        self.units.front()
    }

    /// Removes and returns the unit at the head.
    pub fn pop_front(&mut self) -> Option<U> {
        self.units.pop_front()
    }

    /// Returns the number of pending units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if no units are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<U> Default for DeliveryQueue<U> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_fifo_order() {
        let mut queue = DeliveryQueue::new();
        queue.push_back("a");
        queue.push_back("b");
        queue.push_back("c");

        assert_eq!(queue.pop_front(), Some("a"));
        assert_eq!(queue.pop_front(), Some("b"));
        assert_eq!(queue.pop_front(), Some("c"));
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn front_does_not_remove() {
        let mut queue = DeliveryQueue::new();
        queue.push_back(1);

        assert_eq!(queue.front(), Some(&1));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_front(), Some(1));
        assert!(queue.is_empty());
    }
}
