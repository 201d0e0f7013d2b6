//! Event queues
//!
//! Effects and widgets raise notifications during a frame; owners drain them
//! at a point of their choosing instead of registering callbacks.

/// A queue for events of a single type.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Drain all events in send order
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_send_order() {
        let mut queue = EventQueue::new();
        queue.send(1);
        queue.send(2);
        assert_eq!(queue.len(), 2);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(queue.is_empty());
    }
}
