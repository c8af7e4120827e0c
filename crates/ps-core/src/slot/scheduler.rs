use std::collections::VecDeque;

use crate::ids::SlotIndex;

/// Bounded FIFO of slots waiting for a full fetch.
///
/// Enqueueing into a full queue is a no-op; the producer simply retries on a
/// later tick.
#[derive(Debug)]
pub struct FetchScheduler {
    queue: VecDeque<SlotIndex>,
    capacity: usize,
}

impl FetchScheduler {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns `false` when the queue is full.
    pub fn try_enqueue(&mut self, slot: SlotIndex) -> bool {
        if self.queue.len() >= self.capacity {
            return false;
        }
        self.queue.push_back(slot);
        true
    }

    pub fn pop(&mut self) -> Option<SlotIndex> {
        self.queue.pop_front()
    }

    /// Discards everything queued and returns how many items were dropped.
    pub fn drain(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
