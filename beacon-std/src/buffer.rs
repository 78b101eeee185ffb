//! FIFO of messages submitted while the gate is closed.

use crate::options::OverflowPolicy;
use beacon_core::Message;
use std::{collections::VecDeque, sync::Arc};

pub(crate) struct MessageBuffer {
    queue: VecDeque<Arc<Message>>,
    capacity: Option<usize>,
    overflow: OverflowPolicy,
}

impl MessageBuffer {
    pub(crate) fn new(capacity: Option<usize>, overflow: OverflowPolicy) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity,
            overflow,
        }
    }

    /// Append a message, returning the one discarded by the overflow policy.
    pub(crate) fn push(&mut self, message: Arc<Message>) -> Option<Arc<Message>> {
        let Some(capacity) = self.capacity else {
            self.queue.push_back(message);
            return None;
        };
        if capacity == 0 {
            return Some(message);
        }
        if self.queue.len() < capacity {
            self.queue.push_back(message);
            return None;
        }
        match self.overflow {
            OverflowPolicy::DropNewest => Some(message),
            OverflowPolicy::DropOldest => {
                let evicted = self.queue.pop_front();
                self.queue.push_back(message);
                evicted
            }
        }
    }

    /// Take every buffered message in arrival order.
    pub(crate) fn drain(&mut self) -> Vec<Arc<Message>> {
        self.queue.drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}
