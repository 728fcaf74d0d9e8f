/*!
    Fixed-capacity FIFO used between pipeline stages.
*/

use std::collections::VecDeque;

use crate::{Error, Result};

/**
    A FIFO queue that never grows past its capacity.

    Pushing into a full queue hands the item back instead of growing, so
    callers must drain before they can produce more.
*/
#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /**
        Create an empty queue. A capacity of zero is rejected.
    */
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_config("queue capacity must be at least 1"));
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /**
        Append an item, or return it if the queue is full.
    */
    pub fn push(&mut self, item: T) -> std::result::Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push_back(item);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /**
        True while at least one more item fits.
    */
    pub fn has_room(&self) -> bool {
        !self.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}
