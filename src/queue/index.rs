/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Occupancy bookkeeping for the ring
//!
//! The logically occupied slots are `front, front + 1, .., front + size - 1`, modulo the capacity.
//! `rear` is the next slot to be written and `front` the next slot to be read.

/// The slot claimed by a producer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WriteClaim {
    /// The index of the slot to write into
    pub index: usize,
    /// Whether the oldest item was evicted to make room
    pub evicted: bool,
}

/// The front, rear and size counters of a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexState {
    front: usize,
    rear: usize,
    size: usize,
    capacity: usize,
}

impl IndexState {
    /// Creates the state for an empty ring
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            front: 0,
            rear: 0,
            size: 0,
            capacity,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.size == self.capacity
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        if index + 1 == self.capacity { 0 } else { index + 1 }
    }

    /// Claims the slot for the next write
    ///
    /// When full, the write is rejected unless `overwrite` is set,
    /// in which case the oldest item is evicted and the size stays at capacity.
    pub fn claim_write(&mut self, overwrite: bool) -> Option<WriteClaim> {
        let index = self.rear;
        let evicted = self.is_full();
        if evicted {
            if !overwrite {
                return None;
            }
            self.front = self.next(self.front);
        } else {
            self.size += 1;
        }
        self.rear = self.next(self.rear);
        Some(WriteClaim { index, evicted })
    }

    /// Claims the slot holding the oldest item
    pub fn claim_read(&mut self) -> Option<usize> {
        if self.size == 0 {
            return None;
        }
        self.size -= 1;
        let index = self.front;
        self.front = self.next(self.front);
        Some(index)
    }
}
