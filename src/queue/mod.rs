/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Synchronized ring queue.
//! The queue is a fixed-capacity ring buffer where every operation goes through two levels of locking:
//! * the index lock guards the occupancy bookkeeping (front, rear and size),
//! * each slot has its own lock guarding the transfer of the data in and out of it.
//!
//! An operation first takes the index lock, claims a slot and locks it,
//! then releases the index lock and only moves the data while holding the slot lock.
//! The slot lock is acquired within the index critical section, so that the order in which slots are locked
//! always matches the order in which they were claimed.
//! A consumer can therefore never observe a partially written item.

mod index;
mod slots;

use core::cell::UnsafeCell;
use core::fmt::Debug;
use core::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use self::index::IndexState;
use self::slots::Slots;
use crate::errors::{CapacityError, EnqueueError};
use crate::lock::{LockGuard, NoLock, RawLock, SpinLock};
use crate::trace::{debug, trace};

/// The behaviour of a queue when an item is enqueued while it is full
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverflowMode {
    /// The new item is rejected
    #[default]
    Reject,
    /// The oldest item is evicted to make room for the new one
    Overwrite,
}

impl OverflowMode {
    /// Gets whether this mode evicts the oldest item
    #[must_use]
    #[inline]
    pub fn is_overwrite(self) -> bool {
        matches!(self, Self::Overwrite)
    }
}

/// A fixed-capacity ring queue, synchronized by an index lock of type `I` and a lock of type `S` for each slot
pub struct RingQueue<T, S: RawLock = SpinLock, I: RawLock = SpinLock> {
    /// The storage, one lock per slot
    slots: Slots<T, S>,
    /// The lock guarding `index`
    index_lock: CachePadded<I>,
    /// The occupancy bookkeeping, only accessed while holding `index_lock`
    index: UnsafeCell<IndexState>,
    /// Mirror of the size for lock-free queries, written under `index_lock`
    len: CachePadded<AtomicUsize>,
    mode: OverflowMode,
}

/// A ring queue that can be shared between threads, using spin locks
pub type SyncRingQueue<T> = RingQueue<T, SpinLock, SpinLock>;

/// A ring queue without any synchronization, for use on a single thread
pub type LocalRingQueue<T> = RingQueue<T, NoLock, NoLock>;

/// SAFETY: all accesses to `index` go through `index_lock` and all accesses to a slot content go through its lock.
/// Items are moved between threads, hence `T: Send`.
unsafe impl<T: Send, S: RawLock + Sync, I: RawLock + Sync> Sync for RingQueue<T, S, I> {}

impl<T, S: RawLock, I: RawLock> Debug for RingQueue<T, S, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<T, S: RawLock, I: RawLock> RingQueue<T, S, I> {
    /// Creates a queue that rejects new items when full
    ///
    /// # Errors
    ///
    /// Returns an error when `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        Self::with_mode(capacity, OverflowMode::default())
    }

    /// Creates a queue with the specified behaviour when full
    ///
    /// # Errors
    ///
    /// Returns an error when `capacity` is zero
    pub fn with_mode(capacity: usize, mode: OverflowMode) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError);
        }
        debug!(capacity, ?mode, "creating ring queue");
        Ok(Self {
            slots: Slots::new(capacity),
            index_lock: CachePadded::new(I::default()),
            index: UnsafeCell::new(IndexState::new(capacity)),
            len: CachePadded::new(AtomicUsize::new(0)),
            mode,
        })
    }

    /// Gets the capacity of the queue, fixed at creation
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Gets the behaviour of the queue when full
    #[must_use]
    #[inline]
    pub fn mode(&self) -> OverflowMode {
        self.mode
    }

    /// Gets the number of items in the queue
    ///
    /// This is a snapshot, other threads may change it right after.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Gets whether the queue is empty
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets whether the queue is full
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Runs `f` on the index state while holding the index lock
    #[inline]
    fn with_index<R>(&self, f: impl FnOnce(&mut IndexState) -> R) -> R {
        let _guard = LockGuard::acquire(&*self.index_lock);
        // SAFETY: the index lock is held
        let index = unsafe { &mut *self.index.get() };
        let result = f(&mut *index);
        self.len.store(index.size(), Ordering::Release);
        result
    }

    /// Attempts to push an item at the rear of the queue
    ///
    /// In [`OverflowMode::Overwrite`], this always succeeds and evicts the oldest item when full.
    ///
    /// # Errors
    ///
    /// Returns the item back when the queue is full and does not overwrite
    pub fn try_enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        let overwrite = self.mode.is_overwrite();
        let claimed = self.with_index(|index| {
            let claim = index.claim_write(overwrite)?;
            if claim.evicted {
                trace!(slot = claim.index, "evicting oldest item");
            }
            // lock the slot before releasing the index lock
            Some(self.slots.acquire(claim.index))
        });
        let Some(mut access) = claimed else {
            trace!(capacity = self.capacity(), "queue is full, rejecting item");
            return Err(EnqueueError(item));
        };
        let stale = access.replace(item);
        drop(access);
        // the stale item may run arbitrary code on drop, do it outside of the slot lock
        drop(stale);
        Ok(())
    }

    /// Pushes an item at the rear of the queue
    ///
    /// Returns `false` when the queue is full and does not overwrite, in which case the item is dropped.
    /// Use [`RingQueue::try_enqueue`] to get the item back instead.
    #[allow(clippy::must_use_candidate)]
    pub fn enqueue(&self, item: T) -> bool {
        self.try_enqueue(item).is_ok()
    }

    /// Pops the oldest item, if any
    #[must_use]
    pub fn dequeue(&self) -> Option<T> {
        let mut access = self.with_index(|index| {
            let target = index.claim_read()?;
            // lock the slot before releasing the index lock
            Some(self.slots.acquire(target))
        })?;
        let item = access.take();
        debug_assert!(item.is_some(), "claimed slot has no content");
        item
    }

    /// Pops the oldest item into `out`
    ///
    /// Returns `false` and leaves `out` untouched when the queue is empty.
    pub fn dequeue_into(&self, out: &mut T) -> bool {
        match self.dequeue() {
            Some(item) => {
                *out = item;
                true
            }
            None => false,
        }
    }

    /// Drops the oldest item from the queue, if any
    ///
    /// Only the bookkeeping is updated, the slot is not touched.
    /// The stale value is dropped when the slot is written again, or when the queue is dropped.
    /// Returns `false` when the queue is empty.
    #[allow(clippy::must_use_candidate)]
    pub fn discard(&self) -> bool {
        self.with_index(|index| index.claim_read().is_some())
    }

    /// Discards the items that are in the queue when it is called
    ///
    /// The number of items is sampled once, and at most that many items are discarded.
    /// Items concurrently pushed by other threads may remain after this returns.
    /// Returns the number of discarded items.
    #[allow(clippy::must_use_candidate)]
    pub fn clear(&self) -> usize {
        let count = self.len();
        let discarded = (0..count).take_while(|_| self.discard()).count();
        debug!(discarded, "cleared ring queue");
        discarded
    }
}

#[cfg(test)]
mod tests_send_sync {
    use super::{LocalRingQueue, SyncRingQueue};

    pub fn assert_send<T: Send>(_thing: &T) {}
    pub fn assert_sync<T: Sync>(_thing: &T) {}

    #[test]
    fn sync_queue_is_send_sync() {
        let queue = SyncRingQueue::<usize>::new(4).unwrap();
        assert_send(&queue);
        assert_sync(&queue);
    }

    #[test]
    fn local_queue_is_send() {
        let queue = LocalRingQueue::<usize>::new(4).unwrap();
        assert_send(&queue);
    }

    #[cfg(feature = "std")]
    #[test]
    fn parking_queue_is_send_sync() {
        use super::RingQueue;
        use crate::lock::ParkingLock;

        let queue = RingQueue::<usize, ParkingLock, ParkingLock>::new(4).unwrap();
        assert_send(&queue);
        assert_sync(&queue);
    }
}
