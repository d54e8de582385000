/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! The slots of the ring, each one behind its own lock

use alloc::boxed::Box;
use core::cell::UnsafeCell;

use crate::lock::{LockGuard, RawLock};

/// A single storage cell with its lock
#[derive(Debug)]
struct Slot<T, L> {
    lock: L,
    content: UnsafeCell<Option<T>>,
}

/// The fixed-length array of slots
#[derive(Debug)]
pub(crate) struct Slots<T, L> {
    buffer: Box<[Slot<T, L>]>,
}

impl<T, L: RawLock> Slots<T, L> {
    /// Allocates `capacity` empty slots
    pub fn new(capacity: usize) -> Self {
        let buffer = (0..capacity)
            .map(|_| Slot {
                lock: L::default(),
                content: UnsafeCell::new(None),
            })
            .collect::<Box<[_]>>();
        Self { buffer }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Locks the slot at `index` and gets exclusive access to its content
    #[inline]
    pub fn acquire(&self, index: usize) -> SlotAccess<'_, T, L> {
        let slot = &self.buffer[index];
        SlotAccess {
            _guard: LockGuard::acquire(&slot.lock),
            content: &slot.content,
        }
    }
}

/// Exclusive access to the content of a locked slot
///
/// The slot stays locked for as long as the access lives, wherever it is moved to.
pub(crate) struct SlotAccess<'a, T, L: RawLock> {
    _guard: LockGuard<'a, L>,
    content: &'a UnsafeCell<Option<T>>,
}

impl<T, L: RawLock> SlotAccess<'_, T, L> {
    /// Stores an item, returning the stale one that was in the slot, if any
    #[inline]
    pub fn replace(&mut self, item: T) -> Option<T> {
        // SAFETY: the slot lock is held
        unsafe { (*self.content.get()).replace(item) }
    }

    /// Moves the item out of the slot
    #[inline]
    pub fn take(&mut self) -> Option<T> {
        // SAFETY: the slot lock is held
        unsafe { (*self.content.get()).take() }
    }
}
