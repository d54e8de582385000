/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Lock capabilities for the ring queue
//!
//! The queue is generic over the lock used for its index bookkeeping and the lock used for each slot.
//! Any type implementing [`RawLock`] can be plugged in:
//! * [`SpinLock`] busy-spins using crossbeam's `Backoff`,
//! * [`ParkingLock`] parks the waiting thread (requires the `std` feature),
//! * [`NoLock`] never blocks and is not `Sync`, for single-threaded use.
//!
//! Acquisition is always scoped through a [`LockGuard`].
//! A guard is a move-only value: moving it to another scope keeps the lock held without acquiring it again,
//! and the lock is released exactly once, when the guard is dropped.

use core::cell::Cell;
use core::fmt::Debug;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

use crossbeam_utils::Backoff;

/// A raw mutual-exclusion primitive
///
/// # Safety
///
/// Once `lock` returned, or `try_lock` returned `true`, no other thread may acquire the same lock until `unlock` is called.
/// An implementation that does not provide this exclusion must not be `Sync`,
/// so that it can never be shared between threads.
pub unsafe trait RawLock: Default {
    /// Acquires the lock, waiting as long as necessary
    fn lock(&self);

    /// Attempts to acquire the lock without waiting
    #[must_use]
    fn try_lock(&self) -> bool;

    /// Releases the lock
    ///
    /// # Safety
    ///
    /// The lock must be held by the current context.
    unsafe fn unlock(&self);
}

/// The proof that a lock is currently held
///
/// The guard can be moved out of the scope that acquired the lock, which transfers the ownership of the lock.
/// Dropping the guard releases the lock.
#[must_use = "if unused the lock is immediately released"]
pub struct LockGuard<'a, L: RawLock> {
    lock: &'a L,
    /// Locks may have to be released on the thread that acquired them
    _not_send: PhantomData<*const ()>,
}

impl<'a, L: RawLock> LockGuard<'a, L> {
    /// Acquires the lock and returns the guard for it
    #[inline]
    pub fn acquire(lock: &'a L) -> Self {
        lock.lock();
        Self {
            lock,
            _not_send: PhantomData,
        }
    }

    /// Attempts to acquire the lock without waiting
    #[inline]
    pub fn try_acquire(lock: &'a L) -> Option<Self> {
        if lock.try_lock() {
            Some(Self {
                lock,
                _not_send: PhantomData,
            })
        } else {
            None
        }
    }
}

impl<L: RawLock> Drop for LockGuard<'_, L> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: the guard only exists while the lock is held
        unsafe { self.lock.unlock() }
    }
}

impl<L: RawLock> Debug for LockGuard<'_, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LockGuard").finish_non_exhaustive()
    }
}

/// An exclusive lock that busy-spins while waiting
#[derive(Debug, Default)]
pub struct SpinLock {
    locked: AtomicBool,
}

impl SpinLock {
    /// Gets whether the lock is currently held by someone
    #[must_use]
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

// SAFETY: the flag is only set by a successful compare-exchange from `false`
unsafe impl RawLock for SpinLock {
    fn lock(&self) {
        let backoff = Backoff::new();
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // wait on a plain load to avoid hammering the cache line
            while self.locked.load(Ordering::Relaxed) {
                backoff.snooze();
            }
        }
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    unsafe fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// An exclusive lock that parks the waiting thread
#[cfg(feature = "std")]
pub struct ParkingLock(parking_lot::RawMutex);

#[cfg(feature = "std")]
impl Default for ParkingLock {
    fn default() -> Self {
        use parking_lot::lock_api::RawMutex;
        Self(parking_lot::RawMutex::INIT)
    }
}

#[cfg(feature = "std")]
impl Debug for ParkingLock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use parking_lot::lock_api::RawMutex;
        f.debug_struct("ParkingLock")
            .field("locked", &self.0.is_locked())
            .finish()
    }
}

// SAFETY: delegates to `parking_lot`, which guarantees the exclusion
#[cfg(feature = "std")]
unsafe impl RawLock for ParkingLock {
    #[inline]
    fn lock(&self) {
        parking_lot::lock_api::RawMutex::lock(&self.0);
    }

    #[inline]
    fn try_lock(&self) -> bool {
        parking_lot::lock_api::RawMutex::try_lock(&self.0)
    }

    #[inline]
    unsafe fn unlock(&self) {
        unsafe { parking_lot::lock_api::RawMutex::unlock(&self.0) }
    }
}

/// A lock that is never contended and never blocks
///
/// This type is not `Sync`, so a structure using it can only be accessed from a single thread at a time.
#[derive(Debug, Default)]
pub struct NoLock {
    _not_sync: PhantomData<Cell<()>>,
}

// SAFETY: `NoLock` is `!Sync`, so there is never a second thread to exclude
unsafe impl RawLock for NoLock {
    #[inline]
    fn lock(&self) {}

    #[inline]
    fn try_lock(&self) -> bool {
        true
    }

    #[inline]
    unsafe fn unlock(&self) {}
}
