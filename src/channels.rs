/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Synchronous channels backed by a ring queue
//!
//! Senders and receivers can be cloned, each item is received by exactly one receiver.
//! The queue never waits by itself: blocking operations retry with a crossbeam `Backoff` until they succeed,
//! or until the other side is disconnected.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::Backoff;

use crate::errors::{CapacityError, RecvError, SendError, TryRecvError, TrySendError};
use crate::queue::{OverflowMode, SyncRingQueue};
use crate::trace::debug;

/// The state shared by both sides of a channel
#[derive(Debug)]
struct Shared<T> {
    queue: SyncRingQueue<T>,
    /// The number of connected senders
    senders: AtomicUsize,
    /// The number of connected receivers
    receivers: AtomicUsize,
}

/// The sending side of a channel
#[derive(Debug)]
pub struct QueueSender<T> {
    shared: Arc<Shared<T>>,
}

/// The receiving side of a channel
#[derive(Debug)]
pub struct QueueReceiver<T> {
    shared: Arc<Shared<T>>,
}

/// Creates a channel that rejects items while full
///
/// # Errors
///
/// Returns an error when `capacity` is zero
pub fn channel<T>(capacity: usize) -> Result<(QueueSender<T>, QueueReceiver<T>), CapacityError> {
    channel_with_mode(capacity, OverflowMode::Reject)
}

/// Creates a channel with the specified behaviour when full
///
/// With [`OverflowMode::Overwrite`], sending never fails because of a full channel,
/// the oldest items are lost instead.
///
/// # Errors
///
/// Returns an error when `capacity` is zero
pub fn channel_with_mode<T>(
    capacity: usize,
    mode: OverflowMode,
) -> Result<(QueueSender<T>, QueueReceiver<T>), CapacityError> {
    let shared = Arc::new(Shared {
        queue: SyncRingQueue::with_mode(capacity, mode)?,
        senders: AtomicUsize::new(1),
        receivers: AtomicUsize::new(1),
    });
    Ok((
        QueueSender { shared: shared.clone() },
        QueueReceiver { shared },
    ))
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        self.shared.senders.fetch_add(1, Ordering::Relaxed);
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Drop for QueueSender<T> {
    fn drop(&mut self) {
        if self.shared.senders.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!("last sender disconnected");
        }
    }
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        self.shared.receivers.fetch_add(1, Ordering::Relaxed);
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Drop for QueueReceiver<T> {
    fn drop(&mut self) {
        if self.shared.receivers.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!("last receiver disconnected");
        }
    }
}

impl<T> QueueSender<T> {
    /// Gets whether all receivers are gone
    #[must_use]
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.shared.receivers.load(Ordering::Acquire) == 0
    }

    /// Gets the capacity of the channel
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Gets the number of items in the channel
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Gets whether the channel is empty
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shared.queue.is_empty()
    }

    /// Gets whether the channel is full
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.shared.queue.is_full()
    }

    /// Attempts to send a single item on to the channel
    ///
    /// # Errors
    ///
    /// Returns an error when the channel is full, or no receiver is connected
    pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        if self.is_disconnected() {
            return Err(TrySendError::Disconnected(item));
        }
        self.shared.queue.try_enqueue(item).map_err(TrySendError::from)
    }

    /// Blocks while sending the next item
    ///
    /// # Errors
    ///
    /// Returns an error when no receiver is connected
    pub fn send(&self, mut item: T) -> Result<(), SendError<T>> {
        let backoff = Backoff::new();
        loop {
            match self.try_send(item) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(item_back)) => {
                    item = item_back;
                    backoff.snooze();
                }
                Err(TrySendError::Disconnected(item)) => return Err(SendError(item)),
            }
        }
    }

    /// Disconnects this sender by dropping it
    pub fn disconnect(self) {}
}

impl<T> QueueReceiver<T> {
    /// Gets whether all senders are gone
    ///
    /// Items still in the channel can be received after the senders are disconnected.
    #[must_use]
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.shared.senders.load(Ordering::Acquire) == 0
    }

    /// Gets the capacity of the channel
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Gets the number of items in the channel
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Gets whether the channel is empty
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shared.queue.is_empty()
    }

    /// Gets whether the channel is full
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.shared.queue.is_full()
    }

    /// Attempts to receive a single item from the channel
    /// An item will be returned for as long as there are items in the channel, even if senders are not connected.
    ///
    /// # Errors
    ///
    /// Returns an error when the channel is empty, or empty and no sender is connected
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        if let Some(item) = self.shared.queue.dequeue() {
            return Ok(item);
        }
        if self.is_disconnected() {
            // the last sender may have pushed right before leaving
            return self.shared.queue.dequeue().ok_or(TryRecvError::Disconnected);
        }
        Err(TryRecvError::Empty)
    }

    /// Blocks while waiting for the next item
    /// An item will be returned for as long as there are items in the channel, even if senders are not connected.
    ///
    /// # Errors
    ///
    /// Returns an error when the channel is empty and no sender is connected
    pub fn recv(&self) -> Result<T, RecvError> {
        let backoff = Backoff::new();
        loop {
            match self.try_recv() {
                Ok(item) => return Ok(item),
                Err(TryRecvError::Empty) => backoff.snooze(),
                Err(TryRecvError::Disconnected) => return Err(RecvError),
            }
        }
    }

    /// Disconnects this receiver by dropping it
    pub fn disconnect(self) {}
}

#[cfg(test)]
mod tests_channels {
    use super::{channel, channel_with_mode};
    use crate::errors::{CapacityError, RecvError, SendError, TryRecvError, TrySendError};
    use crate::queue::OverflowMode;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(channel::<usize>(0).unwrap_err(), CapacityError);
    }

    #[test]
    fn try_send_full() {
        let (sender, receiver) = channel::<usize>(2).unwrap();
        assert_eq!(sender.try_send(1), Ok(()));
        assert_eq!(sender.try_send(2), Ok(()));
        assert!(sender.is_full());
        assert_eq!(sender.try_send(3), Err(TrySendError::Full(3)));
        assert_eq!(receiver.try_recv(), Ok(1));
        assert_eq!(receiver.len(), 1);
    }

    #[test]
    fn overwrite_never_full() {
        let (sender, receiver) = channel_with_mode::<usize>(2, OverflowMode::Overwrite).unwrap();
        for i in 0..10 {
            assert_eq!(sender.try_send(i), Ok(()));
        }
        assert_eq!(receiver.try_recv(), Ok(8));
        assert_eq!(receiver.try_recv(), Ok(9));
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn receiver_drains_after_senders_disconnect() {
        let (sender, receiver) = channel::<usize>(4).unwrap();
        let other = sender.clone();
        sender.send(1).unwrap();
        other.send(2).unwrap();
        sender.disconnect();
        assert!(!receiver.is_disconnected());
        other.disconnect();
        assert!(receiver.is_disconnected());
        assert_eq!(receiver.recv(), Ok(1));
        assert_eq!(receiver.try_recv(), Ok(2));
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Disconnected));
        assert_eq!(receiver.recv(), Err(RecvError));
    }

    #[test]
    fn sender_fails_without_receivers() {
        let (sender, receiver) = channel::<usize>(4).unwrap();
        let other = receiver.clone();
        drop(receiver);
        assert!(!sender.is_disconnected());
        drop(other);
        assert!(sender.is_disconnected());
        assert_eq!(sender.try_send(1), Err(TrySendError::Disconnected(1)));
        assert_eq!(sender.send(2), Err(SendError(2)));
    }
}
