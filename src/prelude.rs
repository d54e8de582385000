/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Prelude for the ring queue

pub use crate::channels::{QueueReceiver, QueueSender, channel, channel_with_mode};
pub use crate::errors::{CapacityError, EnqueueError, RecvError, SendError, TryRecvError, TrySendError};
pub use crate::lock::{LockGuard, NoLock, RawLock, SpinLock};
pub use crate::queue::{LocalRingQueue, OverflowMode, RingQueue, SyncRingQueue};
