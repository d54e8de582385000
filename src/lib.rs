/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! # Slotring
//!
//! Fixed-capacity synchronized ring queue, to hand work items between producer and consumer threads without unbounded growth.
//!
//! The queue relies on two levels of locking.
//! A single index lock guards the occupancy bookkeeping, it is only held for a constant time.
//! Each slot also has its own lock, guarding the transfer of an item in and out of the slot.
//! This way, the potentially expensive moves of items happen outside of the index critical section,
//! while a consumer can never observe a partially written item.
//!
//! When the queue is full, new items are either rejected, or evict the oldest item ([`queue::OverflowMode`]).
//! The locks are pluggable: using [`lock::NoLock`] for both levels turns the queue into a plain single-threaded ring buffer.
//!
//!
//! ## Example
//!
//! Hand items from 4 producers to a single consumer.
//! ```
//! use std::sync::Arc;
//! use slotring::queue::SyncRingQueue;
//!
//! let queue = Arc::new(SyncRingQueue::<usize>::new(256).unwrap());
//!
//! let producers = (0..4)
//!     .map(|p| {
//!         let queue = queue.clone();
//!         std::thread::spawn(move || {
//!             for i in 0..100 {
//!                 while !queue.enqueue(p * 100 + i) {
//!                     std::thread::yield_now();
//!                 }
//!             }
//!         })
//!     })
//!     .collect::<Vec<_>>();
//!
//! let mut received = Vec::new();
//! while received.len() < 400 {
//!     if let Some(item) = queue.dequeue() {
//!         received.push(item);
//!     }
//! }
//! for producer in producers {
//!     producer.join().unwrap();
//! }
//! received.sort_unstable();
//! assert_eq!(received, (0..400).collect::<Vec<_>>());
//! ```
//!
//!
//! ## `no-std` support
//!
//! `slotring` is compatible with `no-std` context, having a `std` feature which is activated by default.
//! To use `slotring` without the `std`, deactivate the default features in your `Cargo.toml` file.
//! The `std` feature is only required for [`lock::ParkingLock`], the queues and channels are available in both modes.
//!
//! Diagnostic events are emitted through `tracing` when the `tracing` feature is activated.
//!
//!
//! ## License
//!
//! Copyright 2024 Cénotélie Opérations SAS
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the “Software”), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
//!

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

extern crate alloc;

pub mod channels;
pub mod errors;
pub mod lock;
pub mod prelude;
pub mod queue;
mod trace;

pub use trace::init_tracing;

#[cfg(all(test, feature = "std"))]
mod tests;
