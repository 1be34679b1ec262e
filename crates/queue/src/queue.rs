// SPDX-License-Identifier: MIT

//! In-process durable queue.
//!
//! FIFO within a single producer, at-least-once delivery: `receive` hands
//! out a message together with a [`Delivery`] handle and starts a
//! visibility timeout on it. The caller must call [`Delivery::delete`]
//! exactly once after it has recorded the message's terminal disposition
//! in the job store; if the caller never does — crash,
//! panic, or simply forgetting — the message becomes visible again once
//! the timeout elapses, the same redelivery guarantee a real SQS-style
//! queue gives.

use crate::error::QueueError;
use crate::message::QueueMessage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

struct InFlight {
    message: QueueMessage,
    deadline: Instant,
}

struct Inner {
    ready: VecDeque<QueueMessage>,
    in_flight: std::collections::HashMap<u64, InFlight>,
}

/// A durable, in-process FIFO queue. Cheap to clone — shares the underlying
/// ready/in-flight state.
#[derive(Clone)]
pub struct Queue {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
    next_receipt: Arc<AtomicU64>,
    visibility_timeout: Duration,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY_TIMEOUT)
    }
}

impl Queue {
    pub fn new(visibility_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                ready: VecDeque::new(),
                in_flight: std::collections::HashMap::new(),
            })),
            notify: Arc::new(Notify::new()),
            next_receipt: Arc::new(AtomicU64::new(1)),
            visibility_timeout,
        }
    }

    /// Persist `message` and wake one waiting receiver, if any.
    pub fn enqueue(&self, message: QueueMessage) {
        self.inner.lock().ready.push_back(message);
        self.notify.notify_one();
    }

    /// Move any in-flight message whose visibility timeout has elapsed
    /// back onto the ready queue (at its original position, to keep the
    /// spirit of FIFO for messages that were never disposed of).
    fn reclaim_expired(&self, inner: &mut Inner) {
        let now = Instant::now();
        let expired: Vec<u64> =
            inner.in_flight.iter().filter(|(_, f)| f.deadline <= now).map(|(r, _)| *r).collect();
        for receipt in expired {
            if let Some(entry) = inner.in_flight.remove(&receipt) {
                warn!(job_id = %entry.message.job_id, "queue message visibility timeout expired, redelivering");
                inner.ready.push_front(entry.message);
            }
        }
    }

    /// Block (honoring `cancel`) up to `timeout` for the next visible
    /// message. Returns `None` on timeout or cancellation — the caller
    /// should simply re-poll.
    pub async fn receive(&self, timeout: Duration, cancel: &CancellationToken) -> Option<Delivery> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut inner = self.inner.lock();
                self.reclaim_expired(&mut inner);
                if let Some(message) = inner.ready.pop_front() {
                    let receipt = self.next_receipt.fetch_add(1, Ordering::SeqCst);
                    inner.in_flight.insert(
                        receipt,
                        InFlight { message: message.clone(), deadline: Instant::now() + self.visibility_timeout },
                    );
                    return Some(Delivery { queue: self.clone(), receipt, message });
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }

            tokio::select! {
                _ = self.notify.notified() => {}
                _ = tokio::time::sleep(remaining) => return None,
                _ = cancel.cancelled() => return None,
            }
        }
    }

    /// Remove `receipt` from the in-flight table — called by
    /// [`Delivery::delete`], never directly.
    fn delete(&self, receipt: u64) -> Result<(), QueueError> {
        self.inner.lock().in_flight.remove(&receipt).map(|_| ()).ok_or(QueueError::UnknownReceipt(receipt))
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn ready_len(&self) -> usize {
        self.inner.lock().ready.len()
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn in_flight_len(&self) -> usize {
        self.inner.lock().in_flight.len()
    }
}

/// A received message plus the handle the caller must use to finalize its
/// disposition exactly once.
pub struct Delivery {
    queue: Queue,
    receipt: u64,
    pub message: QueueMessage,
}

impl Delivery {
    /// Mark this delivery's message as durably disposed of. Must be called
    /// after — never before — the corresponding job's terminal status has
    /// been recorded in the job store.
    pub fn delete(self) -> Result<(), QueueError> {
        self.queue.delete(self.receipt)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
