// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-queue: the durable job queue. FIFO delivery with a
//! visibility-timeout-style receive-and-delete handle — the processor
//! (`gantry-orchestrator::Processor`) is the sole consumer.

mod error;
mod message;
mod queue;

pub use error::QueueError;
pub use message::QueueMessage;
pub use queue::{Delivery, Queue};
