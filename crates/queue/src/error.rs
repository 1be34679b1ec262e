// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("receipt {0} is no longer in flight (already deleted or its visibility expired)")]
    UnknownReceipt(u64),
}
