// SPDX-License-Identifier: MIT

//! The wire shape carried between a step manager's `enqueue` call and the
//! processor's `receive` loop.

use gantry_core::JobId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{job_id, type, payload}`. `payload` is the canonical JSON encoding of
/// the whole job record, not just its `Job::payload` field — the
/// processor deserializes it straight into a `Job` and never needs a
/// store round trip to route and validate it. The queue itself never
/// interprets `job_type` or `payload` —
/// only the processor and the worker it dispatches to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub job_id: JobId,
    pub job_type: String,
    pub payload: Value,
}

impl QueueMessage {
    pub fn new(job_id: JobId, job_type: impl Into<String>, payload: Value) -> Self {
        Self { job_id, job_type: job_type.into(), payload }
    }
}
