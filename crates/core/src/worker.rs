// SPDX-License-Identifier: MIT

//! Worker type tag — the string a queue message's `type` field and a
//! worker's `worker_type()` are matched against during dispatch.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// The type tag a job carries and a worker/manager registers under.
///
/// Not a random identifier — a stable name like `"crawler_url"` or
/// `"agent"`. Newtyped so registries and dispatch sites can't accidentally
/// compare it against an unrelated string field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerType(pub String);

impl WorkerType {
    /// Create a new WorkerType from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value of this WorkerType.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WorkerType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkerType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for WorkerType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WorkerType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for WorkerType {
    fn borrow(&self) -> &str {
        &self.0
    }
}
