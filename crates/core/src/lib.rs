// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-core: shared types for the job orchestration engine — job
//! records, ids, the event enum, and the clock abstraction used by every
//! other crate in the workspace.

pub mod clock;
pub mod definition;
pub mod event;
pub mod id;
pub mod job;
pub mod macros;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use definition::{
    ErrorTolerance, FailureAction, JobDefinition, JobDefinitionId, OnError, Step,
};
pub use event::Event;
pub use id::{short, IdGen, SequentialIdGen, UuidIdGen};
pub use job::{
    merge_json_map, ChildJobStats, Job, JobId, JobLogEntry, JobPhase, JobStatus, JsonMap,
    LogLevel,
};
pub use worker::WorkerType;
