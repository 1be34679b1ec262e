// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-workers: the dequeue-side job implementations plus
//! the external-collaborator traits they depend on.
//!
//! Every worker shares one contract: transition its own job to `running`,
//! do the work, and leave the terminal status write to the processor. A
//! worker that recognizes its own failure should still call
//! `JobStore::set_job_error` before returning — the processor's later
//! write is idempotent against it.

mod agent_worker;
mod collaborators;
mod crawler;
mod db_maintenance;
mod error;
mod worker;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use agent_worker::{AgentPayload, AgentWorker};
pub use collaborators::{
    AgentService, AuthStore, BrowserCookie, BrowserFactory, BrowserSession, CollaboratorError,
    ContentProcessor, Credentials, Document, ExtractedLink, JobDefinitionStore, MaintenanceStore,
    ProcessedContent,
};
pub use crawler::{CrawlConfig, CrawlerPayload, CrawlerWorker};
pub use db_maintenance::{DbMaintenanceWorker, MaintenanceOperation, MaintenancePayload};
pub use error::WorkerError;
pub use worker::{Worker, WorkerContext, WorkerRegistry};
