// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-bus: typed publish/subscribe used for real-time telemetry and
//! cross-component reactions (document_saved -> parent document counter,
//! job_status_change -> monitor wake-up).
//!
//! `publish` is asynchronous and best-effort: each subscriber runs in its
//! own task, isolated from the others, and a handler error is logged but
//! never propagated to the publisher or to sibling handlers. `publish_sync`
//! awaits every handler in turn before returning, which is what lets the
//! crawler worker guarantee its `document_saved` event has been observed
//! before the job completes.

use async_trait::async_trait;
use gantry_core::Event;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[cfg(any(test, feature = "test-support"))]
mod test_support;
#[cfg(any(test, feature = "test-support"))]
pub use test_support::RecordingHandler;

/// A subscriber callback. Implementors should be cheap to clone (wrap
/// shared state in an `Arc`) since the bus clones the handler out of the
/// subscriber table before invoking it.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, event: &Event) -> Result<(), BusError>;
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(&Event) -> Result<(), BusError> + Send + Sync,
{
    async fn handle(&self, event: &Event) -> Result<(), BusError> {
        self(event)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("subscriber handler failed: {0}")]
    Handler(String),
}

type SubscriberTable = HashMap<&'static str, Vec<Arc<dyn Handler>>>;

/// Typed event bus. Clone is cheap — it shares the underlying
/// subscriber table and delivery task spawner.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<SubscriberTable>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` to receive every event whose [`Event::name`]
    /// equals `event_type`. Multiple handlers may subscribe to the same
    /// type; all are invoked on publish.
    pub fn subscribe(&self, event_type: &'static str, handler: Arc<dyn Handler>) {
        self.subscribers.write().entry(event_type).or_default().push(handler);
    }

    fn handlers_for(&self, event: &Event) -> Vec<Arc<dyn Handler>> {
        self.subscribers.read().get(event.name()).cloned().unwrap_or_default()
    }

    /// Publish `event` asynchronously. Spawns one task per subscriber and
    /// returns immediately without waiting for any of them. A handler
    /// error is logged and does not affect the other subscribers or the
    /// caller.
    pub fn publish(&self, event: Event) {
        for handler in self.handlers_for(&event) {
            let event = event.clone();
            tokio::spawn(async move {
                if let Err(err) = handler.handle(&event).await {
                    warn!(event = event.name(), error = %err, "event subscriber failed");
                }
            });
        }
    }

    /// Publish `event` and await every subscriber before returning. Used
    /// where a caller must observe downstream state settle before
    /// proceeding.
    pub async fn publish_sync(&self, event: Event) {
        for handler in self.handlers_for(&event) {
            if let Err(err) = handler.handle(&event).await {
                warn!(event = event.name(), error = %err, "event subscriber failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
