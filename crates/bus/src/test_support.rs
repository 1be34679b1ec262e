// SPDX-License-Identifier: MIT

//! Test helper for asserting what landed on the bus.

use crate::{BusError, Handler};
use async_trait::async_trait;
use gantry_core::Event;
use parking_lot::Mutex;
use std::sync::Arc;

/// Handler that records every event it receives, for assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    received: Arc<Mutex<Vec<Event>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Event> {
        self.received.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.received.lock().len()
    }
}

#[async_trait]
impl Handler for RecordingHandler {
    async fn handle(&self, event: &Event) -> Result<(), BusError> {
        self.received.lock().push(event.clone());
        Ok(())
    }
}
