// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{EventSink, SinkError};

/// In-memory sink; clones share the same record list.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record appended so far, in append order.
    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }
}

impl EventSink for MemorySink {
    fn append(&mut self, record: &str) -> Result<(), SinkError> {
        self.records.lock().push(record.to_string());
        Ok(())
    }
}
