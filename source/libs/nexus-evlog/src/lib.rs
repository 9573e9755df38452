// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Append-only event sink for protocol records
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests (file, memory)
//!
//! PUBLIC API:
//!   - EventSink trait: accept one record, append it, never reorder
//!   - FileSink: per-process append handle + stdout echo
//!   - MemorySink: shared in-memory sink for host tests
//!
//! INVARIANTS:
//!   - Each record is appended with a single write so concurrent appenders never interleave
//!     partial records
//!   - A failed append is reported to the caller, never swallowed

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]

mod file;
mod memory;

pub use file::FileSink;
pub use memory::MemorySink;

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by event sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink file could not be opened.
    #[error("failed to open event log {path}: {source}")]
    Open {
        /// Location of the sink.
        path: PathBuf,
        /// Underlying operating system error.
        source: std::io::Error,
    },
    /// Appending a record failed.
    #[error("failed to append event record: {0}")]
    Append(#[source] std::io::Error),
    /// Echoing the record to stdout failed.
    #[error("failed to echo event record: {0}")]
    Echo(#[source] std::io::Error),
}

/// Append-only, line-oriented destination for protocol records.
pub trait EventSink {
    /// Appends `record` verbatim.
    fn append(&mut self, record: &str) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn append(&mut self, record: &str) -> Result<(), SinkError> {
        (**self).append(record)
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn append(&mut self, record: &str) -> Result<(), SinkError> {
        (**self).append(record)
    }
}
