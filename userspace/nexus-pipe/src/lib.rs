// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Length-prefixed message framing over raw byte streams (pipes)
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Unit tests (wire, transport) + `tests/transport.rs`
//!
//! PUBLIC API:
//!   - Message / MessageType / MessageHeader: frame model
//!   - write_message(): send one complete frame
//!   - read_message(): receive one complete frame
//!   - TransportError: framing and I/O failures
//!
//! INVARIANTS:
//!   - The header's payload length always equals the number of payload bytes on the wire
//!   - A frame is either transferred completely or the call fails
//!   - End-of-stream in the middle of a frame is an error, never a retry

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]

mod transport;
mod wire;

pub use transport::{read_message, write_message};
pub use wire::{
    Message, MessageHeader, MessageType, HEADER_LEN, MAX_MESSAGE_LEN, MAX_PAYLOAD_LEN,
};

use thiserror::Error;

/// Result type returned by transport operations.
pub type Result<T> = core::result::Result<T, TransportError>;

/// Errors produced while sending or receiving frames.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The stream reached end-of-file before a complete frame was transferred.
    #[error("peer closed channel after {received} of {expected} bytes")]
    PeerClosed {
        /// Bytes required to complete the current frame section.
        expected: usize,
        /// Bytes actually transferred before the stream closed.
        received: usize,
    },
    /// Payload does not fit into a single frame.
    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge {
        /// Offending payload length.
        len: usize,
        /// Configured maximum payload length.
        max: usize,
    },
    /// Header carried a type tag this build does not know.
    #[error("unknown message type tag {0}")]
    UnknownType(u16),
    /// Underlying channel reported an error.
    #[error("channel io error: {0}")]
    Io(#[from] std::io::Error),
}
