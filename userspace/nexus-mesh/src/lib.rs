// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Full-mesh pipe topology and per-process capability views
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Unit tests (topology, view) + `tests/pruning.rs`
//!
//! PUBLIC API:
//!   - Topology::build(): create every pipe for N participants
//!   - Topology::take_view(): carve out the ends one participant owns
//!   - Topology::into_supervisor(): keep only the supervisor's ends
//!   - ProcessView / PeerLink: a participant's retained capabilities
//!   - SupervisorView: report readers and command writers
//!   - diag::record_endpoints(): raw endpoint dump for the pipe log
//!
//! INVARIANTS:
//!   - Every pipe end has exactly one owner; ends leave the topology by move
//!   - Dropping an end closes it, so revoked capabilities cannot be used by mistake
//!   - A ProcessView never holds an end of an edge that does not touch its participant
//!
//! DEPENDENCIES:
//!   - std::io::pipe: anonymous pipes
//!   - nexus-pipe: frame transport over the pipe ends

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]

pub mod diag;
mod topology;
mod view;

pub use topology::{EndpointRecord, Topology, TopologyError};
pub use view::{CapabilityCount, PeerLink, ProcessView, SupervisorView};

use core::fmt;

/// Identifier of a spawned participant, dense in `[0, N)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ParticipantId(pub usize);

impl ParticipantId {
    /// Returns the id as a table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
