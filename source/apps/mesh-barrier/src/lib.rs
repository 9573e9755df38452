// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Distributed N-process barrier over a full mesh of pipes
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests per module + `tests/collective.rs` (threaded) + `tests/barrier.rs`
//!   (real binary)
//!
//! PUBLIC API:
//!   - cli::parse(): argument count decides between run and silent no-op
//!   - BarrierConfig: participant count and log locations (TOML + env overrides)
//!   - supervisor::run(): build topology, fork participants, await and reap them
//!   - broadcast_and_record() / gather_and_record(): collective primitives
//!   - Participant: two-phase workflow over one ProcessView
//!
//! INVARIANTS:
//!   - Every record is appended to the event sink before the matching frame is sent
//!   - Peers are visited in ascending id order, self skipped
//!   - A participant returns from gather only after one frame from every other participant
//!   - The supervisor reaps every spawned participant, even one whose reports failed
//!
//! DEPENDENCIES:
//!   - nexus-mesh / nexus-pipe: topology and framing
//!   - nexus-evlog: event sink
//!   - libc: fork(2) / waitpid(2) (confined to `proc`)

#![deny(unsafe_code)]
#![deny(clippy::all, missing_docs)]

pub mod cli;
pub mod collective;
pub mod config;
pub mod error;
pub mod participant;
pub mod proc;
pub mod supervisor;

pub use collective::{broadcast_and_record, gather_and_record, Gathered};
pub use config::{BarrierConfig, ConfigError};
pub use error::{BarrierError, Endpoint};
pub use participant::{Participant, ParticipantOutcome, Phase};
pub use supervisor::{run, RunSummary};
