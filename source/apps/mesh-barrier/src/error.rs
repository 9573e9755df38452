// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for barrier runs.

use core::fmt;

use nexus_evlog::SinkError;
use nexus_mesh::{ParticipantId, TopologyError};
use nexus_pipe::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Other side of a failed transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// The supervising parent.
    Supervisor,
    /// Another participant.
    Peer(ParticipantId),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supervisor => write!(f, "supervisor"),
            Self::Peer(id) => write!(f, "participant {id}"),
        }
    }
}

/// Errors that end a barrier run or a single participant.
///
/// None of them is recoverable: the enclosing workflow step aborts and the error propagates to
/// process exit.
#[derive(Debug, Error)]
pub enum BarrierError {
    /// Topology construction or splitting failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// A frame could not be built.
    #[error("failed to build message: {0}")]
    Frame(#[source] TransportError),
    /// Sending a frame failed.
    #[error("send to {target} failed: {source}")]
    Send {
        /// Intended receiver.
        target: Endpoint,
        /// Transport failure.
        source: TransportError,
    },
    /// Receiving a frame failed.
    #[error("receive from {target} failed: {source}")]
    Receive {
        /// Expected sender.
        target: Endpoint,
        /// Transport failure.
        source: TransportError,
    },
    /// The supervisor holds no report channel for the participant.
    #[error("no report channel for participant {0}")]
    NoReportChannel(ParticipantId),
    /// The event sink rejected a record.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The OS refused to create a participant process.
    #[error("participant {id} spawn failed: {source}")]
    Spawn {
        /// Participant that was not created.
        id: ParticipantId,
        /// Reason reported by fork(2).
        source: std::io::Error,
    },
    /// Reaping a participant process failed.
    #[error("wait for participant {id} failed: {source}")]
    Wait {
        /// Participant being reaped.
        id: ParticipantId,
        /// Reason reported by waitpid(2).
        source: std::io::Error,
    },
}
