// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Two-phase participant workflow
//!
//! `Init -> Pruned -> Broadcasting -> Gathering -> Terminated`. A participant is constructed
//! from its [`ProcessView`] alone, so pruning has already happened by the time it exists.

use log::debug;
use nexus_evlog::EventSink;
use nexus_mesh::{ParticipantId, ProcessView};
use nexus_pipe::{Message, MessageType};

use crate::collective::{broadcast_and_record, gather_and_record, Gathered};
use crate::error::BarrierError;
use crate::proc::ProcessIds;

/// Announcement broadcast in phase one.
pub fn started_event(id: ParticipantId, ids: ProcessIds) -> String {
    format!("Process {:1} (pid {:5}, parent {:5}) has STARTED\n", id.index(), ids.pid, ids.parent)
}

/// Local record once phase one is over.
pub fn received_all_started_event(id: ParticipantId) -> String {
    format!("Process {:1} received all STARTED messages\n", id.index())
}

/// Completion notice reported in phase two.
pub fn done_event(id: ParticipantId) -> String {
    format!("Process {:1} has DONE its work\n", id.index())
}

/// Local record once every peer has been heard from.
pub fn received_all_done_event(id: ParticipantId) -> String {
    format!("Process {:1} received all DONE messages\n", id.index())
}

/// Workflow position of a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Spawned, still holding the inherited topology.
    Init,
    /// Holding only its own view.
    Pruned,
    /// Sending STARTED.
    Broadcasting,
    /// Waiting on every peer.
    Gathering,
    /// Workflow finished.
    Terminated,
}

/// What a finished participant did.
#[derive(Debug)]
pub struct ParticipantOutcome {
    /// Participant that ran.
    pub id: ParticipantId,
    /// Peers that received the STARTED announcement.
    pub peers_notified: usize,
    /// Frames received while gathering, ascending by sender.
    pub gathered: Vec<Gathered>,
}

/// One participant driving its view through the barrier.
pub struct Participant<S> {
    view: ProcessView,
    sink: S,
    ids: ProcessIds,
    phase: Phase,
}

impl<S: EventSink> Participant<S> {
    /// Wraps an already-pruned view.
    pub fn new(view: ProcessView, sink: S, ids: ProcessIds) -> Self {
        let mut participant = Self { view, sink, ids, phase: Phase::Init };
        participant.enter(Phase::Pruned);
        participant
    }

    /// Current workflow position.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Participant id.
    pub fn id(&self) -> ParticipantId {
        self.view.id()
    }

    /// Runs both phases to completion.
    ///
    /// Blocks until every peer has broadcast. Any error leaves the phase where it failed.
    pub fn run(mut self) -> Result<ParticipantOutcome, BarrierError> {
        let id = self.view.id();

        self.enter(Phase::Broadcasting);
        let started = Message::text(MessageType::Started, &started_event(id, self.ids))
            .map_err(BarrierError::Frame)?;
        let peers_notified = broadcast_and_record(&mut self.view, &mut self.sink, &started)?;
        self.sink.append(&received_all_started_event(id))?;

        self.enter(Phase::Gathering);
        let done =
            Message::text(MessageType::Done, &done_event(id)).map_err(BarrierError::Frame)?;
        let gathered = gather_and_record(&mut self.view, &mut self.sink, &done)?;
        self.sink.append(&received_all_done_event(id))?;

        self.enter(Phase::Terminated);
        Ok(ParticipantOutcome { id, peers_notified, gathered })
    }

    fn enter(&mut self, next: Phase) {
        debug!("participant {}: {:?} -> {:?}", self.view.id(), self.phase, next);
        self.phase = next;
    }
}
