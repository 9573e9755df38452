// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Capability sets retained by participants and by the supervisor after pruning

use std::io::{PipeReader, PipeWriter};
use std::os::fd::{AsRawFd, RawFd};

use nexus_pipe::{read_message, write_message, Message};

use crate::ParticipantId;

/// The two ends a participant keeps for its edge to one peer.
#[derive(Debug)]
pub struct PeerLink {
    peer: ParticipantId,
    tx: PipeWriter,
    rx: PipeReader,
}

impl PeerLink {
    pub(crate) fn new(peer: ParticipantId, tx: PipeWriter, rx: PipeReader) -> Self {
        Self { peer, tx, rx }
    }

    /// Participant on the other side of the edge.
    pub fn peer(&self) -> ParticipantId {
        self.peer
    }

    /// Sends one frame on the outbound channel.
    pub fn send(&mut self, message: &Message) -> nexus_pipe::Result<()> {
        write_message(&mut self.tx, message)
    }

    /// Blocks until one frame arrives on the inbound channel.
    pub fn recv(&mut self) -> nexus_pipe::Result<Message> {
        read_message(&mut self.rx)
    }

    pub(crate) fn raw_fds(&self) -> (RawFd, RawFd) {
        (self.rx.as_raw_fd(), self.tx.as_raw_fd())
    }
}

/// Capability tally of a [`ProcessView`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapabilityCount {
    /// Read ends of inbound peer channels.
    pub peer_read: usize,
    /// Write ends of outbound peer channels.
    pub peer_write: usize,
    /// Write end of the report channel.
    pub report_write: usize,
    /// Read end of the command channel.
    pub command_read: usize,
}

impl CapabilityCount {
    /// Total number of open ends.
    pub fn total(&self) -> usize {
        self.peer_read + self.peer_write + self.report_write + self.command_read
    }
}

/// Everything one participant may touch: its peer edges, its report writer, its command reader.
#[derive(Debug)]
pub struct ProcessView {
    id: ParticipantId,
    size: usize,
    peers: Vec<Option<PeerLink>>,
    report: PipeWriter,
    command: PipeReader,
}

impl ProcessView {
    pub(crate) fn new(
        id: ParticipantId,
        size: usize,
        peers: Vec<Option<PeerLink>>,
        report: PipeWriter,
        command: PipeReader,
    ) -> Self {
        Self { id, size, peers, report, command }
    }

    /// Participant this view belongs to.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Number of participants in the run, including this one.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Peer links in ascending peer id order, skipping self.
    pub fn peers_mut(&mut self) -> impl Iterator<Item = &mut PeerLink> {
        self.peers.iter_mut().flatten()
    }

    /// Peer ids in ascending order, skipping self.
    pub fn peer_ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.peers.iter().flatten().map(PeerLink::peer)
    }

    /// Returns `true` when this view holds ends of the edge between `a` and `b`.
    pub fn holds_edge(&self, a: ParticipantId, b: ParticipantId) -> bool {
        let other = match (a == self.id, b == self.id) {
            (true, false) => b,
            (false, true) => a,
            _ => return false,
        };
        self.peers.get(other.index()).is_some_and(Option::is_some)
    }

    /// Sends one frame to the supervisor.
    pub fn report(&mut self, message: &Message) -> nexus_pipe::Result<()> {
        write_message(&mut self.report, message)
    }

    /// Read end of the supervisor command channel (reserved; the barrier never reads it).
    pub fn command(&mut self) -> &mut PipeReader {
        &mut self.command
    }

    /// Counts the ends this view keeps open.
    pub fn capabilities(&self) -> CapabilityCount {
        let links = self.peers.iter().flatten().count();
        CapabilityCount { peer_read: links, peer_write: links, report_write: 1, command_read: 1 }
    }
}

/// Supervisor-side ends: one report reader and one command writer per participant.
pub struct SupervisorView {
    reports: Vec<Option<PipeReader>>,
    commands: Vec<Option<PipeWriter>>,
}

impl SupervisorView {
    pub(crate) fn new(reports: Vec<Option<PipeReader>>, commands: Vec<Option<PipeWriter>>) -> Self {
        Self { reports, commands }
    }

    /// Blocks until one report frame from `id` arrives.
    ///
    /// Returns `None` when the topology never had a report channel for `id`.
    pub fn read_report(&mut self, id: ParticipantId) -> Option<nexus_pipe::Result<Message>> {
        let reader = self.reports.get_mut(id.index())?.as_mut()?;
        Some(read_message(reader))
    }

    /// Sends one command frame to `id`. Unused by the barrier workflow.
    pub fn send_command(
        &mut self,
        id: ParticipantId,
        message: &Message,
    ) -> Option<nexus_pipe::Result<()>> {
        let writer = self.commands.get_mut(id.index())?.as_mut()?;
        Some(write_message(writer, message))
    }

    /// Closes the report channel of `id` once it has been fully consumed.
    pub fn close(&mut self, id: ParticipantId) {
        if let Some(slot) = self.reports.get_mut(id.index()) {
            slot.take();
        }
        if let Some(slot) = self.commands.get_mut(id.index()) {
            slot.take();
        }
    }
}
