// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Pipe arena for N participants plus the supervisor
//!
//! Layout: `links[owner][peer]` holds the two ends `owner` keeps for the edge to `peer`
//! (write end of `owner→peer`, read end of `peer→owner`). Report channel `i` flows
//! participant→supervisor, command channel `i` flows supervisor→participant.

use std::io::{self, PipeReader, PipeWriter};
use std::os::fd::{AsRawFd, RawFd};

use log::debug;
use thiserror::Error;

use crate::view::{PeerLink, ProcessView, SupervisorView};
use crate::ParticipantId;

/// Errors produced while building or splitting a topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The kernel refused to create another pipe (descriptor exhaustion).
    #[error("pipe creation failed: {0}")]
    Pipe(#[from] io::Error),
    /// Participant id is outside `[0, N)`.
    #[error("participant {id} outside topology of {size}")]
    InvalidParticipant {
        /// Requested participant.
        id: ParticipantId,
        /// Number of participants in the topology.
        size: usize,
    },
    /// The participant count needs more pipes than can be addressed.
    #[error("topology of {size} participants is too large")]
    TooLarge {
        /// Requested participant count.
        size: usize,
    },
    /// The participant's ends were already handed out.
    #[error("participant {0} view already taken")]
    AlreadyTaken(ParticipantId),
}

#[derive(Default)]
pub(crate) struct Channel {
    pub(crate) reader: Option<PipeReader>,
    pub(crate) writer: Option<PipeWriter>,
}

impl Channel {
    fn open() -> Result<Self, TopologyError> {
        let (reader, writer) = io::pipe()?;
        Ok(Self { reader: Some(reader), writer: Some(writer) })
    }
}

/// One raw endpoint pair as recorded in the diagnostic pipe log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointRecord {
    /// Process that will own the pair (`N` stands for the supervisor).
    pub owner: usize,
    /// Other side of the pair.
    pub peer: usize,
    /// Read descriptor, `-1` if already handed out.
    pub read_fd: RawFd,
    /// Write descriptor, `-1` if already handed out.
    pub write_fd: RawFd,
}

/// Every pipe end created for one run, before it is distributed to processes.
pub struct Topology {
    size: usize,
    links: Vec<Vec<Option<PeerLink>>>,
    reports: Vec<Channel>,
    commands: Vec<Channel>,
}

impl Topology {
    /// Creates the full mesh plus one report and one command channel per participant.
    ///
    /// The arena grows one participant at a time as its pipes are created, so an oversized
    /// request fails on descriptor exhaustion rather than on allocation. Any failure aborts the
    /// whole build; pipes created so far are closed on drop.
    pub fn build(size: usize) -> Result<Self, TopologyError> {
        let pipes = pipe_count(size).ok_or(TopologyError::TooLarge { size })?;
        let mut links: Vec<Vec<Option<PeerLink>>> = Vec::new();
        let mut reports = Vec::new();
        let mut commands = Vec::new();
        for i in 0..size {
            reports.push(Channel::open()?);
            commands.push(Channel::open()?);
            let mut row = Vec::new();
            for (j, peer_row) in links.iter_mut().enumerate() {
                let (j_from_i, i_to_j) = io::pipe()?;
                let (i_from_j, j_to_i) = io::pipe()?;
                row.push(Some(PeerLink::new(ParticipantId(j), i_to_j, i_from_j)));
                peer_row.push(Some(PeerLink::new(ParticipantId(i), j_to_i, j_from_i)));
            }
            // Own slot; peers added later append after it.
            row.push(None);
            links.push(row);
        }
        debug!("mesh: built topology participants={size} edges={} pipes={pipes}", pipes / 2 - size);
        Ok(Self { size, links, reports, commands })
    }

    /// Number of participants.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Moves out exactly the ends owned by `id`.
    pub fn take_view(&mut self, id: ParticipantId) -> Result<ProcessView, TopologyError> {
        if id.index() >= self.size {
            return Err(TopologyError::InvalidParticipant { id, size: self.size });
        }
        let idx = id.index();
        let (Some(report), Some(command)) =
            (self.reports[idx].writer.take(), self.commands[idx].reader.take())
        else {
            return Err(TopologyError::AlreadyTaken(id));
        };
        let peers = std::mem::take(&mut self.links[idx]);
        Ok(ProcessView::new(id, self.size, peers, report, command))
    }

    /// Closes every end still held in the arena.
    ///
    /// A freshly spawned participant calls this on its inherited copy so that only its own
    /// view stays open in its descriptor table.
    pub fn revoke(&mut self) {
        self.links.iter_mut().for_each(Vec::clear);
        for channel in self.reports.iter_mut().chain(self.commands.iter_mut()) {
            *channel = Channel::default();
        }
    }

    /// Consumes the arena, keeping report read ends and command write ends.
    ///
    /// Participant-side ends that were never handed out (failed spawns) are closed here.
    pub fn into_supervisor(self) -> SupervisorView {
        let reports = self.reports.into_iter().map(|channel| channel.reader).collect();
        let commands = self.commands.into_iter().map(|channel| channel.writer).collect();
        SupervisorView::new(reports, commands)
    }

    /// Raw descriptors still in the arena, per owner, for the diagnostic pipe log.
    pub fn endpoints(&self) -> Vec<EndpointRecord> {
        let mut records = Vec::new();
        for (peer, channel) in self.reports.iter().enumerate().chain(self.commands.iter().enumerate()) {
            records.push(EndpointRecord {
                owner: self.size,
                peer,
                read_fd: raw(channel.reader.as_ref()),
                write_fd: raw(channel.writer.as_ref()),
            });
        }
        for (owner, row) in self.links.iter().enumerate() {
            for link in row.iter().flatten() {
                let (read_fd, write_fd) = link.raw_fds();
                records.push(EndpointRecord { owner, peer: link.peer().index(), read_fd, write_fd });
            }
        }
        records
    }
}

/// Pipes needed for `size` participants: two per edge plus report and command channels.
fn pipe_count(size: usize) -> Option<usize> {
    let peer = size.checked_mul(size.saturating_sub(1))?;
    let pipes = peer.checked_add(size.checked_mul(2)?)?;
    // Every pipe costs two descriptors.
    pipes.checked_mul(2).map(|_| pipes)
}

fn raw<T: AsRawFd>(end: Option<&T>) -> RawFd {
    end.map_or(-1, AsRawFd::as_raw_fd)
}
