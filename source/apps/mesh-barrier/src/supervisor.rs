// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Supervisor side of a barrier run
//!
//! Builds the topology, forks one process per participant, then waits for every participant's
//! STARTED and DONE reports before reaping it. Per-participant state:
//! `NotSpawned -> Spawned -> ReportedStarted -> ReportedDone -> Reaped`.

use std::path::Path;

use log::{debug, error, warn};
use nexus_evlog::FileSink;
use nexus_mesh::{diag, ParticipantId, ProcessView, SupervisorView, Topology};
use nexus_pipe::Message;

use crate::config::BarrierConfig;
use crate::error::{BarrierError, Endpoint};
use crate::participant::Participant;
use crate::proc::{self, Fork, Pid, ProcessIds, WaitStatus};

/// Supervisor's view of one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticipantState {
    /// No process exists yet.
    NotSpawned,
    /// Process forked, nothing reported.
    Spawned,
    /// STARTED report consumed.
    ReportedStarted,
    /// DONE report consumed.
    ReportedDone,
    /// Process reaped.
    Reaped,
}

/// A spawned participant process.
#[derive(Debug)]
pub struct ParticipantHandle {
    id: ParticipantId,
    pid: Pid,
    state: ParticipantState,
}

impl ParticipantHandle {
    /// Participant id.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// OS process id.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ParticipantState {
        self.state
    }

    fn advance(&mut self, next: ParticipantState) {
        debug!("supervisor: participant {} {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}

/// Result of awaiting one participant.
#[derive(Debug)]
pub struct Completion {
    /// Participant that completed.
    pub id: ParticipantId,
    /// First report (STARTED phase).
    pub started: Message,
    /// Second report (DONE phase).
    pub done: Message,
    /// Exit status of the reaped process.
    pub status: WaitStatus,
}

/// Counters for a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Participants asked for on the command line.
    pub requested: usize,
    /// Participants actually forked.
    pub spawned: usize,
    /// Participants that delivered both reports.
    pub completed: usize,
}

/// Forks a process that runs `body` with only the view of `id`.
///
/// The child revokes every other end it inherited before `body` runs and exits with the code
/// `body` returns. The parent keeps none of the child's ends.
pub fn spawn<F>(
    topology: &mut Topology,
    id: ParticipantId,
    body: F,
) -> Result<ParticipantHandle, BarrierError>
where
    F: FnOnce(ProcessView) -> i32,
{
    let view = topology.take_view(id)?;
    match proc::fork().map_err(|source| BarrierError::Spawn { id, source })? {
        Fork::Child => {
            topology.revoke();
            proc::exit_child(body(view))
        }
        Fork::Parent(pid) => {
            drop(view);
            let mut handle = ParticipantHandle { id, pid, state: ParticipantState::NotSpawned };
            handle.advance(ParticipantState::Spawned);
            Ok(handle)
        }
    }
}

/// Reads both reports of `handle`, then reaps its process.
///
/// The process is reaped even when a report could not be read; the read error is returned
/// afterwards.
pub fn await_completion(
    supervisor: &mut SupervisorView,
    handle: &mut ParticipantHandle,
) -> Result<Completion, BarrierError> {
    let id = handle.id;
    let reports = read_reports(supervisor, handle);
    supervisor.close(id);
    let status = proc::wait(handle.pid).map_err(|source| BarrierError::Wait { id, source })?;
    handle.advance(ParticipantState::Reaped);
    debug!("supervisor: participant {id} pid={} exited with {status:?}", handle.pid);
    let (started, done) = reports?;
    Ok(Completion { id, started, done, status })
}

fn read_reports(
    supervisor: &mut SupervisorView,
    handle: &mut ParticipantHandle,
) -> Result<(Message, Message), BarrierError> {
    let started = read_report(supervisor, handle.id)?;
    handle.advance(ParticipantState::ReportedStarted);
    let done = read_report(supervisor, handle.id)?;
    handle.advance(ParticipantState::ReportedDone);
    Ok((started, done))
}

fn read_report(
    supervisor: &mut SupervisorView,
    id: ParticipantId,
) -> Result<Message, BarrierError> {
    let message = supervisor
        .read_report(id)
        .ok_or(BarrierError::NoReportChannel(id))?
        .map_err(|source| BarrierError::Receive { target: Endpoint::Peer(id), source })?;
    debug!(
        "supervisor: participant {id} reported {}: {}",
        message.kind().label(),
        message.payload_text().trim_end()
    );
    Ok(message)
}

/// Runs one complete barrier with `config.participants` participants.
///
/// Topology failures abort before anything is spawned. A failed spawn stops further spawning;
/// only participants that were actually spawned are awaited.
pub fn run(config: &BarrierConfig) -> Result<RunSummary, BarrierError> {
    let requested = config.participants;
    let mut topology = Topology::build(requested)?;
    if let Err(err) = diag::append_endpoints(&topology, &config.pipes_log) {
        warn!("supervisor: pipe log {} not written: {err}", config.pipes_log.display());
    }

    let mut handles = Vec::new();
    for index in 0..requested {
        let id = ParticipantId(index);
        match spawn(&mut topology, id, |view| participant_main(view, &config.events_log)) {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                error!("supervisor: {err}; spawned {} of {requested}", handles.len());
                break;
            }
        }
    }

    // Ends of participants that were never spawned close here.
    let mut supervisor = topology.into_supervisor();
    let mut completed = 0;
    for handle in &mut handles {
        match await_completion(&mut supervisor, handle) {
            Ok(completion) => {
                if !completion.status.success() {
                    warn!("supervisor: participant {} exited {:?}", completion.id, completion.status);
                }
                completed += 1;
            }
            Err(err) => error!("supervisor: participant {}: {err}", handle.id),
        }
    }

    Ok(RunSummary { requested, spawned: handles.len(), completed })
}

fn participant_main(view: ProcessView, events_log: &Path) -> i32 {
    let id = view.id();
    let result = FileSink::open(events_log).map_err(BarrierError::from).and_then(|sink| {
        debug!("participant {id}: recording to {}", sink.path().display());
        Participant::new(view, sink, ProcessIds::current()).run()
    });
    match result {
        Ok(outcome) => {
            debug!(
                "participant {id}: finished notified={} gathered={}",
                outcome.peers_notified,
                outcome.gathered.len()
            );
            0
        }
        Err(err) => {
            error!("participant {id}: {err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_pipe::MessageType;

    #[test]
    fn missing_report_channel_is_reported() {
        let topology = Topology::build(1).unwrap();
        let mut supervisor = topology.into_supervisor();
        let err = read_report(&mut supervisor, ParticipantId(3)).unwrap_err();
        assert!(matches!(err, BarrierError::NoReportChannel(ParticipantId(3))));
    }

    #[test]
    fn reports_are_read_in_order() {
        let mut topology = Topology::build(2).unwrap();
        let mut view = topology.take_view(ParticipantId(1)).unwrap();
        let mut supervisor = topology.into_supervisor();
        let started = Message::text(MessageType::Started, "s\n").unwrap();
        let done = Message::text(MessageType::Done, "d\n").unwrap();
        view.report(&started).unwrap();
        view.report(&done).unwrap();

        assert_eq!(read_report(&mut supervisor, ParticipantId(1)).unwrap(), started);
        assert_eq!(read_report(&mut supervisor, ParticipantId(1)).unwrap(), done);
    }

    #[test]
    fn dead_participant_surfaces_as_receive_error() {
        let mut topology = Topology::build(1).unwrap();
        let view = topology.take_view(ParticipantId(0)).unwrap();
        let mut supervisor = topology.into_supervisor();
        drop(view);
        let err = read_report(&mut supervisor, ParticipantId(0)).unwrap_err();
        assert!(matches!(
            err,
            BarrierError::Receive { target: Endpoint::Peer(ParticipantId(0)), .. }
        ));
    }
}
