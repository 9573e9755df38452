// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process barrier runs: one thread per participant, each owning only its view.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use mesh_barrier::participant::{
    done_event, received_all_done_event, received_all_started_event, started_event,
};
use mesh_barrier::proc::ProcessIds;
use mesh_barrier::{Participant, ParticipantOutcome};
use nexus_evlog::MemorySink;
use nexus_mesh::{ParticipantId, ProcessView, SupervisorView, Topology};
use nexus_pipe::{Message, MessageType};

fn ids_for(id: usize) -> ProcessIds {
    ProcessIds { pid: 1000 + id as u32, parent: 1 }
}

fn split(size: usize) -> (Vec<ProcessView>, SupervisorView) {
    let mut topology = Topology::build(size).unwrap();
    let views = (0..size).map(|i| topology.take_view(ParticipantId(i)).unwrap()).collect();
    (views, topology.into_supervisor())
}

fn run_all(views: Vec<ProcessView>, sink: &MemorySink) -> Vec<ParticipantOutcome> {
    let workers: Vec<_> = views
        .into_iter()
        .map(|view| {
            let sink = sink.clone();
            thread::spawn(move || {
                let ids = ids_for(view.id().index());
                Participant::new(view, sink, ids).run().unwrap()
            })
        })
        .collect();
    workers.into_iter().map(|worker| worker.join().unwrap()).collect()
}

#[test]
fn three_participants_complete_the_barrier() {
    let (views, mut supervisor) = split(3);
    let sink = MemorySink::new();
    let outcomes = run_all(views, &sink);

    for outcome in &outcomes {
        assert_eq!(outcome.peers_notified, 2);
        let from: Vec<_> = outcome.gathered.iter().map(|g| g.from).collect();
        let expected: Vec<_> =
            (0..3).filter(|&p| p != outcome.id.index()).map(ParticipantId).collect();
        assert_eq!(from, expected);
        for gathered in &outcome.gathered {
            assert_eq!(gathered.message.kind(), MessageType::Started);
            assert_eq!(
                gathered.message.payload_text(),
                started_event(gathered.from, ids_for(gathered.from.index()))
            );
        }
    }

    let records = sink.records();
    // Per participant: own STARTED, received-all-STARTED, own DONE, 2 gathered, received-all-DONE.
    assert_eq!(records.len(), 3 * 6);
    for i in 0..3 {
        let id = ParticipantId(i);
        let started = started_event(id, ids_for(i));
        // Once as its own record, once in each of the two peers' gathers.
        assert_eq!(records.iter().filter(|r| **r == started).count(), 3);
        for unique in [received_all_started_event(id), done_event(id), received_all_done_event(id)]
        {
            assert_eq!(records.iter().filter(|r| **r == unique).count(), 1);
        }
    }

    for i in 0..3 {
        let id = ParticipantId(i);
        let first = supervisor.read_report(id).unwrap().unwrap();
        let second = supervisor.read_report(id).unwrap().unwrap();
        assert_eq!(first.kind(), MessageType::Started);
        assert_eq!(second.kind(), MessageType::Done);
        assert_eq!(second.payload_text(), done_event(id));
    }
}

#[test]
fn single_participant_reports_to_supervisor_only() {
    let (views, mut supervisor) = split(1);
    let sink = MemorySink::new();
    let outcomes = run_all(views, &sink);
    assert_eq!(outcomes[0].peers_notified, 0);
    assert!(outcomes[0].gathered.is_empty());
    assert_eq!(sink.records().len(), 4);
    let id = ParticipantId(0);
    assert_eq!(supervisor.read_report(id).unwrap().unwrap().kind(), MessageType::Started);
    assert_eq!(supervisor.read_report(id).unwrap().unwrap().kind(), MessageType::Done);
}

#[test]
fn gather_waits_for_the_slowest_peer() {
    let (mut views, _supervisor) = split(2);
    let mut laggard = views.pop().unwrap();
    let fast = views.pop().unwrap();
    let sink = MemorySink::new();

    let (tx, rx) = mpsc::channel();
    let worker_sink = sink.clone();
    let worker = thread::spawn(move || {
        let result = Participant::new(fast, worker_sink, ids_for(0)).run();
        let _ = tx.send(result.is_ok());
    });

    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    assert!(!sink.records().contains(&received_all_done_event(ParticipantId(0))));

    let link = laggard.peers_mut().next().unwrap();
    let hello = Message::text(MessageType::Started, "late\n").unwrap();
    link.send(&hello).unwrap();
    // Drain the fast participant's announcement so its writes never stall.
    assert_eq!(link.recv().unwrap().kind(), MessageType::Started);

    assert!(rx.recv_timeout(Duration::from_secs(10)).unwrap());
    worker.join().unwrap();
    let records = sink.records();
    assert!(records.contains(&"late\n".to_string()));
    assert_eq!(records.last().unwrap(), &received_all_done_event(ParticipantId(0)));
}
