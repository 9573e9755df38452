// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Descriptor tables of forked participants
//! OWNERS: @runtime
//! STATUS: Functional
//! TEST_COVERAGE: 1 process-level test (Linux, reads /proc/self/fd)
//!
//! TEST_SCENARIOS:
//!   - forked_participant_keeps_only_its_ends(): each child spawned through
//!     supervisor::spawn holds the supervisor's baseline plus 2(N-1) peer ends, one report
//!     writer and one command reader, and nothing else
//!
//! Kept as the only test in its binary so no other test thread opens descriptors around the
//! fork.

#![cfg(target_os = "linux")]

use std::fs;

use mesh_barrier::supervisor::{await_completion, spawn};
use nexus_mesh::{ParticipantId, ProcessView, Topology};
use nexus_pipe::{Message, MessageType};

const PARTICIPANTS: usize = 4;

fn open_descriptors() -> Option<usize> {
    Some(fs::read_dir("/proc/self/fd").ok()?.count())
}

// Runs in the child: must not panic, or the forked test harness would carry on.
fn report_descriptors(mut view: ProcessView) -> i32 {
    let Some(count) = open_descriptors() else {
        return 1;
    };
    let Ok(count) = Message::text(MessageType::Ack, &count.to_string()) else {
        return 1;
    };
    let Ok(done) = Message::new(MessageType::Done, Vec::new()) else {
        return 1;
    };
    match view.report(&count).and_then(|()| view.report(&done)) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

#[test]
fn forked_participant_keeps_only_its_ends() {
    let baseline = open_descriptors().unwrap();
    let mut topology = Topology::build(PARTICIPANTS).unwrap();

    let mut handles = Vec::new();
    for id in (0..PARTICIPANTS).map(ParticipantId) {
        handles.push(spawn(&mut topology, id, report_descriptors).unwrap());
    }
    let mut supervisor = topology.into_supervisor();

    for handle in &mut handles {
        let completion = await_completion(&mut supervisor, handle).unwrap();
        assert!(completion.status.success());
        assert_eq!(completion.started.kind(), MessageType::Ack);
        let held: usize = completion.started.payload_text().parse().unwrap();
        assert_eq!(
            held,
            baseline + 2 * (PARTICIPANTS - 1) + 2,
            "participant {} descriptor table",
            completion.id
        );
    }
}
