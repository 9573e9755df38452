// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: One-to-all and all-to-one exchange over a participant's peer edges
//!
//! Both primitives log before they send: the record hits the event sink, then the supervisor,
//! then peers. Peers are always visited in ascending id order.

use log::trace;
use nexus_evlog::EventSink;
use nexus_mesh::{ParticipantId, ProcessView};
use nexus_pipe::Message;

use crate::error::{BarrierError, Endpoint};

/// A frame received during [`gather_and_record`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gathered {
    /// Sending peer.
    pub from: ParticipantId,
    /// Frame as received.
    pub message: Message,
}

/// Records `message`, reports it to the supervisor, then sends it to every peer.
///
/// Returns the number of peers the message was sent to. The first failure aborts the call;
/// peers after the failing one receive nothing.
pub fn broadcast_and_record<S>(
    view: &mut ProcessView,
    sink: &mut S,
    message: &Message,
) -> Result<usize, BarrierError>
where
    S: EventSink + ?Sized,
{
    record_and_report(view, sink, message)?;
    let mut sent = 0;
    for link in view.peers_mut() {
        let peer = link.peer();
        link.send(message)
            .map_err(|source| BarrierError::Send { target: Endpoint::Peer(peer), source })?;
        trace!("barrier: {} -> participant {peer}", message.kind().label());
        sent += 1;
    }
    Ok(sent)
}

/// Records `message`, reports it to the supervisor, then receives one frame from every peer.
///
/// Each received payload is appended to the sink as it arrives. Returns only once every peer
/// has delivered exactly one frame.
pub fn gather_and_record<S>(
    view: &mut ProcessView,
    sink: &mut S,
    message: &Message,
) -> Result<Vec<Gathered>, BarrierError>
where
    S: EventSink + ?Sized,
{
    record_and_report(view, sink, message)?;
    let mut gathered = Vec::with_capacity(view.size().saturating_sub(1));
    for link in view.peers_mut() {
        let from = link.peer();
        let received = link
            .recv()
            .map_err(|source| BarrierError::Receive { target: Endpoint::Peer(from), source })?;
        trace!("barrier: {} <- participant {from}", received.kind().label());
        sink.append(&received.payload_text())?;
        gathered.push(Gathered { from, message: received });
    }
    Ok(gathered)
}

fn record_and_report<S>(
    view: &mut ProcessView,
    sink: &mut S,
    message: &Message,
) -> Result<(), BarrierError>
where
    S: EventSink + ?Sized,
{
    sink.append(&message.payload_text())?;
    view.report(message)
        .map_err(|source| BarrierError::Send { target: Endpoint::Supervisor, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_evlog::MemorySink;
    use nexus_mesh::Topology;
    use nexus_pipe::MessageType;

    #[test]
    fn single_participant_touches_only_supervisor() {
        let mut topology = Topology::build(1).unwrap();
        let mut view = topology.take_view(ParticipantId(0)).unwrap();
        let mut supervisor = topology.into_supervisor();
        let mut sink = MemorySink::new();

        let started = Message::text(MessageType::Started, "up\n").unwrap();
        assert_eq!(broadcast_and_record(&mut view, &mut sink, &started).unwrap(), 0);
        let done = Message::text(MessageType::Done, "done\n").unwrap();
        assert!(gather_and_record(&mut view, &mut sink, &done).unwrap().is_empty());

        assert_eq!(sink.records(), vec!["up\n".to_string(), "done\n".to_string()]);
        assert_eq!(supervisor.read_report(ParticipantId(0)).unwrap().unwrap(), started);
        assert_eq!(supervisor.read_report(ParticipantId(0)).unwrap().unwrap(), done);
    }

    #[test]
    fn gather_fails_when_peer_vanishes() {
        let mut topology = Topology::build(2).unwrap();
        let mut view = topology.take_view(ParticipantId(0)).unwrap();
        let peer = topology.take_view(ParticipantId(1)).unwrap();
        let _supervisor = topology.into_supervisor();
        drop(peer);

        let mut sink = MemorySink::new();
        let done = Message::text(MessageType::Done, "done\n").unwrap();
        let err = gather_and_record(&mut view, &mut sink, &done).unwrap_err();
        assert!(matches!(
            err,
            BarrierError::Receive { target: Endpoint::Peer(ParticipantId(1)), .. }
        ));
        // Own record is logged before any receive.
        assert_eq!(sink.records(), vec!["done\n".to_string()]);
    }

    #[test]
    fn report_failure_stops_before_peers() {
        let mut topology = Topology::build(2).unwrap();
        let mut view = topology.take_view(ParticipantId(0)).unwrap();
        let mut peer = topology.take_view(ParticipantId(1)).unwrap();
        drop(topology.into_supervisor());

        let mut sink = MemorySink::new();
        let started = Message::text(MessageType::Started, "up\n").unwrap();
        let err = broadcast_and_record(&mut view, &mut sink, &started).unwrap_err();
        assert!(matches!(err, BarrierError::Send { target: Endpoint::Supervisor, .. }));
        drop(view);
        let link = peer.peers_mut().next().unwrap();
        assert!(link.recv().is_err());
    }
}
