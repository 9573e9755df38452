// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Exact-byte frame transfer over blocking byte streams
//!
//! ERROR CONDITIONS:
//!   - TransportError::PeerClosed: zero-length read before the frame was complete
//!   - TransportError::Io: channel error (EPIPE surfaces here when the reader is gone)

use std::io::{ErrorKind, Read, Write};

use log::trace;

use crate::wire::{Message, MessageHeader, HEADER_LEN};
use crate::{Result, TransportError};

/// Writes one complete frame, retrying short writes until every byte is on the channel.
pub fn write_message<W: Write + ?Sized>(channel: &mut W, message: &Message) -> Result<()> {
    let frame = message.to_frame();
    let mut written = 0;
    while written < frame.len() {
        match channel.write(&frame[written..]) {
            Ok(0) => {
                return Err(TransportError::PeerClosed { expected: frame.len(), received: written })
            }
            Ok(n) => written += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    channel.flush()?;
    trace!("pipe: sent {} frame len={}", message.kind().label(), message.payload().len());
    Ok(())
}

/// Reads one complete frame: the fixed header, then exactly the declared payload bytes.
pub fn read_message<R: Read + ?Sized>(channel: &mut R) -> Result<Message> {
    let mut raw = [0u8; HEADER_LEN];
    read_full(channel, &mut raw)?;
    let header = MessageHeader::decode(&raw)?;
    let mut payload = vec![0u8; header.payload_len as usize];
    read_full(channel, &mut payload)?;
    trace!("pipe: received {} frame len={}", header.kind.label(), payload.len());
    Ok(Message::from_parts(header, payload))
}

// A zero-byte read means the last writer is gone; it never means "try again".
fn read_full<R: Read + ?Sized>(channel: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match channel.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(TransportError::PeerClosed { expected: buf.len(), received: filled })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
