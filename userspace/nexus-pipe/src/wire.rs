// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Frame layout and message model
//!
//! Frame shape: `[type:u16le, payload_len:u16le, payload...]`
//!
//! There is no magic, version or checksum: the receiver trusts `payload_len` to know how many
//! bytes follow the header.

use std::borrow::Cow;

use crate::{Result, TransportError};

/// Size of the fixed frame header in bytes.
pub const HEADER_LEN: usize = 4;
/// Upper bound for a complete frame (header + payload).
pub const MAX_MESSAGE_LEN: usize = 4096;
/// Upper bound for the payload carried by a single frame.
pub const MAX_PAYLOAD_LEN: usize = MAX_MESSAGE_LEN - HEADER_LEN;

/// Message type tag carried in every header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    /// Participant announced its start.
    Started = 0,
    /// Participant finished its useful work.
    Done = 1,
    /// Generic acknowledgement.
    Ack = 2,
    /// Supervisor asks a participant to stop.
    Stop = 3,
    /// Transfer order.
    Transfer = 4,
    /// Balance history snapshot.
    BalanceHistory = 5,
    /// Critical-section request.
    CsRequest = 6,
    /// Critical-section reply.
    CsReply = 7,
    /// Critical-section release.
    CsRelease = 8,
}

impl MessageType {
    /// Decodes a wire tag.
    pub fn from_tag(tag: u16) -> Result<Self> {
        Ok(match tag {
            0 => Self::Started,
            1 => Self::Done,
            2 => Self::Ack,
            3 => Self::Stop,
            4 => Self::Transfer,
            5 => Self::BalanceHistory,
            6 => Self::CsRequest,
            7 => Self::CsReply,
            8 => Self::CsRelease,
            other => return Err(TransportError::UnknownType(other)),
        })
    }

    /// Returns the wire tag.
    pub const fn tag(self) -> u16 {
        self as u16
    }

    /// Short upper-case label used in diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Done => "DONE",
            Self::Ack => "ACK",
            Self::Stop => "STOP",
            Self::Transfer => "TRANSFER",
            Self::BalanceHistory => "BALANCE_HISTORY",
            Self::CsRequest => "CS_REQUEST",
            Self::CsReply => "CS_REPLY",
            Self::CsRelease => "CS_RELEASE",
        }
    }
}

/// Fixed-size frame header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    /// Message type tag.
    pub kind: MessageType,
    /// Number of payload bytes following the header.
    pub payload_len: u16,
}

impl MessageHeader {
    /// Serialises the header into its wire form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let kind = self.kind.tag().to_le_bytes();
        let len = self.payload_len.to_le_bytes();
        [kind[0], kind[1], len[0], len[1]]
    }

    /// Parses a header, rejecting unknown tags and lengths above [`MAX_PAYLOAD_LEN`].
    pub fn decode(buf: &[u8; HEADER_LEN]) -> Result<Self> {
        let kind = MessageType::from_tag(u16::from_le_bytes([buf[0], buf[1]]))?;
        let payload_len = u16::from_le_bytes([buf[2], buf[3]]);
        if payload_len as usize > MAX_PAYLOAD_LEN {
            return Err(TransportError::PayloadTooLarge {
                len: payload_len as usize,
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self { kind, payload_len })
    }
}

/// A single frame: header plus exactly `payload_len` payload bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    header: MessageHeader,
    payload: Vec<u8>,
}

impl Message {
    /// Builds a message, deriving the header length from the payload.
    pub fn new(kind: MessageType, payload: impl Into<Vec<u8>>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(TransportError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        let header = MessageHeader { kind, payload_len: payload.len() as u16 };
        Ok(Self { header, payload })
    }

    /// Builds a message carrying UTF-8 text.
    pub fn text(kind: MessageType, text: &str) -> Result<Self> {
        Self::new(kind, text.as_bytes())
    }

    pub(crate) fn from_parts(header: MessageHeader, payload: Vec<u8>) -> Self {
        debug_assert_eq!(header.payload_len as usize, payload.len());
        Self { header, payload }
    }

    /// Returns the frame header.
    pub fn header(&self) -> MessageHeader {
        self.header
    }

    /// Returns the message type.
    pub fn kind(&self) -> MessageType {
        self.header.kind
    }

    /// Returns the raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload interpreted as text; invalid UTF-8 is replaced.
    pub fn payload_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Serialises header and payload into one contiguous buffer.
    pub fn to_frame(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(HEADER_LEN + self.payload.len());
        frame.extend_from_slice(&self.header.encode());
        frame.extend_from_slice(&self.payload);
        frame
    }
}
