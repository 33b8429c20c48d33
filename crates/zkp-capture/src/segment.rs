// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::net::SocketAddr;
use std::time::Duration;

use zkp_correlate::Direction;

/// Length of the frame size prefix in front of every protocol message
pub const FRAME_PREFIX_LEN: usize = 4;

/// One TCP segment payload with its endpoints
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub source: SocketAddr,
    pub destination: SocketAddr,
    pub payload: Vec<u8>,
    /// Capture time relative to the Unix epoch
    pub timestamp: Duration,
}

impl Segment {
    /// Classify the segment against the service port
    pub fn direction(&self, service_port: u16) -> Option<Direction> {
        if self.source.port() == service_port {
            Some(Direction::Outgoing)
        } else if self.destination.port() == service_port {
            Some(Direction::Incoming)
        } else {
            None
        }
    }

    /// The client endpoint of the conversation
    pub fn client(&self, direction: Direction) -> SocketAddr {
        match direction {
            Direction::Incoming => self.source,
            Direction::Outgoing => self.destination,
        }
    }

    /// Protocol message with the frame prefix removed
    pub fn body(&self) -> Option<&[u8]> {
        frame_body(&self.payload)
    }
}

/// Strip the 4-byte frame length; `None` when nothing follows it
pub fn frame_body(payload: &[u8]) -> Option<&[u8]> {
    payload
        .get(FRAME_PREFIX_LEN..)
        .filter(|body| !body.is_empty())
}
