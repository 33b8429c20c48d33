// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Telemetry hooks invoked by the correlation engine

use std::time::Duration;

use serde::Serialize;
use zkp_proto::{DecodeError, ErrorCode, OpCode, WatcherEvent};

use crate::pending::TrackedOp;

/// Which way a packet travelled relative to the service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Client to service
    Incoming,
    /// Service to client
    Outgoing,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of classification signals
///
/// Every method defaults to doing nothing so sinks only implement what they
/// record.
pub trait Observer {
    /// A request was tracked or its response matched
    fn operation(&mut self, _op: TrackedOp, _direction: Direction) {}

    /// Time between a request and its matching response
    fn latency(&mut self, _op: OpCode, _elapsed: Duration) {}

    fn handshake(&mut self, _direction: Direction) {}

    fn ping(&mut self, _direction: Direction) {}

    /// A server-pushed notification; `None` when its body was not decoded
    fn watch_notification(&mut self, _event: Option<&WatcherEvent>) {}

    fn server_error(&mut self, _code: ErrorCode) {}

    fn untracked_response(&mut self) {}

    fn decode_error(&mut self, _error: &DecodeError) {}

    /// Size of the pending map after it changed
    fn pending(&mut self, _count: usize) {}
}

/// Discards every signal
impl Observer for () {}

/// One recorded observer call
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Operation(TrackedOp, Direction),
    Latency(OpCode, Duration),
    Handshake(Direction),
    Ping(Direction),
    WatchNotification(Option<WatcherEvent>),
    ServerError(ErrorCode),
    UntrackedResponse,
    DecodeError(DecodeError),
    Pending(usize),
}

/// Records signals in call order
impl Observer for Vec<Signal> {
    fn operation(&mut self, op: TrackedOp, direction: Direction) {
        self.push(Signal::Operation(op, direction));
    }

    fn latency(&mut self, op: OpCode, elapsed: Duration) {
        self.push(Signal::Latency(op, elapsed));
    }

    fn handshake(&mut self, direction: Direction) {
        self.push(Signal::Handshake(direction));
    }

    fn ping(&mut self, direction: Direction) {
        self.push(Signal::Ping(direction));
    }

    fn watch_notification(&mut self, event: Option<&WatcherEvent>) {
        self.push(Signal::WatchNotification(event.cloned()));
    }

    fn server_error(&mut self, code: ErrorCode) {
        self.push(Signal::ServerError(code));
    }

    fn untracked_response(&mut self) {
        self.push(Signal::UntrackedResponse);
    }

    fn decode_error(&mut self, error: &DecodeError) {
        self.push(Signal::DecodeError(error.clone()));
    }

    fn pending(&mut self, count: usize) {
        self.push(Signal::Pending(count));
    }
}
