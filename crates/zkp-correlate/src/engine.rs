// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request/response correlation
//!
//! The engine sees each direction of a connection independently. Client
//! packets create pending entries keyed by endpoint and xid; service packets
//! consume them and report latency. Reserved xids are classified before the
//! pending map is consulted.

use std::time::Duration;

use tracing::{debug, trace, warn};
use zkp_proto::records::{CONNECT_REQUEST, CONNECT_RESPONSE};
use zkp_proto::{
    decode, decode_record, lookup, Category, DecodeError, ErrorCode, OpCode, Record,
    RequestHeader, ResponseHeader, Value, WatcherEvent, HANDSHAKE_XID, NOTIFICATION_XID, PING_XID,
    REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN,
};

use crate::observer::{Direction, Observer};
use crate::pending::{Identity, PendingRequest, PendingRequests, TrackedOp};

/// Classification of a client-to-service packet
#[derive(Clone, Debug, PartialEq)]
pub enum ClientOutcome {
    /// Keep-alive, not tracked
    Ping,
    /// Session establishment carrying the decoded connect request
    Handshake(Record),
    /// Request stored in the pending map
    Tracked {
        xid: i32,
        op: TrackedOp,
        body: Value,
        /// An earlier request with the same endpoint and xid was overwritten
        replaced: bool,
    },
}

/// Classification of a service-to-client packet
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceOutcome {
    /// Session establishment response
    Handshake(Record),
    Ping,
    /// Server-pushed watch event; `None` when the header reported an error
    Notification(Option<WatcherEvent>),
    /// No pending request matched
    Untracked { xid: i32 },
    /// Response matched a pending request
    Completed {
        xid: i32,
        op: TrackedOp,
        elapsed: Duration,
        err: ErrorCode,
        /// Decoded response body, skipped when `err` reports a failure
        body: Option<Value>,
    },
}

/// Correlates observed requests with their responses
#[derive(Debug)]
pub struct Engine<O> {
    pending: PendingRequests,
    observer: O,
}

impl<O: Observer> Engine<O> {
    pub fn new(pending: PendingRequests, observer: O) -> Self {
        Self { pending, observer }
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_parts(self) -> (PendingRequests, O) {
        (self.pending, self.observer)
    }

    /// Handle a payload sent by `identity` to the service
    pub fn on_client_packet(
        &mut self,
        identity: Identity,
        timestamp: Duration,
        buf: &[u8],
    ) -> Result<ClientOutcome, DecodeError> {
        let result = self.client_packet(identity, timestamp, buf);
        if let Err(error) = &result {
            self.report_decode_error(identity, Direction::Incoming, error, buf);
        }
        result
    }

    /// Handle a payload the service sent to `identity`
    pub fn on_service_packet(
        &mut self,
        identity: Identity,
        timestamp: Duration,
        buf: &[u8],
    ) -> Result<ServiceOutcome, DecodeError> {
        let result = self.service_packet(identity, timestamp, buf);
        if let Err(error) = &result {
            self.report_decode_error(identity, Direction::Outgoing, error, buf);
        }
        result
    }

    fn client_packet(
        &mut self,
        identity: Identity,
        timestamp: Duration,
        buf: &[u8],
    ) -> Result<ClientOutcome, DecodeError> {
        let header = RequestHeader::decode(buf)?;

        if header.opcode == OpCode::Ping.code() {
            trace!(peer = %identity, "ping request");
            self.observer.ping(Direction::Incoming);
            return Ok(ClientOutcome::Ping);
        }

        // The connect request has no header; the whole payload is the record
        if header.xid == HANDSHAKE_XID {
            let (request, _) = decode_record(buf, &CONNECT_REQUEST)?;
            debug!(
                peer = %identity,
                session_id = request.get_long("sessionId").unwrap_or_default(),
                timeout_ms = request.get_int("timeOut").unwrap_or_default(),
                "session handshake requested"
            );
            self.observer.handshake(Direction::Incoming);
            return Ok(ClientOutcome::Handshake(request));
        }

        let entry = lookup(header.opcode)?;
        let (body, _) = decode(&buf[REQUEST_HEADER_LEN..], &entry.request)?;
        let watch = entry.category == Category::Watchable
            && body.as_record().and_then(|r| r.get_bool("watch")).unwrap_or(false);
        let op = TrackedOp::new(entry.op, watch);

        let replaced = self
            .pending
            .insert(PendingRequest {
                identity,
                xid: header.xid,
                op,
                observed_at: timestamp,
            })
            .is_some();
        if replaced {
            debug!(peer = %identity, xid = header.xid, "pending request overwritten");
        }
        self.observer.pending(self.pending.len());
        self.observer.operation(op, Direction::Incoming);

        debug!(
            peer = %identity,
            xid = header.xid,
            operation = %op.op,
            watch,
            body = %body.to_json(),
            "request observed"
        );
        Ok(ClientOutcome::Tracked {
            xid: header.xid,
            op,
            body,
            replaced,
        })
    }

    fn service_packet(
        &mut self,
        identity: Identity,
        timestamp: Duration,
        buf: &[u8],
    ) -> Result<ServiceOutcome, DecodeError> {
        let header = ResponseHeader::decode(buf)?;

        // Checked before `err`: the handshake is headerless and what a header
        // parse calls `err` is part of the session id
        if header.xid == HANDSHAKE_XID {
            let (response, _) = decode_record(buf, &CONNECT_RESPONSE)?;
            debug!(
                peer = %identity,
                session_id = response.get_long("sessionId").unwrap_or_default(),
                timeout_ms = response.get_int("timeOut").unwrap_or_default(),
                "session handshake accepted"
            );
            self.observer.handshake(Direction::Outgoing);
            return Ok(ServiceOutcome::Handshake(response));
        }

        let failed = header.err.0 < 0;
        if failed {
            warn!(
                peer = %identity,
                xid = header.xid,
                zxid = header.zxid,
                error = %header.err,
                "service returned an error"
            );
            self.observer.server_error(header.err);
        }

        let body = &buf[RESPONSE_HEADER_LEN..];

        if header.xid == PING_XID {
            trace!(peer = %identity, "ping response");
            self.observer.ping(Direction::Outgoing);
            return Ok(ServiceOutcome::Ping);
        }

        if header.xid == NOTIFICATION_XID {
            let event = if failed {
                None
            } else {
                Some(WatcherEvent::decode(body)?.0)
            };
            if let Some(event) = &event {
                debug!(
                    peer = %identity,
                    event_type = ?event.event_type,
                    state = ?event.state,
                    path = %event.path,
                    "watch notification"
                );
            }
            self.observer.watch_notification(event.as_ref());
            return Ok(ServiceOutcome::Notification(event));
        }

        let Some(request) = self.pending.take(identity, header.xid) else {
            warn!(peer = %identity, xid = header.xid, "response without a tracked request");
            self.observer.untracked_response();
            return Ok(ServiceOutcome::Untracked { xid: header.xid });
        };
        self.observer.pending(self.pending.len());

        let op = request.op;
        let elapsed = timestamp.saturating_sub(request.observed_at);
        self.observer.latency(op.op, elapsed);

        let body = if failed {
            None
        } else {
            let entry = lookup(op.op.code())?;
            Some(decode(body, &entry.response)?.0)
        };
        self.observer.operation(op, Direction::Outgoing);

        debug!(
            peer = %identity,
            xid = header.xid,
            operation = %op.op,
            watch = op.watch,
            elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            body = %body.as_ref().map(|body| body.to_json()).unwrap_or_default(),
            "response matched"
        );
        Ok(ServiceOutcome::Completed {
            xid: header.xid,
            op,
            elapsed,
            err: header.err,
            body,
        })
    }

    fn report_decode_error(
        &mut self,
        identity: Identity,
        direction: Direction,
        error: &DecodeError,
        buf: &[u8],
    ) {
        warn!(
            peer = %identity,
            direction = %direction,
            error = %error,
            kind = error.kind(),
            payload = %hex::encode(buf),
            "failed to decode packet"
        );
        self.observer.decode_error(error);
    }
}
