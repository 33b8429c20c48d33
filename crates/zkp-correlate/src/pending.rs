// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Outstanding requests awaiting a response

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;
use zkp_proto::OpCode;

/// Client endpoint a request was observed from
pub type Identity = SocketAddr;

/// The operation a pending request is waiting on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TrackedOp {
    pub op: OpCode,
    /// Whether the request asked the service to leave a watch
    pub watch: bool,
}

impl TrackedOp {
    pub fn new(op: OpCode, watch: bool) -> Self {
        Self { op, watch }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingRequest {
    pub identity: Identity,
    pub xid: i32,
    pub op: TrackedOp,
    /// Capture time of the request, relative to the Unix epoch
    pub observed_at: Duration,
}

/// Pending requests keyed by client endpoint and xid
///
/// Each capture source owns one; entries live until a matching response
/// arrives and are never expired.
#[derive(Debug, Default)]
pub struct PendingRequests {
    entries: HashMap<(Identity, i32), PendingRequest>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `request`, returning the entry it replaced if any
    pub fn insert(&mut self, request: PendingRequest) -> Option<PendingRequest> {
        self.entries.insert((request.identity, request.xid), request)
    }

    /// Remove and return the request matching a response
    pub fn take(&mut self, identity: Identity, xid: i32) -> Option<PendingRequest> {
        self.entries.remove(&(identity, xid))
    }

    pub fn get(&self, identity: Identity, xid: i32) -> Option<&PendingRequest> {
        self.entries.get(&(identity, xid))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
