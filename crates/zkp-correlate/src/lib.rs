// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Correlation of observed ZooKeeper requests and responses
//!
//! [`Engine`] classifies each captured payload, tracks outstanding requests
//! in a [`PendingRequests`] map it owns, and reports latency and counts to an
//! [`Observer`].

pub mod engine;
pub mod observer;
pub mod pending;

pub use engine::{ClientOutcome, Engine, ServiceOutcome};
pub use observer::{Direction, Observer, Signal};
pub use pending::{Identity, PendingRequest, PendingRequests, TrackedOp};
