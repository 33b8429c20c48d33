// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Watch notification payloads

use serde::Serialize;

use crate::codec::WireReader;
use crate::error::DecodeError;

/// Kind of change a watch notification reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventType {
    None,
    NodeCreated,
    NodeDeleted,
    NodeDataChanged,
    NodeChildrenChanged,
    DataWatchRemoved,
    ChildWatchRemoved,
    Unknown(i32),
}

impl From<i32> for EventType {
    fn from(code: i32) -> Self {
        match code {
            -1 => EventType::None,
            1 => EventType::NodeCreated,
            2 => EventType::NodeDeleted,
            3 => EventType::NodeDataChanged,
            4 => EventType::NodeChildrenChanged,
            5 => EventType::DataWatchRemoved,
            6 => EventType::ChildWatchRemoved,
            other => EventType::Unknown(other),
        }
    }
}

/// Session state carried alongside a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum KeeperState {
    Disconnected,
    SyncConnected,
    AuthFailed,
    ConnectedReadOnly,
    SaslAuthenticated,
    Expired,
    Closed,
    Unknown(i32),
}

impl From<i32> for KeeperState {
    fn from(code: i32) -> Self {
        match code {
            0 => KeeperState::Disconnected,
            3 => KeeperState::SyncConnected,
            4 => KeeperState::AuthFailed,
            5 => KeeperState::ConnectedReadOnly,
            6 => KeeperState::SaslAuthenticated,
            -112 => KeeperState::Expired,
            7 => KeeperState::Closed,
            other => KeeperState::Unknown(other),
        }
    }
}

/// A decoded watch notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WatcherEvent {
    pub event_type: EventType,
    pub state: KeeperState,
    pub path: String,
}

impl WatcherEvent {
    /// Decode from the bytes following the response header
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut reader = WireReader::new(buf);
        let event = Self {
            event_type: EventType::from(reader.i32()?),
            state: KeeperState::from(reader.i32()?),
            path: reader.text()?,
        };
        Ok((event, reader.position()))
    }
}
